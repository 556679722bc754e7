/// Personal access token read from the environment.
///
/// Absence is only reported when a request needs the token, so the dashboard can
/// start and draw before failing.
#[derive(Clone)]
pub struct Credential {
    env_var: String,
    token: Option<String>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("env_var", &self.env_var)
            .field("present", &self.token.is_some())
            .finish()
    }
}

impl Credential {
    pub fn from_env(env_var: &str) -> Self {
        Self::new(env_var, std::env::var(env_var).ok())
    }

    pub fn new(env_var: &str, token: Option<String>) -> Self {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self {
            env_var: env_var.to_string(),
            token,
        }
    }

    pub fn token(&self) -> crate::error::Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| crate::error::AzError::MissingCredential(self.env_var.clone()))
    }
}
