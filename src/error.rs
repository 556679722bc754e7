use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzError {
    #[error("Please set the {0} environment variable")]
    MissingCredential(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("failed to copy to clipboard: {0}")]
    Clipboard(String),

    #[error("failed to open browser: {0}")]
    Browser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AzError>;

impl From<reqwest::Error> for AzError {
    fn from(err: reqwest::Error) -> Self {
        AzError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for AzError {
    fn from(err: serde_json::Error) -> Self {
        AzError::Decode(err.to_string())
    }
}

/// How errors reaching the controller are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Show a banner and keep running.
    #[default]
    Recoverable,
    /// Terminate with a diagnostic.
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Banner,
    Fatal,
}

impl ErrorPolicy {
    /// A missing credential is fatal regardless of policy.
    pub fn classify(self, err: &AzError) -> Disposition {
        match (self, err) {
            (_, AzError::MissingCredential(_)) => Disposition::Fatal,
            (ErrorPolicy::Fatal, _) => Disposition::Fatal,
            (ErrorPolicy::Recoverable, _) => Disposition::Banner,
        }
    }
}
