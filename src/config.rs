use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ErrorPolicy;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub error_policy: ErrorPolicy,
    /// Copy a record's url to the clipboard when opening it in the browser.
    pub copy_url_on_open: bool,
    pub wrap_width: usize,
    pub token_env: String,
    pub request_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::default(),
            copy_url_on_open: true,
            wrap_width: 80,
            token_env: "AZURE_DEVOPS_PAT".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub organization_url: String,
    pub project: String,
    pub repository: String,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            organization_url: "https://wkeuds.visualstudio.com".to_string(),
            project: "NewPOL".to_string(),
            repository: "ERPRepo.Client.OINV".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkItemQuery {
    pub changed_within_days: u32,
    pub teams: Vec<String>,
    pub types: Vec<String>,
}

impl Default for WorkItemQuery {
    fn default() -> Self {
        Self {
            changed_within_days: 15,
            teams: [
                "Krypton Team",
                "Atalaya Team",
                "Eternia Team",
                "Castillo Grayskull",
                "Estación Zeta",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            types: ["Task", "User Story", "Bug", "Defect"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl WorkItemQuery {
    pub fn wiql(&self) -> String {
        format!(
            "SELECT * FROM WorkItems WHERE [System.ChangedDate] >= @Today - {} \
             AND [System.NodeName] IN ({}) AND [System.WorkItemType] IN ({})",
            self.changed_within_days,
            quoted_list(&self.teams),
            quoted_list(&self.types)
        )
    }
}

/// WIQL string literals escape a single quote by doubling it.
fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub azure: AzureConfig,
    #[serde(default)]
    pub work_items: WorkItemQuery,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("lazyaz").join("config.toml"))
}

impl Config {
    /// Load from `path`, or the default location when `None`.
    /// A missing file yields defaults; an unreadable one is logged and ignored.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Config::default()
            }
        }
    }
}
