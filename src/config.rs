use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "Mamatoto";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DATABASE_FILE: &str = "mamatoto.db";

pub const ENV_DATA_DIR: &str = "MAMATOTO_DATA_DIR";
pub const ENV_REFERENCE_DIR: &str = "MAMATOTO_REFERENCE_DIR";
pub const ENV_LLM_ENABLED: &str = "MAMATOTO_LLM_ENABLED";

/// Get the application data directory
/// ~/Mamatoto/, or ./Mamatoto/ when no home directory can be resolved
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default database location inside the data directory
pub fn database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

/// Filter used when RUST_LOG is unset
pub fn default_log_filter() -> &'static str {
    "mamatoto=info,warn"
}

/// Runtime settings, resolved from the environment on top of defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    /// Directory holding reference JSON tables; bundled tables when unset.
    pub reference_dir: Option<PathBuf>,
    pub llm_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: app_data_dir(),
            reference_dir: None,
            llm_enabled: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through an arbitrary key lookup. Blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(dir) = get(ENV_DATA_DIR) {
            settings.data_dir = PathBuf::from(dir);
        }
        settings.reference_dir = get(ENV_REFERENCE_DIR).map(PathBuf::from);
        if let Some(flag) = get(ENV_LLM_ENABLED) {
            settings.llm_enabled = parse_flag(&flag);
        }

        settings
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
