use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_bind_addr() -> String {
    std::env::var("PKGX_API_BIND").unwrap_or_else(|_| "0.0.0.0:3150".to_string())
}

fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("PKGX_API_DB_PATH") {
        return PathBuf::from(path);
    }

    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata)
            .join("pkgx")
            .join("api")
            .join("registry.db")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".pkgx")
            .join("api")
            .join("registry.db")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, bind_addr: Option<String>, db_path: Option<PathBuf>) -> Self {
        if let Some(bind_addr) = bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(db_path) = db_path {
            self.db_path = db_path;
        }
        self
    }
}
