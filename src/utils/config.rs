use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::db::ConnectionInfo;

pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 64;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub connection: ConnectionInfo,
    /// WHATWG label of the encoding scripts are read with.
    pub encoding: String,
    pub max_include_depth: Option<usize>,
    pub commit_after_batch: bool,
    pub log_filter: String,
    pub timestamps: bool,
    /// Run on every new connection before the script. Empty by default, so
    /// scripts see the session exactly as the database sets it up.
    pub session_statements: Vec<String>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            connection: ConnectionInfo::default(),
            encoding: "utf-8".to_string(),
            max_include_depth: Some(DEFAULT_MAX_INCLUDE_DEPTH),
            commit_after_batch: true,
            log_filter: "info".to_string(),
            timestamps: false,
            session_statements: Vec::new(),
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("sqlplus_runner");
            path.push("config.json");
            path
        })
    }

    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::new(),
        }
    }

    /// Read the config at `path`, falling back to defaults when it is
    /// missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::new();
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %path.display(), "config read error: {err}");
                return Self::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), "config parse error: {err}");
                Self::new()
            }
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!("config persistence error: {err}");
                return Err(Box::new(err));
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
