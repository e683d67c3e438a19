//! Credential store: a JSON file holding the GitHub username and personal
//! access token, read at startup and written on `login`.

use anyhow::{Context, Result};
use directories_next::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

#[derive(Deserialize, Serialize, PartialEq, Eq, Clone, Default, Debug)]
pub struct GitHubConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Deserialize, Serialize, PartialEq, Eq, Clone, Default, Debug)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GitHubConfig,
}

impl AppConfig {
    /// A missing file yields the default config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at `{}`.", path.display()))?;
        let config = serde_json::from_str(&data)
            .with_context(|| format!("Malformed config at `{}`.", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
            .with_context(|| format!("Failed to write config at `{}`.", path.display()))?;
        info!(path = %path.display(), "config saved");
        Ok(())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "gilt").context("Could not determine a home directory.")
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}

pub fn default_drafts_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join("drafts.sqlite3"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            github: GitHubConfig { username: "mlf".to_owned(), token: "t0k3n".to_owned() },
        };
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{}").unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }
}
