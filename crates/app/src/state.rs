//! Application state management

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use luckydraw_core::{Error, Result, Roster};

use crate::config::AppConfig;

const CONFIG_FILE: &str = "luckydraw.toml";

/// Main application state
pub struct AppState {
    pub config: AppConfig,
    data_dir: PathBuf,
}

impl AppState {
    /// Resolve the config (CLI path, then the per-user config dir) and make
    /// sure the data directory exists
    pub fn new(config_arg: Option<&Path>) -> Result<Self> {
        let dirs = Self::project_dirs()?;
        let default_config = dirs.config_dir().join(CONFIG_FILE);
        let config = AppConfig::load(config_arg, Some(&default_config))?;

        let data_dir = dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self { config, data_dir })
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "onyx", "luckydraw").ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Configured export directory, else `<data_dir>/exports`
    pub fn export_dir(&self) -> PathBuf {
        self.config
            .export_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("exports"))
    }

    pub fn load_roster(&self) -> Result<Roster> {
        let path = self
            .config
            .roster
            .as_deref()
            .ok_or_else(|| Error::Config("No roster file configured".into()))?;
        Roster::load(path)
    }
}
