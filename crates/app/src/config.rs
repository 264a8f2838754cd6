//! Application configuration
//!
//! Read from a TOML file; every section and field is optional.
//!
//! ```toml
//! roster = "staff.toml"
//! export_dir = "exports"
//!
//! [session]
//! demo_mode = false
//! reel_count = 1
//!
//! [session.timing]
//! decel = 3.0
//!
//! [caption]
//! provider = "gemini"
//! model = "gemini-2.0-flash"
//! timeout_secs = 8.0
//!
//! [rehearsal]
//! seed = 7
//! fast_timing = true
//! realtime = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use luckydraw_caption::GeminiCaptions;
use luckydraw_core::{Error, Result, SessionSettings, SlotTiming};
use serde::{Deserialize, Serialize};

/// Which caption generator to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionProvider {
    #[default]
    Template,
    Gemini,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    pub provider: CaptionProvider,
    pub model: String,
    pub timeout_secs: f64,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            provider: CaptionProvider::Template,
            model: GeminiCaptions::DEFAULT_MODEL.to_string(),
            timeout_secs: 8.0,
        }
    }
}

impl CaptionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs.max(0.0))
    }
}

/// Unattended run through the prize list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RehearsalConfig {
    /// Fixed seed for a reproducible run
    pub seed: Option<u64>,
    /// Swap in the shortened timing profile
    pub fast_timing: bool,
    /// Follow the wall clock; otherwise jump straight to each deadline
    pub realtime: bool,
    /// Longest wait for captions before confirming a reveal
    pub caption_wait_secs: f64,
    pub frame_millis: u64,
}

impl Default for RehearsalConfig {
    fn default() -> Self {
        Self {
            seed: None,
            fast_timing: true,
            realtime: true,
            caption_wait_secs: 10.0,
            frame_millis: 16,
        }
    }
}

impl RehearsalConfig {
    pub fn caption_wait(&self) -> Duration {
        Duration::from_secs_f64(self.caption_wait_secs.max(0.0))
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_millis.max(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Roster file (TOML or JSON), relative to the config file
    pub roster: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub session: SessionSettings,
    pub caption: CaptionConfig,
    pub rehearsal: RehearsalConfig,
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.session.validate()?;
        Ok(config)
    }

    /// Load from an explicit path (must exist), else the default path if it
    /// exists, else defaults.
    pub fn load(explicit: Option<&Path>, default_path: Option<&Path>) -> Result<Self> {
        let path = match (explicit, default_path) {
            (Some(path), _) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path
            }
            (None, Some(path)) if path.exists() => path,
            _ => {
                tracing::info!("No config file, using defaults");
                return Ok(Self::default());
            }
        };

        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.resolve_paths(path.parent().unwrap_or_else(|| Path::new(".")));
        tracing::info!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Make relative paths relative to the config file's directory
    fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.roster, &mut self.export_dir].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Session settings with the rehearsal timing applied if requested
    pub fn effective_settings(&self) -> SessionSettings {
        let mut settings = self.session.clone();
        if self.rehearsal.fast_timing {
            settings.timing = SlotTiming::rehearsal();
        }
        settings
    }
}
