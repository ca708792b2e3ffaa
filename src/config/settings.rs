// cordova-hooks.toml in the project root, else ~/.config/cordova-hooks/config.toml
// ref: toml crate — https://docs.rs/toml/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::snapshot::DEFAULT_HISTORY_LIMIT;

pub const FILE_NAME: &str = "cordova-hooks.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Socket timeout for CDN downloads and the build notification.
    pub http_timeout_secs: u64,
    /// Entries kept in www/.cordova-app-data/build-history.json.
    pub history_limit: usize,
    /// Hook names never run, e.g. `["build-notify"]`.
    pub disabled: Vec<String>,
    /// Backdrop for iOS icons, which must be opaque.
    pub icon_background: String,
    /// Keep a copy of every CDN download and fall back to it when offline.
    pub cache: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http_timeout_secs: 30,
            history_limit: DEFAULT_HISTORY_LIMIT,
            disabled: Vec::new(),
            icon_background: "#FFFFFF".to_string(),
            cache: true,
        }
    }
}

impl Settings {
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cordova-hooks").join("config.toml"))
    }

    /// Project file first, then the user file; an unreadable or invalid file
    /// is reported and defaults are used instead.
    pub fn load(project_root: &Path) -> Self {
        let candidates = std::iter::once(project_root.join(FILE_NAME)).chain(Self::user_path());
        for path in candidates {
            if !path.exists() { continue; }
            match Self::read(&path) {
                Ok(settings) => {
                    tracing::debug!("settings loaded from {}", path.display());
                    return settings;
                }
                Err(e) => {
                    tracing::warn!("ignoring {}: {:#}", path.display(), e);
                    return Self::default();
                }
            }
        }
        Self::default()
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let settings: Self = toml::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.clamp(1, 300))
    }

    pub fn is_disabled(&self, hook: &str) -> bool {
        self.disabled.iter().any(|d| d.eq_ignore_ascii_case(hook))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FILE_NAME), "disabled = [\"build-notify\"]\nhttp_timeout_secs = 0\n").unwrap();
        let settings = Settings::load(dir.path());
        assert!(settings.is_disabled("BUILD-NOTIFY"));
        assert_eq!(settings.history_limit, 50);
        assert_eq!(settings.http_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FILE_NAME), "history_limit = \"lots\"").unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn save_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(FILE_NAME);
        let settings = Settings { history_limit: 7, ..Settings::default() };
        settings.save(&path).unwrap();
        assert_eq!(Settings::read(&path).unwrap(), settings);
    }
}
