// Invocation context — everything a hook may read, resolved once per run.
// Cordova runs script hooks from the project root and exports
// CORDOVA_PLATFORMS / CORDOVA_VERSION; the CLI maps those onto this struct.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::cache::DownloadCache;
use crate::config::config_xml::ConfigXml;
use crate::config::settings::Settings;
use crate::net::Http;
use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Stage {
    #[value(name = "before_prepare")]
    BeforePrepare,
    #[value(name = "after_prepare")]
    AfterPrepare,
    #[value(name = "before_compile")]
    BeforeCompile,
    #[value(name = "after_compile", alias = "post_compile")]
    AfterCompile,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::BeforePrepare => "before_prepare",
            Stage::AfterPrepare => "after_prepare",
            Stage::BeforeCompile => "before_compile",
            Stage::AfterCompile => "after_compile",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct HookContext {
    pub project_root: PathBuf,
    pub platforms: Vec<Platform>,
    pub cordova_version: Option<String>,
    pub stage: Stage,
    pub config: ConfigXml,
    pub settings: Settings,
    /// Download cache location; `None` disables caching.
    pub cache_dir: Option<PathBuf>,
}

impl HookContext {
    /// `platforms` empty → every platform already added under `platforms/`.
    pub fn new(
        project_root: &Path,
        platforms: Vec<Platform>,
        cordova_version: Option<String>,
        stage: Stage,
    ) -> Result<Self> {
        if !project_root.is_dir() {
            bail!("project root {} is not a directory", project_root.display());
        }
        let config = ConfigXml::load(project_root).context("loading config.xml")?;
        let settings = Settings::load(project_root);
        let platforms = if platforms.is_empty() { Platform::installed(project_root) } else { platforms };
        let cache_dir = settings.cache.then(DownloadCache::default_root);
        Ok(Self {
            project_root: project_root.to_path_buf(),
            platforms,
            cordova_version: cordova_version.filter(|v| !v.trim().is_empty()),
            stage,
            config,
            settings,
            cache_dir,
        })
    }

    /// Preference lookup; see [`ConfigXml::preference`].
    pub fn pref(&self, name: &str, platform: Option<Platform>) -> Option<&str> {
        self.config.preference(name, platform)
    }

    /// The project's source `www/`.
    pub fn www_dir(&self) -> PathBuf {
        self.project_root.join("www")
    }

    pub fn app_data_dir(&self) -> PathBuf {
        self.www_dir().join(".cordova-app-data")
    }

    pub fn http(&self) -> Result<Http> {
        Http::new(self.settings.http_timeout())
    }

    pub fn download_cache(&self) -> Option<DownloadCache> {
        self.cache_dir.as_deref().map(DownloadCache::open)
    }
}

#[cfg(test)]
impl HookContext {
    /// Context over `root` with the given config.xml text and no cache.
    pub fn for_test(root: &Path, config_xml: &str, stage: Stage, platforms: Vec<Platform>) -> Self {
        Self {
            project_root: root.to_path_buf(),
            platforms,
            cordova_version: Some("12.0.0".into()),
            stage,
            config: ConfigXml::parse(config_xml).unwrap(),
            settings: Settings::default(),
            cache_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn stage_names_follow_cordova() {
        assert_eq!(Stage::from_str("after_prepare", false), Ok(Stage::AfterPrepare));
        assert_eq!(Stage::from_str("post_compile", false), Ok(Stage::AfterCompile));
        assert_eq!(Stage::BeforeCompile.to_string(), "before_compile");
    }

    #[test]
    fn defaults_to_installed_platforms() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("platforms/android")).unwrap();
        let ctx = HookContext::new(dir.path(), vec![], Some(" ".into()), Stage::AfterPrepare).unwrap();
        assert_eq!(ctx.platforms, vec![Platform::Android]);
        assert!(ctx.cordova_version.is_none());
        assert_eq!(ctx.app_data_dir(), dir.path().join("www/.cordova-app-data"));

        let ctx = HookContext::new(dir.path(), vec![Platform::Ios], None, Stage::AfterPrepare).unwrap();
        assert_eq!(ctx.platforms, vec![Platform::Ios]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(HookContext::new(&dir.path().join("nope"), vec![], None, Stage::AfterPrepare).is_err());
    }
}
