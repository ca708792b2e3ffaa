// build-info — snapshot of the build configuration the web app reads at
// runtime from www/.cordova-app-data/, plus a bounded build history.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use super::{skipped, Hook, Outcome};
use crate::context::{HookContext, Stage};
use crate::model::snapshot::{BuildHistory, BuildSnapshot};
use crate::platform::Platform;
use crate::text::files::write_file;

pub const PREFERENCES: &[&str] = &["APP_NAME", "VERSION_NUMBER", "VERSION_CODE", "ENVIRONMENT", "API_HOSTNAME"];

pub const BUILD_INFO: &str = "build-info.json";
pub const APP_CONFIG: &str = "app-config.json";
pub const HISTORY: &str = "build-history.json";

pub struct BuildInfo;

impl Hook for BuildInfo {
    fn name(&self) -> &'static str { "build-info" }
    fn description(&self) -> &'static str { "build config snapshot + history under www/.cordova-app-data" }
    fn stages(&self) -> &'static [Stage] { &[Stage::BeforePrepare] }

    fn run(&self, ctx: &HookContext, _platform: Option<Platform>) -> Result<Outcome> {
        if PREFERENCES.iter().all(|p| ctx.pref(p, None).is_none()) {
            return skipped("no build preferences set");
        }
        let snapshot = snapshot(ctx);
        let dir = ctx.app_data_dir();

        let json = serde_json::to_string_pretty(&snapshot)? + "\n";
        write_file(&dir.join(BUILD_INFO), &json)?;
        write_file(&dir.join(APP_CONFIG), &json)?;

        let mut history = read_history(&dir.join(HISTORY));
        if let Some(previous) = history.latest() {
            tracing::debug!(
                "previous build {} ({})",
                previous.version.as_deref().unwrap_or("?"),
                previous.built_at.to_rfc3339()
            );
        }
        history.push(snapshot, ctx.settings.history_limit);
        let history_json = serde_json::to_string_pretty(&history)? + "\n";
        write_file(&dir.join(HISTORY), history_json)?;
        tracing::debug!("{} build(s) in {}", history.entries.len(), HISTORY);
        Ok(Outcome::Applied(3))
    }
}

/// Preferences first, <widget> metadata as the fallback.
fn snapshot(ctx: &HookContext) -> BuildSnapshot {
    let pref = |name: &str| ctx.pref(name, None).map(str::to_string);
    let config = &ctx.config;
    BuildSnapshot {
        app_name: pref("APP_NAME").or_else(|| config.name.clone()),
        app_id: pref("PACKAGE_NAME").or_else(|| config.widget_id.clone()),
        version: pref("VERSION_NUMBER").or_else(|| config.version.clone()),
        version_code: pref("VERSION_CODE")
            .or_else(|| config.android_version_code.clone())
            .or_else(|| config.ios_bundle_version.clone()),
        environment: pref("ENVIRONMENT"),
        api_hostname: pref("API_HOSTNAME"),
        platforms: ctx.platforms.iter().map(|p| p.as_str().to_string()).collect(),
        cordova_version: ctx.cordova_version.clone(),
        stage: ctx.stage.to_string(),
        built_at: Utc::now(),
    }
}

/// A missing file starts a new history; an unreadable one is replaced.
fn read_history(path: &Path) -> BuildHistory {
    if !path.exists() { return BuildHistory::default(); }
    let parsed = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))
        .and_then(|text| serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display())));
    match parsed {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!("{:#}; starting a new build history", e);
            BuildHistory::default()
        }
    }
}
