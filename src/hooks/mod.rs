// Hook registry — one small, independent file edit per hook. Hooks never read
// each other's output; a hook that fails is reported by the stage runner
// and the rest of the stage carries on.

pub mod app_info;
pub mod build_info;
pub mod colors;
pub mod icons;
pub mod inject;
pub mod notify;
pub mod splash;
pub mod webview;

use anyhow::{Context, Result};

use crate::context::{HookContext, Stage};
use crate::model::color::Color;
use crate::platform::Platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Number of files written.
    Applied(usize),
    Skipped(String),
}

pub trait Hook {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn stages(&self) -> &'static [Stage];
    /// Platforms the hook runs for; empty → once per invocation.
    fn platforms(&self) -> &'static [Platform] {
        &[]
    }
    fn run(&self, ctx: &HookContext, platform: Option<Platform>) -> Result<Outcome>;
}

/// Every hook, in the order a stage runs them.
pub fn registry() -> Vec<Box<dyn Hook>> {
    vec![
        Box::new(build_info::BuildInfo),
        Box::new(inject::InjectAssets),
        Box::new(app_info::AppInfo),
        Box::new(splash::SplashColor),
        Box::new(colors::ReplaceColors),
        Box::new(webview::WebviewBackground),
        Box::new(icons::AppIcon),
        Box::new(notify::BuildNotify),
    ]
}

pub(crate) const MOBILE: &[Platform] = &[Platform::Android, Platform::Ios];

pub(crate) fn skipped(reason: impl Into<String>) -> Result<Outcome> {
    Ok(Outcome::Skipped(reason.into()))
}

/// First of `names` that is set, parsed as a color. A set but invalid value
/// is an error rather than a silent skip.
pub(crate) fn color_pref(ctx: &HookContext, names: &[&str], platform: Option<Platform>) -> Result<Option<Color>> {
    let Some((name, value)) = names.iter().find_map(|n| ctx.pref(n, platform).map(|v| (*n, v))) else {
        return Ok(None);
    };
    let color = Color::parse(value).with_context(|| format!("preference {}", name))?;
    Ok(Some(color))
}

/// Colors written into Android resources: `#RRGGBB`, or `#AARRGGBB` when translucent.
pub(crate) fn android_resource_color(color: &Color) -> String {
    if color.a == 0xFF { color.to_hex() } else { color.to_android_hex() }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_CONFIG: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<widget id="io.cordova.hellocordova" version="1.0.0" xmlns="http://www.w3.org/ns/widgets">
    <name>HelloCordova</name>
</widget>
"#;

    #[test]
    fn hook_names_are_unique() {
        let mut names: Vec<_> = registry().iter().map(|h| h.name()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn empty_config_skips_every_hook() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("www")).unwrap();
        std::fs::write(dir.path().join("www/index.html"), "<html><head></head><body></body></html>").unwrap();
        let ctx = HookContext::for_test(dir.path(), EMPTY_CONFIG, Stage::AfterPrepare, vec![]);
        for hook in registry() {
            let targets: Vec<Option<Platform>> = if hook.platforms().is_empty() {
                vec![None]
            } else {
                hook.platforms().iter().copied().map(Some).collect()
            };
            for target in targets {
                let outcome = hook.run(&ctx, target).unwrap();
                assert!(matches!(outcome, Outcome::Skipped(_)), "{} {:?} → {:?}", hook.name(), target, outcome);
            }
        }
    }

    #[test]
    fn invalid_color_preference_is_an_error() {
        let config = r##"<widget id="a.b"><preference name="BackgroundColor" value="#12" /></widget>"##;
        let ctx = HookContext::for_test(std::path::Path::new("."), config, Stage::AfterPrepare, vec![]);
        assert!(color_pref(&ctx, &["SplashScreenBackgroundColor", "BackgroundColor"], None).is_err());
        assert_eq!(color_pref(&ctx, &["SplashScreenBackgroundColor"], None).unwrap(), None);
    }
}
