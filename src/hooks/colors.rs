// replace-colors — rewrite a retired brand color (OLD_COLOR) to the current
// splash/background color in every platform source the theme may live in.

use std::path::Path;

use anyhow::Result;

use super::{color_pref, skipped, splash, Hook, Outcome, MOBILE};
use crate::context::{HookContext, Stage};
use crate::model::color::Color;
use crate::platform::android::AndroidLayout;
use crate::platform::ios::IosLayout;
use crate::platform::Platform;
use crate::text::colors::replace_colors_in_file;
use crate::text::files::find_all_files;

const ANDROID_SOURCES: &[&str] = &["res/**/*.xml", "java/**/*.java", "**/*.kt"];
const IOS_SOURCES: &[&str] = &["**/*.swift", "**/*.plist", "**/*.storyboard", "**/*.m"];

pub struct ReplaceColors;

impl Hook for ReplaceColors {
    fn name(&self) -> &'static str { "replace-colors" }
    fn description(&self) -> &'static str { "OLD_COLOR → splash color across resources and sources" }
    fn stages(&self) -> &'static [Stage] { &[Stage::AfterPrepare, Stage::BeforeCompile] }
    fn platforms(&self) -> &'static [Platform] { MOBILE }

    fn run(&self, ctx: &HookContext, platform: Option<Platform>) -> Result<Outcome> {
        let Some(old) = color_pref(ctx, &["OLD_COLOR"], platform)? else {
            return skipped("OLD_COLOR not set");
        };
        let Some(new) = color_pref(ctx, splash::PREFERENCES, platform)? else {
            return skipped("no SplashScreenBackgroundColor to replace OLD_COLOR with");
        };
        if old.same_rgb(&new) {
            return skipped(format!("OLD_COLOR is already {}", new));
        }
        let (root, patterns) = match platform {
            Some(Platform::Android) => match AndroidLayout::resolve(&ctx.project_root) {
                Some(layout) => (layout.main_dir, ANDROID_SOURCES),
                None => return skipped("android platform not added"),
            },
            Some(Platform::Ios) => match IosLayout::resolve(&ctx.project_root) {
                Some(layout) => (layout.root, IOS_SOURCES),
                None => return skipped("ios platform not added"),
            },
            None => return skipped("platform hook invoked without a platform"),
        };
        Ok(Outcome::Applied(replace_in_tree(&root, patterns, &old, &new)?))
    }
}

/// Returns the number of files rewritten.
fn replace_in_tree(root: &Path, patterns: &[&str], old: &Color, new: &Color) -> Result<usize> {
    let mut written = 0;
    for path in find_all_files(root, patterns) {
        let count = replace_colors_in_file(&path, old, new)?;
        if count > 0 {
            tracing::debug!("{}: {} → {} ×{}", path.display(), old, new, count);
            written += 1;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r##"<widget id="com.acme.app">
    <preference name="OLD_COLOR" value="#1E1464" />
    <preference name="SplashScreenBackgroundColor" value="#001833" />
</widget>"##;

    #[test]
    fn rewrites_android_resources_and_java() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("platforms/android/app/src/main");
        std::fs::create_dir_all(main.join("res/values")).unwrap();
        std::fs::create_dir_all(main.join("java/com/acme")).unwrap();
        std::fs::create_dir_all(main.join("build/intermediates")).unwrap();
        std::fs::write(main.join("res/values/colors.xml"), "<color name=\"brand\">##1E1464</color>").unwrap();
        std::fs::write(main.join("java/com/acme/Theme.java"), "int c = 0xFF1E1464;").unwrap();
        std::fs::write(main.join("build/intermediates/colors.xml"), "#1E1464").unwrap();
        std::fs::write(main.join("res/values/strings.xml"), "<string name=\"x\">#ABCDEF</string>").unwrap();

        let ctx = HookContext::for_test(dir.path(), CONFIG, Stage::AfterPrepare, vec![Platform::Android]);
        assert_eq!(ReplaceColors.run(&ctx, Some(Platform::Android)).unwrap(), Outcome::Applied(2));
        assert_eq!(
            std::fs::read_to_string(main.join("res/values/colors.xml")).unwrap(),
            "<color name=\"brand\">#001833</color>"
        );
        assert_eq!(std::fs::read_to_string(main.join("java/com/acme/Theme.java")).unwrap(), "int c = 0xFF001833;");
        assert_eq!(std::fs::read_to_string(main.join("build/intermediates/colors.xml")).unwrap(), "#1E1464");
    }

    #[test]
    fn rewrites_swift_sources() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("platforms/ios");
        std::fs::create_dir_all(root.join("Acme.xcodeproj")).unwrap();
        std::fs::create_dir_all(root.join("Acme")).unwrap();
        let swift = "let brand = UIColor(red: 0.118, green: 0.078, blue: 0.392, alpha: 1.0)";
        std::fs::write(root.join("Acme/Theme.swift"), swift).unwrap();

        let ctx = HookContext::for_test(dir.path(), CONFIG, Stage::BeforeCompile, vec![Platform::Ios]);
        assert_eq!(ReplaceColors.run(&ctx, Some(Platform::Ios)).unwrap(), Outcome::Applied(1));
        let out = std::fs::read_to_string(root.join("Acme/Theme.swift")).unwrap();
        assert_eq!(out, "let brand = UIColor(red: 0.0, green: 0.094, blue: 0.2, alpha: 1.0)");
    }

    #[test]
    fn same_color_is_skipped() {
        let config = r##"<widget><preference name="OLD_COLOR" value="001833" />
            <preference name="BackgroundColor" value="#001833" /></widget>"##;
        let ctx = HookContext::for_test(Path::new("."), config, Stage::AfterPrepare, vec![]);
        assert!(matches!(ReplaceColors.run(&ctx, Some(Platform::Android)).unwrap(), Outcome::Skipped(_)));
    }
}
