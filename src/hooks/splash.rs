// splash-color — launch screen background on both platforms.
// Android: colors.xml resources + splash items in styles/themes.
// iOS: backgroundColor of every LaunchScreen storyboard.

use std::path::Path;

use anyhow::Result;

use super::{android_resource_color, color_pref, skipped, Hook, Outcome, MOBILE};
use crate::context::{HookContext, Stage};
use crate::model::color::Color;
use crate::platform::android::AndroidLayout;
use crate::platform::ios::IosLayout;
use crate::platform::Platform;
use crate::text::files::{find_all_files, patch_file, write_file};
use crate::text::xml::{resource_value, set_resource_value, set_storyboard_background, set_style_items};

pub const PREFERENCES: &[&str] = &["SplashScreenBackgroundColor", "BackgroundColor"];

const STYLE_ITEMS: &[&str] = &[
    "windowSplashScreenBackground",
    "android:windowSplashScreenBackground",
    "android:windowBackground",
];

const EMPTY_RESOURCES: &str = "<?xml version='1.0' encoding='utf-8'?>\n<resources>\n</resources>\n";

pub struct SplashColor;

impl Hook for SplashColor {
    fn name(&self) -> &'static str { "splash-color" }
    fn description(&self) -> &'static str { "launch screen background from SplashScreenBackgroundColor" }
    fn stages(&self) -> &'static [Stage] { &[Stage::AfterPrepare, Stage::BeforeCompile] }
    fn platforms(&self) -> &'static [Platform] { MOBILE }

    fn run(&self, ctx: &HookContext, platform: Option<Platform>) -> Result<Outcome> {
        let Some(color) = color_pref(ctx, PREFERENCES, platform)? else {
            return skipped("SplashScreenBackgroundColor not set");
        };
        match platform {
            Some(Platform::Android) => match AndroidLayout::resolve(&ctx.project_root) {
                Some(layout) => Ok(Outcome::Applied(apply_android(&layout, &color)?)),
                None => skipped("android platform not added"),
            },
            Some(Platform::Ios) => match IosLayout::resolve(&ctx.project_root) {
                Some(layout) => Ok(Outcome::Applied(apply_ios(&layout, &color)?)),
                None => skipped("ios platform not added"),
            },
            None => skipped("platform hook invoked without a platform"),
        }
    }
}

fn apply_android(layout: &AndroidLayout, color: &Color) -> Result<usize> {
    let value = android_resource_color(color);
    let mut written = 0;

    let colors_xml = layout.colors_xml();
    if !colors_xml.exists() {
        write_file(&colors_xml, EMPTY_RESOURCES)?;
    }
    if patch_file(&colors_xml, |xml| set_splash_resources(xml, &value))? {
        written += 1;
    }

    for styles in find_all_files(&layout.res_dir(), &["values*/styles.xml", "values*/themes.xml"]) {
        let changed = patch_file(&styles, |xml| {
            let (out, n) = set_style_items(xml, STYLE_ITEMS, &value, |current| current.starts_with('#'))?;
            if n > 0 { tracing::debug!("{}: {} splash item(s)", file_label(&styles), n); }
            Ok(out)
        })?;
        if changed { written += 1; }
    }
    Ok(written)
}

/// `cdv_splashscreen_background` is always set; `splash_background` only
/// when the project already declares it.
fn set_splash_resources(xml: &str, value: &str) -> Result<String> {
    let mut out = set_resource_value(xml, "color", "cdv_splashscreen_background", value)?;
    if resource_value(&out, "color", "splash_background")?.is_some() {
        out = set_resource_value(&out, "color", "splash_background", value)?;
    }
    Ok(out)
}

fn apply_ios(layout: &IosLayout, color: &Color) -> Result<usize> {
    let mut written = 0;
    for storyboard in layout.launch_storyboards() {
        let changed = patch_file(&storyboard, |xml| {
            let (out, n) = set_storyboard_background(xml, color)?;
            if n == 0 { tracing::debug!("{}: no backgroundColor", file_label(&storyboard)); }
            Ok(out)
        })?;
        if changed { written += 1; }
    }
    Ok(written)
}

fn file_label(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}
