// webview-background — paint the native view behind the web view so there is
// no white flash between splash and first render. The inserted statement is
// marked, so later runs update it in place instead of adding another.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::{color_pref, skipped, Hook, Outcome, MOBILE};
use crate::context::{HookContext, Stage};
use crate::model::color::Color;
use crate::platform::android::AndroidLayout;
use crate::platform::ios::IosLayout;
use crate::platform::Platform;
use crate::text::files::{find_all_files, patch_file};

const MARKER: &str = "// cordova-hooks:webview-background";

static MARKED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)[^\n]*// cordova-hooks:webview-background[ \t]*$").unwrap()
});
static LOAD_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)loadUrl\(launchUrl\);[ \t]*$").unwrap());
static RETURN_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)return\b").unwrap());

pub struct WebviewBackground;

impl Hook for WebviewBackground {
    fn name(&self) -> &'static str { "webview-background" }
    fn description(&self) -> &'static str { "native background behind the web view" }
    fn stages(&self) -> &'static [Stage] { &[Stage::AfterPrepare] }
    fn platforms(&self) -> &'static [Platform] { MOBILE }

    fn run(&self, ctx: &HookContext, platform: Option<Platform>) -> Result<Outcome> {
        let Some(color) = color_pref(ctx, &["WEBVIEW_BACKGROUND_COLOR"], platform)? else {
            return skipped("WEBVIEW_BACKGROUND_COLOR not set");
        };
        match platform {
            Some(Platform::Android) => {
                let Some(layout) = AndroidLayout::resolve(&ctx.project_root) else {
                    return skipped("android platform not added");
                };
                let Some(activity) = layout.main_activity() else {
                    return skipped("MainActivity.java not found");
                };
                let statement = android_statement(&color);
                let written = patch_file(&activity, |text| {
                    Ok(upsert(text, &statement, insert_after_load_url).unwrap_or_else(|| {
                        tracing::warn!("{}: no loadUrl(launchUrl); to anchor on", activity.display());
                        text.to_string()
                    }))
                })?;
                Ok(Outcome::Applied(usize::from(written)))
            }
            Some(Platform::Ios) => {
                let Some(layout) = IosLayout::resolve(&ctx.project_root) else {
                    return skipped("ios platform not added");
                };
                let delegates = find_all_files(&layout.root, &["**/AppDelegate.swift", "**/AppDelegate.m"]);
                if delegates.is_empty() {
                    return skipped("no AppDelegate found");
                }
                let mut written = 0;
                for path in delegates {
                    let is_swift = path.extension().is_some_and(|e| e == "swift");
                    let statement = if is_swift { swift_statement(&color) } else { objc_statement(&color) };
                    let changed = patch_file(&path, |text| {
                        Ok(upsert(text, &statement, insert_before_launch_return).unwrap_or_else(|| {
                            tracing::warn!("{}: no didFinishLaunchingWithOptions return", path.display());
                            text.to_string()
                        }))
                    })?;
                    if changed { written += 1; }
                }
                Ok(Outcome::Applied(written))
            }
            None => skipped("platform hook invoked without a platform"),
        }
    }
}

fn android_statement(color: &Color) -> String {
    format!("appView.getView().setBackgroundColor({});", color.to_java_literal())
}

fn swift_statement(color: &Color) -> String {
    format!("self.window?.backgroundColor = {}", color.to_swift_literal())
}

fn objc_statement(color: &Color) -> String {
    format!("self.window.backgroundColor = {};", color.to_objc_literal())
}

/// Replace the marked line if there is one, otherwise let `insert` place a
/// new one. None when there is nowhere to put it.
fn upsert(text: &str, statement: &str, insert: fn(&str, &str) -> Option<String>) -> Option<String> {
    let line = format!("{} {}", statement, MARKER);
    if let Some(caps) = MARKED_LINE.captures(text) {
        let (m, indent) = (caps.get(0)?, &caps[1]);
        return Some(format!("{}{}{}{}", &text[..m.start()], indent, line, &text[m.end()..]));
    }
    insert(text, &line)
}

fn insert_after_load_url(text: &str, line: &str) -> Option<String> {
    let caps = LOAD_URL.captures(text)?;
    let (m, indent) = (caps.get(0)?, &caps[1]);
    Some(format!("{}\n{}{}{}", &text[..m.end()], indent, line, &text[m.end()..]))
}

fn insert_before_launch_return(text: &str, line: &str) -> Option<String> {
    let start = text.find("didFinishLaunchingWithOptions")?;
    let caps = RETURN_LINE.captures_at(text, start)?;
    let (m, indent) = (caps.get(0)?, &caps[1]);
    Some(format!("{}{}{}\n{}", &text[..m.start()], indent, line, &text[m.start()..]))
}
