// app-info — app name, bundle id and version from preferences into the
// generated native projects, overriding what `cordova prepare` copied from
// the <widget> element.

use std::sync::LazyLock;

use anyhow::Result;
use regex::{Captures, NoExpand, Regex};

use super::{skipped, Hook, Outcome, MOBILE};
use crate::context::{HookContext, Stage};
use crate::platform::android::AndroidLayout;
use crate::platform::ios::IosLayout;
use crate::platform::Platform;
use crate::text::files::patch_file;
use crate::text::xml::{element_attr, resource_value, set_attributes, set_plist_strings, set_resource_value};

static PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap());
static GRADLE_APPLICATION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^([ \t]*applicationId[ \t]*=?[ \t]*)(["'])[^"'\n]*["']"#).unwrap());
static PBX_BUNDLE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PRODUCT_BUNDLE_IDENTIFIER = [^;\n]+;").unwrap());

/// Validated metadata preferences; every field is optional.
#[derive(Debug, Default, PartialEq, Eq)]
struct AppMetadata {
    name: Option<String>,
    package: Option<String>,
    version: Option<String>,
    version_code: Option<String>,
}

impl AppMetadata {
    fn from_prefs(ctx: &HookContext, platform: Option<Platform>) -> Self {
        let get = |name: &str| ctx.pref(name, platform).map(str::to_string);
        let package = get("PACKAGE_NAME").filter(|p| {
            let ok = PACKAGE_NAME.is_match(p);
            if !ok { tracing::warn!("PACKAGE_NAME '{}' is not a valid package name; ignored", p); }
            ok
        });
        let version_code = get("VERSION_CODE").filter(|c| {
            let ok = c.parse::<u32>().is_ok();
            if !ok { tracing::warn!("VERSION_CODE '{}' is not a number; ignored", c); }
            ok
        });
        Self { name: get("APP_NAME"), package, version: get("VERSION_NUMBER"), version_code }
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub struct AppInfo;

impl Hook for AppInfo {
    fn name(&self) -> &'static str { "app-info" }
    fn description(&self) -> &'static str { "app name, bundle id and version into native projects" }
    fn stages(&self) -> &'static [Stage] { &[Stage::AfterPrepare] }
    fn platforms(&self) -> &'static [Platform] { MOBILE }

    fn run(&self, ctx: &HookContext, platform: Option<Platform>) -> Result<Outcome> {
        let meta = AppMetadata::from_prefs(ctx, platform);
        if meta.is_empty() {
            return skipped("no APP_NAME / PACKAGE_NAME / VERSION_NUMBER / VERSION_CODE");
        }
        match platform {
            Some(Platform::Android) => match AndroidLayout::resolve(&ctx.project_root) {
                Some(layout) => Ok(Outcome::Applied(apply_android(&layout, &meta)?)),
                None => skipped("android platform not added"),
            },
            Some(Platform::Ios) => match IosLayout::resolve(&ctx.project_root) {
                Some(layout) => Ok(Outcome::Applied(apply_ios(&layout, &meta)?)),
                None => skipped("ios platform not added"),
            },
            None => skipped("platform hook invoked without a platform"),
        }
    }
}

// ── Android ───────────────────────────────────────────────────────────────────

fn apply_android(layout: &AndroidLayout, meta: &AppMetadata) -> Result<usize> {
    let mut written = 0;

    let strings = layout.strings_xml();
    if let Some(name) = &meta.name {
        if strings.exists() && patch_file(&strings, |xml| set_app_name(xml, name))? {
            written += 1;
        }
    }

    let manifest = layout.manifest();
    if manifest.exists() && patch_file(&manifest, |xml| patch_manifest(xml, meta))? {
        written += 1;
    }

    let gradle = layout.app_build_gradle();
    if let Some(package) = &meta.package {
        if gradle.exists() && patch_file(&gradle, |text| Ok(set_application_id(text, package)))? {
            written += 1;
        }
    }
    Ok(written)
}

/// `app_name` always, `launcher_name` when the project declares it.
fn set_app_name(xml: &str, name: &str) -> Result<String> {
    let escaped = android_string_escape(name);
    let mut out = set_resource_value(xml, "string", "app_name", &escaped)?;
    if resource_value(&out, "string", "launcher_name")?.is_some() {
        out = set_resource_value(&out, "string", "launcher_name", &escaped)?;
    }
    Ok(out)
}

fn android_string_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'").replace('"', "\\\"")
}

fn patch_manifest(xml: &str, meta: &AppMetadata) -> Result<String> {
    let mut sets: Vec<(&str, &str)> = Vec::new();
    if let Some(package) = &meta.package {
        // newer cordova-android moved the id to build.gradle's namespace
        if element_attr(xml, "manifest", "package")?.is_some() {
            sets.push(("package", package));
        }
    }
    if let Some(version) = &meta.version { sets.push(("android:versionName", version)); }
    if let Some(code) = &meta.version_code { sets.push(("android:versionCode", code)); }
    if sets.is_empty() { return Ok(xml.to_string()); }
    let (out, _) = set_attributes(xml, "manifest", &sets)?;
    Ok(out)
}

fn set_application_id(text: &str, package: &str) -> String {
    GRADLE_APPLICATION_ID
        .replace_all(text, |caps: &Captures| format!("{}{}{}{}", &caps[1], &caps[2], package, &caps[2]))
        .into_owned()
}

// ── iOS ───────────────────────────────────────────────────────────────────────

fn apply_ios(layout: &IosLayout, meta: &AppMetadata) -> Result<usize> {
    let mut written = 0;

    let mut entries: Vec<(&str, &str)> = Vec::new();
    if let Some(name) = &meta.name {
        entries.push(("CFBundleDisplayName", name));
        entries.push(("CFBundleName", name));
    }
    if let Some(package) = &meta.package { entries.push(("CFBundleIdentifier", package)); }
    if let Some(version) = &meta.version { entries.push(("CFBundleShortVersionString", version)); }
    if let Some(code) = &meta.version_code { entries.push(("CFBundleVersion", code)); }

    match layout.info_plist() {
        Some(plist) if !entries.is_empty() => {
            if patch_file(&plist, |xml| set_plist_strings(xml, &entries))? { written += 1; }
        }
        Some(_) => {}
        None => tracing::warn!("no Info.plist under {}", layout.app_dir().display()),
    }

    let pbxproj = layout.pbxproj();
    if let Some(package) = &meta.package {
        if pbxproj.exists() && patch_file(&pbxproj, |text| Ok(set_bundle_identifier(text, package)))? {
            written += 1;
        }
    }
    Ok(written)
}

fn set_bundle_identifier(text: &str, package: &str) -> String {
    let replacement = format!("PRODUCT_BUNDLE_IDENTIFIER = {};", package);
    PBX_BUNDLE_ID.replace_all(text, NoExpand(&replacement)).into_owned()
}
