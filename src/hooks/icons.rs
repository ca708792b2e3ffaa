// app-icon — one CDN image resized into every launcher icon slot.
// iOS: AppIcon.appiconset PNGs (opaque) + a regenerated Contents.json.
// Android: mipmap-*/ic_launcher.png, plus round/foreground variants the
// project already ships.
// ref: image crate — https://docs.rs/image/

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use super::{skipped, Hook, Outcome, MOBILE};
use crate::cache::download;
use crate::context::{HookContext, Stage};
use crate::model::color::Color;
use crate::net::is_http_url;
use crate::platform::android::{AndroidLayout, MIPMAP_DENSITIES};
use crate::platform::ios::{format_points, icon_file_name, icon_pixels, IosLayout, APP_ICON_SLOTS};
use crate::platform::Platform;
use crate::text::files::write_file;

/// Adaptive icon foregrounds keep artwork inside the 72dp safe zone of 108dp.
const SAFE_ZONE: f32 = 72.0 / 108.0;

#[derive(Debug, Serialize, Deserialize)]
struct Contents {
    images: Vec<ContentsImage>,
    info: ContentsInfo,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentsImage {
    size: String,
    idiom: String,
    filename: String,
    scale: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentsInfo {
    version: u32,
    author: String,
}

pub struct AppIcon;

impl Hook for AppIcon {
    fn name(&self) -> &'static str { "app-icon" }
    fn description(&self) -> &'static str { "launcher icons from the CDN_ICON image" }
    fn stages(&self) -> &'static [Stage] { &[Stage::AfterPrepare] }
    fn platforms(&self) -> &'static [Platform] { MOBILE }

    fn run(&self, ctx: &HookContext, platform: Option<Platform>) -> Result<Outcome> {
        let Some(url) = ctx.pref("CDN_ICON", platform) else {
            return skipped("CDN_ICON not set");
        };
        if !is_http_url(url) { bail!("CDN_ICON '{}' is not an http(s) URL", url); }

        match platform {
            Some(Platform::Android) => {
                let Some(layout) = AndroidLayout::resolve(&ctx.project_root) else {
                    return skipped("android platform not added");
                };
                let icon = fetch_icon(ctx, url)?;
                Ok(Outcome::Applied(write_android_icons(&icon, &layout.res_dir())?))
            }
            Some(Platform::Ios) => {
                let Some(layout) = IosLayout::resolve(&ctx.project_root) else {
                    return skipped("ios platform not added");
                };
                let background = Color::parse(&ctx.settings.icon_background)
                    .context("settings icon_background")?;
                let set_dir = layout.app_icon_set()
                    .unwrap_or_else(|| layout.app_dir().join("Images.xcassets").join("AppIcon.appiconset"));
                let icon = fetch_icon(ctx, url)?;
                Ok(Outcome::Applied(write_ios_icons(&icon, &set_dir, &background)?))
            }
            None => skipped("platform hook invoked without a platform"),
        }
    }
}

fn fetch_icon(ctx: &HookContext, url: &str) -> Result<DynamicImage> {
    let http = ctx.http()?;
    let mut cache = ctx.download_cache();
    let bytes = download(&http, cache.as_mut(), url)?;
    let icon = image::load_from_memory(&bytes).with_context(|| format!("decoding {}", url))?;
    if icon.width() != icon.height() {
        tracing::warn!("icon is {}x{}, not square; it will be stretched", icon.width(), icon.height());
    }
    Ok(icon)
}

fn save_png(path: &Path, save: impl FnOnce(&Path) -> image::ImageResult<()>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    save(path).with_context(|| format!("writing {}", path.display()))
}

/// Resize onto an opaque `background`; App Store icons must not carry alpha.
fn flattened(icon: &DynamicImage, px: u32, background: &Color) -> RgbImage {
    let resized = icon.resize_exact(px, px, FilterType::Lanczos3).to_rgba8();
    let mut canvas = RgbaImage::from_pixel(px, px, Rgba([background.r, background.g, background.b, 0xFF]));
    imageops::overlay(&mut canvas, &resized, 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

/// Writes one PNG per distinct file name and a Contents.json listing every
/// slot. Returns the number of PNGs written.
fn write_ios_icons(icon: &DynamicImage, set_dir: &Path, background: &Color) -> Result<usize> {
    let mut files = BTreeSet::new();
    let mut images = Vec::with_capacity(APP_ICON_SLOTS.len());
    for &(idiom, points, scale) in APP_ICON_SLOTS {
        let filename = icon_file_name(points, scale);
        if files.insert(filename.clone()) {
            let png = flattened(icon, icon_pixels(points, scale), background);
            save_png(&set_dir.join(&filename), |p| png.save_with_format(p, ImageFormat::Png))?;
        }
        let size = format_points(points);
        images.push(ContentsImage {
            size: format!("{}x{}", size, size),
            idiom: idiom.to_string(),
            filename,
            scale: format!("{}x", scale),
        });
    }
    let contents = Contents {
        images,
        info: ContentsInfo { version: 1, author: "cordova-hooks".to_string() },
    };
    let json = serde_json::to_string_pretty(&contents)?;
    write_file(&set_dir.join("Contents.json"), json + "\n")?;
    tracing::debug!("{} icons in {}", files.len(), set_dir.display());
    Ok(files.len())
}

/// Icon scaled into the safe zone of a transparent `px` square.
fn adaptive_foreground(icon: &DynamicImage, px: u32) -> RgbaImage {
    let inner = ((px as f32) * SAFE_ZONE).round() as u32;
    let art = icon.resize_exact(inner, inner, FilterType::Lanczos3).to_rgba8();
    let mut canvas = RgbaImage::new(px, px);
    let offset = i64::from((px - inner) / 2);
    imageops::overlay(&mut canvas, &art, offset, offset);
    canvas
}

fn write_android_icons(icon: &DynamicImage, res_dir: &Path) -> Result<usize> {
    let mut written = 0;
    for &(density, px, foreground_px) in MIPMAP_DENSITIES {
        let dir = res_dir.join(format!("mipmap-{}", density));
        let launcher = icon.resize_exact(px, px, FilterType::Lanczos3);
        save_png(&dir.join("ic_launcher.png"), |p| launcher.save_with_format(p, ImageFormat::Png))?;
        written += 1;

        let round = dir.join("ic_launcher_round.png");
        if round.exists() {
            save_png(&round, |p| launcher.save_with_format(p, ImageFormat::Png))?;
            written += 1;
        }

        let v26 = res_dir.join(format!("mipmap-{}-v26", density));
        for fg in [dir.join("ic_launcher_foreground.png"), v26.join("ic_launcher_foreground.png")] {
            if !fg.exists() { continue; }
            let art = adaptive_foreground(icon, foreground_px);
            save_png(&fg, |p| art.save_with_format(p, ImageFormat::Png))?;
            written += 1;
        }
    }
    Ok(written)
}
