// iOS project layout — the app name is the stem of the single
// `*.xcodeproj` Cordova generates under platforms/ios.

use std::path::{Path, PathBuf};

use crate::text::files::find_all_files;

use super::Platform;

pub struct IosLayout {
    pub root: PathBuf,
    pub app_name: String,
}

/// (idiom, size in points, scale) — the classic AppIcon.appiconset slots.
pub const APP_ICON_SLOTS: &[(&str, f32, u32)] = &[
    ("iphone", 20.0, 2), ("iphone", 20.0, 3),
    ("iphone", 29.0, 2), ("iphone", 29.0, 3),
    ("iphone", 40.0, 2), ("iphone", 40.0, 3),
    ("iphone", 60.0, 2), ("iphone", 60.0, 3),
    ("ipad", 20.0, 1), ("ipad", 20.0, 2),
    ("ipad", 29.0, 1), ("ipad", 29.0, 2),
    ("ipad", 40.0, 1), ("ipad", 40.0, 2),
    ("ipad", 76.0, 1), ("ipad", 76.0, 2),
    ("ipad", 83.5, 2),
    ("ios-marketing", 1024.0, 1),
];

impl IosLayout {
    /// None when the platform has not been added or has no Xcode project.
    pub fn resolve(project_root: &Path) -> Option<Self> {
        let root = Platform::Ios.dir(project_root);
        let pattern = format!("{}/*.xcodeproj", glob::Pattern::escape(&root.to_string_lossy()));
        let project = glob::glob(&pattern).ok()?
            .filter_map(|p| p.ok())
            .find(|p| p.is_dir())?;
        let app_name = project.file_stem()?.to_string_lossy().into_owned();
        Some(Self { root, app_name })
    }

    pub fn app_dir(&self) -> PathBuf {
        self.root.join(&self.app_name)
    }

    pub fn info_plist(&self) -> Option<PathBuf> {
        let named = self.app_dir().join(format!("{}-Info.plist", self.app_name));
        if named.exists() { return Some(named); }
        find_all_files(&self.app_dir(), &["*Info.plist", "**/*-Info.plist"]).into_iter().next()
    }

    pub fn pbxproj(&self) -> PathBuf {
        self.root.join(format!("{}.xcodeproj", self.app_name)).join("project.pbxproj")
    }

    pub fn app_icon_set(&self) -> Option<PathBuf> {
        ["Images.xcassets", "Assets.xcassets"].iter()
            .map(|assets| self.app_dir().join(assets).join("AppIcon.appiconset"))
            .find(|p| p.is_dir())
            .or_else(|| {
                let pattern = format!("{}/**/AppIcon.appiconset", glob::Pattern::escape(&self.root.to_string_lossy()));
                glob::glob(&pattern).ok()?.filter_map(|p| p.ok()).find(|p| p.is_dir())
            })
    }

    pub fn launch_storyboards(&self) -> Vec<PathBuf> {
        find_all_files(&self.root, &["**/*LaunchScreen*.storyboard"])
    }
}

/// `icon-83.5@2x.png`
pub fn icon_file_name(points: f32, scale: u32) -> String {
    format!("icon-{}@{}x.png", format_points(points), scale)
}

/// `20`, `83.5`
pub fn format_points(points: f32) -> String {
    if points.fract() == 0.0 { format!("{}", points as u32) } else { format!("{}", points) }
}

pub fn icon_pixels(points: f32, scale: u32) -> u32 {
    (points * scale as f32).round() as u32
}
