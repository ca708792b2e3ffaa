// Android project layout — cordova-android 7+ (app/src/main) with a
// fallback to the legacy flat layout.

use std::path::{Path, PathBuf};

use crate::text::files::find_file;

use super::Platform;

pub struct AndroidLayout {
    pub root: PathBuf,
    /// `app/src/main` on modern projects, the platform root on legacy ones.
    pub main_dir: PathBuf,
}

/// (density qualifier, launcher icon px, adaptive foreground px)
pub const MIPMAP_DENSITIES: &[(&str, u32, u32)] = &[
    ("ldpi", 36, 81),
    ("mdpi", 48, 108),
    ("hdpi", 72, 162),
    ("xhdpi", 96, 216),
    ("xxhdpi", 144, 324),
    ("xxxhdpi", 192, 432),
];

impl AndroidLayout {
    pub fn new(project_root: &Path) -> Self {
        let root = Platform::Android.dir(project_root);
        let modern = root.join("app").join("src").join("main");
        let main_dir = if modern.is_dir() || !root.join("res").is_dir() { modern } else { root.clone() };
        Self { root, main_dir }
    }

    /// None when the platform has not been added.
    pub fn resolve(project_root: &Path) -> Option<Self> {
        let layout = Self::new(project_root);
        layout.root.is_dir().then_some(layout)
    }

    pub fn res_dir(&self) -> PathBuf {
        self.main_dir.join("res")
    }

    pub fn manifest(&self) -> PathBuf {
        let path = self.main_dir.join("AndroidManifest.xml");
        if path.exists() { path } else { find_file(&self.root, "AndroidManifest.xml").unwrap_or(path) }
    }

    pub fn strings_xml(&self) -> PathBuf {
        self.res_dir().join("values").join("strings.xml")
    }

    pub fn colors_xml(&self) -> PathBuf {
        self.res_dir().join("values").join("colors.xml")
    }

    pub fn app_build_gradle(&self) -> PathBuf {
        let app = self.root.join("app").join("build.gradle");
        if app.exists() { app } else { self.root.join("build.gradle") }
    }

    pub fn main_activity(&self) -> Option<PathBuf> {
        find_file(&self.main_dir.join("java"), "MainActivity.java")
            .or_else(|| find_file(&self.root, "MainActivity.java"))
    }

    pub fn www_dir(&self) -> PathBuf {
        self.main_dir.join("assets").join("www")
    }
}
