pub mod android;
pub mod ios;

use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    pub const ALL: &'static [Platform] = &[Platform::Android, Platform::Ios];

    /// Cordova platform name (`android`, `ios`); anything else → None.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "android" => Some(Platform::Android),
            "ios" => Some(Platform::Ios),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }

    /// `platforms/<name>` inside a Cordova project.
    pub fn dir(&self, project_root: &Path) -> PathBuf {
        project_root.join("platforms").join(self.as_str())
    }

    /// Platforms already added to the project.
    pub fn installed(project_root: &Path) -> Vec<Platform> {
        Self::ALL.iter().copied().filter(|p| p.dir(project_root).is_dir()).collect()
    }

    /// Parse a CORDOVA_PLATFORMS style list, dropping unknown names.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = names.iter()
            .flat_map(|n| n.as_ref().split(',').map(str::to_string).collect::<Vec<_>>())
            .filter_map(|n| {
                let p = Platform::from_name(&n);
                if p.is_none() && !n.trim().is_empty() {
                    tracing::debug!("ignoring unsupported platform '{}'", n.trim());
                }
                p
            })
            .collect();
        platforms.sort();
        platforms.dedup();
        platforms
    }

    /// Copied web assets for this platform after `cordova prepare`.
    pub fn www_dir(&self, project_root: &Path) -> PathBuf {
        match self {
            Platform::Android => android::AndroidLayout::new(project_root).www_dir(),
            Platform::Ios => self.dir(project_root).join("www"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
