// config.xml — Cordova project config. Only what the hooks read:
// <widget> metadata, <name>, global and per-platform <preference> entries.

use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use thiserror::Error;

use crate::platform::Platform;
use crate::text::xml::attr_value;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    pub name: String,
    pub value: String,
    /// `None` for top-level preferences, `Some` inside `<platform name="…">`.
    pub platform: Option<Platform>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigXml {
    pub widget_id: Option<String>,
    pub version: Option<String>,
    pub android_version_code: Option<String>,
    pub ios_bundle_version: Option<String>,
    pub name: Option<String>,
    pub preferences: Vec<Preference>,
}

impl ConfigXml {
    pub fn path(project_root: &Path) -> PathBuf {
        project_root.join("config.xml")
    }

    /// Missing config.xml is not an error: every hook simply finds no preferences.
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(project_root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        Self::parse(&text).map_err(|message| ConfigError::Parse { path, message })
    }

    pub fn parse(xml: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(xml);
        let mut config = ConfigXml::default();
        let mut stack: Vec<String> = Vec::new();
        let mut platform: Option<Option<Platform>> = None;
        let mut name_buf: Option<String> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                format!("{} at byte {}", e, reader.buffer_position())
            })?;
            match event {
                Event::Start(e) => {
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    match tag.as_str() {
                        "widget" if stack.is_empty() => config.read_widget(&e),
                        "platform" => platform = Some(attr_value(&e, "name").and_then(|n| Platform::from_name(&n))),
                        "name" if stack.len() == 1 => name_buf = Some(String::new()),
                        "preference" => config.push_preference(&e, platform.flatten(), platform.is_some()),
                        _ => {}
                    }
                    stack.push(tag);
                }
                Event::Empty(e) => {
                    let tag = e.local_name();
                    match tag.as_ref() {
                        b"widget" if stack.is_empty() => config.read_widget(&e),
                        b"preference" => config.push_preference(&e, platform.flatten(), platform.is_some()),
                        _ => {}
                    }
                }
                Event::Text(t) => {
                    if let Some(buf) = name_buf.as_mut() {
                        buf.push_str(&t.unescape().map_err(|e| e.to_string())?);
                    }
                }
                Event::End(_) => {
                    match stack.pop().as_deref() {
                        Some("platform") => platform = None,
                        Some("name") if stack.len() == 1 => {
                            if let Some(name) = name_buf.take() {
                                let name = name.trim().to_string();
                                if !name.is_empty() { config.name = Some(name); }
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(config)
    }

    fn read_widget(&mut self, e: &quick_xml::events::BytesStart) {
        self.widget_id = attr_value(e, "id");
        self.version = attr_value(e, "version");
        self.android_version_code = attr_value(e, "android-versionCode");
        self.ios_bundle_version = attr_value(e, "ios-CFBundleVersion");
    }

    fn push_preference(&mut self, e: &quick_xml::events::BytesStart, platform: Option<Platform>, in_platform: bool) {
        // preferences for platforms this tool does not patch are ignored
        if in_platform && platform.is_none() { return; }
        let (Some(name), Some(value)) = (attr_value(e, "name"), attr_value(e, "value")) else { return };
        self.preferences.push(Preference { name, value, platform });
    }

    /// Preference value for `platform`: a platform-scoped entry wins over a
    /// global one, the last declaration wins within a scope, names compare
    /// case-insensitively and blank values count as absent.
    pub fn preference(&self, name: &str, platform: Option<Platform>) -> Option<&str> {
        let lookup = |scope: Option<Platform>| {
            self.preferences.iter().rev()
                .find(|p| p.platform == scope && p.name.eq_ignore_ascii_case(name))
                .map(|p| p.value.trim())
                .filter(|v| !v.is_empty())
        };
        platform.and_then(|p| lookup(Some(p))).or_else(|| lookup(None))
    }
}
