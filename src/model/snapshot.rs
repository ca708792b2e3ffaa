// Build-config snapshot — the flat record a packaged web view reads at runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSnapshot {
    pub app_name: Option<String>,
    pub app_id: Option<String>,
    pub version: Option<String>,
    pub version_code: Option<String>,
    pub environment: Option<String>,
    pub api_hostname: Option<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    pub cordova_version: Option<String>,
    pub stage: String,
    pub built_at: DateTime<Utc>,
}

/// Append-only log of snapshots, newest last, capped at `limit` entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildHistory {
    pub entries: Vec<BuildSnapshot>,
}

impl BuildHistory {
    pub fn push(&mut self, snapshot: BuildSnapshot, limit: usize) {
        self.entries.push(snapshot);
        let limit = limit.max(1);
        if self.entries.len() > limit {
            let excess = self.entries.len() - limit;
            self.entries.drain(..excess);
        }
    }

    pub fn latest(&self) -> Option<&BuildSnapshot> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(n: usize) -> BuildSnapshot {
        BuildSnapshot {
            app_name: Some(format!("App {}", n)),
            app_id: None,
            version: Some("1.0.0".into()),
            version_code: None,
            environment: None,
            api_hostname: None,
            platforms: vec!["android".into()],
            cordova_version: None,
            stage: "before_prepare".into(),
            built_at: Utc::now(),
        }
    }

    #[test]
    fn history_keeps_only_the_newest_entries() {
        let mut history = BuildHistory::default();
        for n in 0..60 {
            history.push(snap(n), DEFAULT_HISTORY_LIMIT);
        }
        assert_eq!(history.entries.len(), 50);
        assert_eq!(history.entries[0].app_name.as_deref(), Some("App 10"));
        assert_eq!(history.latest().unwrap().app_name.as_deref(), Some("App 59"));
    }

    #[test]
    fn history_serializes_as_a_plain_array() {
        let mut history = BuildHistory::default();
        history.push(snap(1), 5);
        let json = serde_json::to_string(&history).unwrap();
        assert!(json.starts_with('['));
        let back: BuildHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back.entries, history.entries);
    }
}
