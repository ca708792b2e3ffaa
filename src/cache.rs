// Download cache — last good copy of every CDN asset, so an offline or
// flaky build still gets its icon and stylesheet.
// Index lives at ~/.cache/cordova-hooks/downloads.toml, payloads next to it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::net::Http;

/// Entries kept in the index; the oldest fetches are dropped first.
const MAX_ENTRIES: usize = 200;

#[derive(Serialize, Deserialize, Default)]
struct CacheIndex {
    /// url → entry
    #[serde(default)]
    entries: HashMap<String, CacheEntry>,
}

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    file: String,
    bytes: u64,
    fetched_at: DateTime<Utc>,
}

pub struct DownloadCache {
    root: PathBuf,
    index: CacheIndex,
}

impl DownloadCache {
    pub fn default_root() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("cordova-hooks")
    }

    pub fn open(root: &Path) -> Self {
        let index = std::fs::read_to_string(root.join("downloads.toml"))
            .ok()
            .and_then(|text| toml::from_str(&text).ok())
            .unwrap_or_default();
        Self { root: root.to_path_buf(), index }
    }

    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        let entry = self.index.entries.get(url)?;
        std::fs::read(self.root.join(&entry.file)).ok()
    }

    pub fn put(&mut self, url: &str, bytes: &[u8]) -> Result<()> {
        let file = file_name_for(url);
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.root.join(&file), bytes)?;
        self.index.entries.insert(url.to_string(), CacheEntry {
            file,
            bytes: bytes.len() as u64,
            fetched_at: Utc::now(),
        });
        self.evict(MAX_ENTRIES);
        let text = toml::to_string(&self.index)?;
        std::fs::write(self.root.join("downloads.toml"), text)?;
        Ok(())
    }

    /// Drop the oldest entries, and their payloads, beyond `keep`.
    fn evict(&mut self, keep: usize) {
        if self.index.entries.len() <= keep { return; }
        let mut by_age: Vec<(String, DateTime<Utc>)> = self.index.entries.iter()
            .map(|(url, e)| (url.clone(), e.fetched_at))
            .collect();
        by_age.sort_by_key(|(_, at)| *at);
        let excess = by_age.len() - keep;
        for (url, _) in by_age.into_iter().take(excess) {
            if let Some(entry) = self.index.entries.remove(&url) {
                let _ = std::fs::remove_file(self.root.join(&entry.file));
                tracing::debug!("evicted cached {}", url);
            }
        }
    }
}

/// Readable, filesystem-safe prefix plus a digest of the full URL, so URLs
/// differing only in punctuation never share a file.
fn file_name_for(url: &str) -> String {
    let mut name: String = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    name.truncate(80);
    // FNV-1a
    let digest = url.bytes().fold(0xcbf29ce484222325u64, |h, b| (h ^ u64::from(b)).wrapping_mul(0x100000001b3));
    format!("{}-{:016x}.bin", name, digest)
}

/// Download `url`, refreshing the cache on success and falling back to the
/// cached copy on failure.
pub fn download(http: &Http, cache: Option<&mut DownloadCache>, url: &str) -> Result<Vec<u8>> {
    match http.get_bytes(url) {
        Ok(bytes) => {
            if let Some(cache) = cache {
                if let Err(e) = cache.put(url, &bytes) {
                    tracing::debug!("could not cache {}: {:#}", url, e);
                }
            }
            Ok(bytes)
        }
        Err(e) => {
            let cached = cache.as_ref().and_then(|c| Some((c.get(url)?, c.index.entries.get(url)?.clone())));
            match cached {
                Some((bytes, entry)) => {
                    tracing::warn!(
                        "{:#}; using cached copy ({} bytes, fetched {})",
                        e, entry.bytes, entry.fetched_at.to_rfc3339()
                    );
                    Ok(bytes)
                }
                None => Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stores_and_reloads_entries() {
        let dir = tempfile::tempdir().unwrap();
        let url = "https://cdn.example.com/brand/icon.png?v=2";
        let mut cache = DownloadCache::open(dir.path());
        assert!(cache.get(url).is_none());
        cache.put(url, b"png-bytes").unwrap();

        let reopened = DownloadCache::open(dir.path());
        assert_eq!(reopened.get(url).as_deref(), Some(&b"png-bytes"[..]));
        assert_eq!(reopened.index.entries[url].bytes, 9);
    }

    #[test]
    fn urls_differing_in_punctuation_get_their_own_files() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = ("https://cdn.example.com/a/b", "https://cdn.example.com/a?b");
        assert_ne!(file_name_for(a), file_name_for(b));

        let mut cache = DownloadCache::open(dir.path());
        cache.put(a, b"first").unwrap();
        cache.put(b, b"second").unwrap();
        assert_eq!(cache.get(a).as_deref(), Some(&b"first"[..]));
        assert_eq!(cache.get(b).as_deref(), Some(&b"second"[..]));
    }

    #[test]
    fn oldest_entries_are_evicted() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DownloadCache::open(dir.path());
        for n in 0..4 {
            cache.put(&format!("https://cdn.example.com/{}.png", n), b"x").unwrap();
            std::thread::sleep(Duration::from_millis(5));
        }
        let oldest = cache.index.entries["https://cdn.example.com/0.png"].file.clone();
        cache.evict(2);
        assert_eq!(cache.index.entries.len(), 2);
        assert!(cache.get("https://cdn.example.com/0.png").is_none());
        assert!(cache.get("https://cdn.example.com/3.png").is_some());
        assert!(!dir.path().join(oldest).exists());
    }

    #[test]
    fn long_urls_get_bounded_names() {
        let url = format!("https://cdn.example.com/{}", "a".repeat(300));
        let name = file_name_for(&url);
        assert!(name.len() < 130);
        assert_ne!(name, file_name_for(&format!("{}b", url)));
    }

    #[test]
    fn falls_back_to_cache_when_offline() {
        let dir = tempfile::tempdir().unwrap();
        let url = &crate::net::testing::unreachable_url("/icon.png");
        let mut cache = DownloadCache::open(dir.path());
        cache.put(url, b"cached").unwrap();
        let http = Http::new(Duration::from_secs(2)).unwrap();
        assert_eq!(download(&http, Some(&mut cache), url).unwrap(), b"cached");
        assert!(download(&http, None, url).is_err());
    }
}
