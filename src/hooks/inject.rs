// inject-assets — CDN script, CDN stylesheet and background style tags in
// index.html. Every tag carries data-cordova-hooks="…" and sits on its own
// line, so a rerun drops the previous tags before inserting fresh ones.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::{color_pref, skipped, Hook, Outcome};
use crate::cache::download;
use crate::context::{HookContext, Stage};
use crate::net::is_http_url;
use crate::platform::Platform;
use crate::text::files::{patch_file, write_file};

/// Where a downloaded CDN_ASSETS stylesheet lands, relative to `www/`.
pub const LOCAL_CSS: &str = "css/cdn-assets.css";

static MARKED_TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^[^\n]*data-cordova-hooks="[^"]*"[^\n]*\n?"#).unwrap());
static HEAD_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</head\s*>").unwrap());
static BODY_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</body\s*>").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Head,
    Body,
}

/// One tag to place in index.html.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Tag {
    anchor: Anchor,
    html: String,
}

pub struct InjectAssets;

impl Hook for InjectAssets {
    fn name(&self) -> &'static str { "inject-assets" }
    fn description(&self) -> &'static str { "CDN script/stylesheet and background style in index.html" }
    fn stages(&self) -> &'static [Stage] { &[Stage::BeforePrepare, Stage::AfterPrepare] }

    fn run(&self, ctx: &HookContext, _platform: Option<Platform>) -> Result<Outcome> {
        let script = ctx.pref("CDN_RESOURCE", None);
        let stylesheet = ctx.pref("CDN_ASSETS", None);
        let background = color_pref(ctx, &["WEBVIEW_BACKGROUND_COLOR"], None)?;
        if script.is_none() && stylesheet.is_none() && background.is_none() {
            return skipped("no CDN_RESOURCE / CDN_ASSETS / WEBVIEW_BACKGROUND_COLOR");
        }

        let targets = target_www_dirs(ctx);
        let css = match stylesheet {
            Some(url) if is_http_url(url) => fetch_stylesheet(ctx, url),
            Some(url) => {
                tracing::warn!("CDN_ASSETS '{}' is not an http(s) URL; ignored", url);
                None
            }
            None => None,
        };

        let mut written = 0;
        for www in targets {
            let index = www.join("index.html");
            if !index.exists() {
                tracing::debug!("no {}", index.display());
                continue;
            }

            let mut tags = Vec::new();
            if let Some(url) = stylesheet.filter(|u| is_http_url(u)) {
                let href = match &css {
                    Some(bytes) => match write_file(&www.join(LOCAL_CSS), bytes) {
                        Ok(()) => LOCAL_CSS.to_string(),
                        Err(e) => {
                            tracing::warn!("{:#}; linking the CDN stylesheet directly", e);
                            url.to_string()
                        }
                    },
                    None => url.to_string(),
                };
                tags.push(Tag {
                    anchor: Anchor::Head,
                    html: format!(r#"<link rel="stylesheet" href="{}" data-cordova-hooks="cdn-assets">"#, escape_attr(&href)),
                });
            }
            if let Some(color) = background {
                tags.push(Tag {
                    anchor: Anchor::Head,
                    html: format!(
                        r#"<style id="cordova-hooks-background" data-cordova-hooks="background">html, body {{ background-color: {}; }}</style>"#,
                        color.to_hex()
                    ),
                });
            }
            if let Some(url) = script {
                tags.push(Tag {
                    anchor: Anchor::Body,
                    html: format!(r#"<script src="{}" data-cordova-hooks="cdn-resource"></script>"#, escape_attr(url)),
                });
            }

            if patch_file(&index, |html| Ok(inject_tags(html, &tags)))? {
                written += 1;
            }
        }
        Ok(Outcome::Applied(written))
    }
}

/// Project `www/` before prepare; each platform's copy afterwards.
fn target_www_dirs(ctx: &HookContext) -> Vec<PathBuf> {
    match ctx.stage {
        Stage::BeforePrepare => vec![ctx.www_dir()],
        _ => ctx.platforms.iter().map(|p| p.www_dir(&ctx.project_root)).collect(),
    }
}

fn fetch_stylesheet(ctx: &HookContext, url: &str) -> Option<Vec<u8>> {
    let fetched = ctx.http().and_then(|http| {
        let mut cache = ctx.download_cache();
        download(&http, cache.as_mut(), url)
    });
    match fetched {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!("{:#}; linking the CDN stylesheet directly", e);
            None
        }
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;")
}

/// Remove previously injected tags, then insert `tags` on their own lines
/// before `</head>` / `</body>`.
fn inject_tags(html: &str, tags: &[Tag]) -> String {
    let mut out = MARKED_TAG_LINE.replace_all(html, "").into_owned();
    for anchor in [Anchor::Head, Anchor::Body] {
        let lines: Vec<&str> = tags.iter().filter(|t| t.anchor == anchor).map(|t| t.html.as_str()).collect();
        if lines.is_empty() { continue; }
        let re = match anchor {
            Anchor::Head => &*HEAD_END,
            Anchor::Body => &*BODY_END,
        };
        let Some(m) = re.find(&out) else {
            tracing::warn!("index.html has no {}; tags not injected", if anchor == Anchor::Head { "</head>" } else { "</body>" });
            continue;
        };
        out = insert_lines_before(&out, m.start(), &lines);
    }
    out
}

/// Insert `lines` before byte `at`, each on its own line, indented like the
/// element's last child (or one level deeper than the closing tag).
fn insert_lines_before(text: &str, at: usize, lines: &[&str]) -> String {
    let line_start = text[..at].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &text[line_start..at];
    let own_line = prefix.chars().all(|c| c == ' ' || c == '\t');
    let child_indent = text[..line_start].lines().next_back().map(leading_whitespace).unwrap_or("");
    let indent = match own_line {
        true if child_indent.len() > prefix.len() => child_indent.to_string(),
        true => format!("{}    ", prefix),
        false => "    ".to_string(),
    };
    let block: String = lines.iter().map(|l| format!("{}{}\n", indent, l)).collect();
    if own_line {
        format!("{}{}{}", &text[..line_start], block, &text[line_start..])
    } else {
        format!("{}\n{}{}", &text[..at], block, &text[at..])
    }
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start_matches([' ', '\t']).len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::testing::{serve_once, unreachable_url};

    fn injected_count(html: &str) -> usize {
        MARKED_TAG_LINE.find_iter(html).count()
    }

    const INDEX: &str = "<!DOCTYPE html>
<html>
  <head>
    <meta charset=\"utf-8\">
  </head>
  <body>
    <script src=\"cordova.js\"></script>
  </body>
</html>
";

    fn tags() -> Vec<Tag> {
        vec![
            Tag { anchor: Anchor::Head, html: r#"<link rel="stylesheet" href="css/cdn-assets.css" data-cordova-hooks="cdn-assets">"#.into() },
            Tag { anchor: Anchor::Body, html: r#"<script src="https://cdn.example.com/app.js" data-cordova-hooks="cdn-resource"></script>"#.into() },
        ]
    }

    #[test]
    fn injection_is_idempotent() {
        let once = inject_tags(INDEX, &tags());
        assert!(once.contains(
            "    <meta charset=\"utf-8\">\n    <link rel=\"stylesheet\" href=\"css/cdn-assets.css\" data-cordova-hooks=\"cdn-assets\">\n  </head>"
        ), "{}", once);
        assert!(once.contains("data-cordova-hooks=\"cdn-resource\"></script>\n  </body>"));
        let twice = inject_tags(&once, &tags());
        assert_eq!(once, twice);
        assert_eq!(injected_count(&twice), 2);
    }

    #[test]
    fn removed_preferences_remove_their_tags() {
        let once = inject_tags(INDEX, &tags());
        assert_eq!(inject_tags(&once, &[]), INDEX);
    }

    #[test]
    fn closing_tag_sharing_a_line() {
        let html = "<html><head><title>x</title></head><body></body></html>";
        let out = inject_tags(html, &tags()[..1]);
        assert!(out.starts_with("<html><head><title>x</title>\n    <link"), "{}", out);
        // the tag line is removable without touching the surrounding markup
        assert_eq!(inject_tags(&out, &[]), "<html><head><title>x</title>\n</head><body></body></html>");
    }

    #[test]
    fn writes_into_project_www_before_prepare() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("www")).unwrap();
        std::fs::write(dir.path().join("www/index.html"), INDEX).unwrap();
        let config = r##"<widget>
            <preference name="CDN_RESOURCE" value="https://cdn.example.com/app.js?v=1&amp;x=2" />
            <preference name="WEBVIEW_BACKGROUND_COLOR" value="#1e1464" />
        </widget>"##;
        let ctx = HookContext::for_test(dir.path(), config, Stage::BeforePrepare, vec![]);
        assert_eq!(InjectAssets.run(&ctx, None).unwrap(), Outcome::Applied(1));
        assert_eq!(InjectAssets.run(&ctx, None).unwrap(), Outcome::Applied(0));

        let html = std::fs::read_to_string(dir.path().join("www/index.html")).unwrap();
        assert!(html.contains(r#"<script src="https://cdn.example.com/app.js?v=1&amp;x=2" data-cordova-hooks="cdn-resource"></script>"#));
        assert!(html.contains("background-color: #1E1464;"));
    }

    fn project_with_index() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("www")).unwrap();
        std::fs::write(dir.path().join("www/index.html"), INDEX).unwrap();
        dir
    }

    #[test]
    fn downloaded_stylesheet_is_linked_locally() {
        let dir = project_with_index();
        let (base, server) = serve_once(200, b"body { color: #001833; }".to_vec());
        let config = format!(r#"<widget><preference name="CDN_ASSETS" value="{}/brand/app.css" /></widget>"#, base);
        let ctx = HookContext::for_test(dir.path(), &config, Stage::BeforePrepare, vec![]);
        assert_eq!(InjectAssets.run(&ctx, None).unwrap(), Outcome::Applied(1));

        let (head, _) = server.join().unwrap();
        assert!(head.to_ascii_lowercase().starts_with("get /brand/app.css "));
        let css = std::fs::read_to_string(dir.path().join("www").join(LOCAL_CSS)).unwrap();
        assert_eq!(css, "body { color: #001833; }");
        let html = std::fs::read_to_string(dir.path().join("www/index.html")).unwrap();
        assert!(html.contains(r#"<link rel="stylesheet" href="css/cdn-assets.css" data-cordova-hooks="cdn-assets">"#), "{}", html);
    }

    #[test]
    fn failed_download_links_the_cdn_url() {
        let dir = project_with_index();
        let url = unreachable_url("/brand/app.css");
        let config = format!(r#"<widget><preference name="CDN_ASSETS" value="{}" /></widget>"#, url);
        let ctx = HookContext::for_test(dir.path(), &config, Stage::BeforePrepare, vec![]);
        assert_eq!(InjectAssets.run(&ctx, None).unwrap(), Outcome::Applied(1));

        assert!(!dir.path().join("www").join(LOCAL_CSS).exists());
        let html = std::fs::read_to_string(dir.path().join("www/index.html")).unwrap();
        assert!(html.contains(&format!(r#"<link rel="stylesheet" href="{}" data-cordova-hooks="cdn-assets">"#, url)), "{}", html);
    }

    #[test]
    fn targets_platform_copies_after_prepare() {
        let dir = tempfile::tempdir().unwrap();
        let config = "<widget/>";
        let ctx = HookContext::for_test(dir.path(), config, Stage::AfterPrepare, vec![Platform::Android, Platform::Ios]);
        assert_eq!(target_www_dirs(&ctx), vec![
            dir.path().join("platforms/android/app/src/main/assets/www"),
            dir.path().join("platforms/ios/www"),
        ]);
    }
}
