// build-notify — tell an external API that a platform build compiled.
// One POST, no retry; a rejected notification is reported, never fatal to
// the build.

use anyhow::{bail, Result};
use serde::Serialize;

use super::{skipped, Hook, Outcome, MOBILE};
use crate::context::{HookContext, Stage};
use crate::net::Http;
use crate::platform::Platform;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildNotification {
    pub app_name: String,
    pub app_domain: String,
    pub app_platform: String,
    pub config_version: String,
}

pub struct BuildNotify;

impl Hook for BuildNotify {
    fn name(&self) -> &'static str { "build-notify" }
    fn description(&self) -> &'static str { "POST a build-success notification" }
    fn stages(&self) -> &'static [Stage] { &[Stage::AfterCompile] }
    fn platforms(&self) -> &'static [Platform] { MOBILE }

    fn run(&self, ctx: &HookContext, platform: Option<Platform>) -> Result<Outcome> {
        let Some(platform) = platform else {
            return skipped("platform hook invoked without a platform");
        };
        if !ctx.pref("ENABLE_BUILD_NOTIFICATION", Some(platform)).is_some_and(is_truthy) {
            return skipped("ENABLE_BUILD_NOTIFICATION is off");
        }
        let Some(url) = ctx.pref("BUILD_SUCCESS_API_URL", Some(platform)) else {
            return skipped("BUILD_SUCCESS_API_URL not set");
        };
        if !url.to_ascii_lowercase().starts_with("https://") {
            tracing::warn!("refusing to send the build token to non-https URL {}", url);
            return skipped("BUILD_SUCCESS_API_URL is not https");
        }
        let token = ctx.pref("BUILD_API_BEARER_TOKEN", Some(platform));
        let payload = notification(ctx, platform);
        send(&ctx.http()?, url, &payload, token)?;
        Ok(Outcome::Applied(0))
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

fn notification(ctx: &HookContext, platform: Platform) -> BuildNotification {
    let pick = |pref: &str, fallback: &Option<String>| {
        ctx.pref(pref, Some(platform))
            .map(str::to_string)
            .or_else(|| fallback.clone())
            .unwrap_or_default()
    };
    BuildNotification {
        app_name: pick("APP_NAME", &ctx.config.name),
        app_domain: pick("PACKAGE_NAME", &ctx.config.widget_id),
        app_platform: platform.to_string(),
        config_version: pick("VERSION_NUMBER", &ctx.config.version),
    }
}

fn send(http: &Http, url: &str, payload: &BuildNotification, token: Option<&str>) -> Result<()> {
    let reply = http.post_json(url, payload, token)?;
    if !reply.is_success() {
        bail!("notification rejected with {}: {}", reply.status, reply.body);
    }
    tracing::info!("build notification sent for {} ({})", payload.app_domain, payload.app_platform);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::testing::serve_once;
    use std::time::Duration;

    const CONFIG: &str = r#"<widget id="com.acme.app" version="4.0.0">
    <name>Acme</name>
    <preference name="ENABLE_BUILD_NOTIFICATION" value="Yes" />
    <preference name="BUILD_SUCCESS_API_URL" value="http://builds.example.com/hook" />
    <platform name="ios">
        <preference name="BUILD_SUCCESS_API_URL" value="https://builds.example.com/hook" />
    </platform>
</widget>"#;

    #[test]
    fn payload_prefers_preferences() {
        let ctx = HookContext::for_test(std::path::Path::new("."), CONFIG, Stage::AfterCompile, vec![]);
        assert_eq!(notification(&ctx, Platform::Ios), BuildNotification {
            app_name: "Acme".into(),
            app_domain: "com.acme.app".into(),
            app_platform: "ios".into(),
            config_version: "4.0.0".into(),
        });
    }

    #[test]
    fn posts_json_with_bearer_token() {
        let (base, server) = serve_once(200, b"ok".to_vec());
        let url = format!("{}/builds", base);
        let http = Http::new(Duration::from_secs(5)).unwrap();
        let ctx = HookContext::for_test(std::path::Path::new("."), CONFIG, Stage::AfterCompile, vec![]);
        send(&http, &url, &notification(&ctx, Platform::Android), Some("tok")).unwrap();

        let (head, body) = server.join().unwrap();
        let head = head.to_ascii_lowercase();
        assert!(head.starts_with("post /builds "));
        assert!(head.contains("authorization: bearer tok"));
        assert!(head.contains("content-type: application/json"));
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["app_platform"], "android");
        assert_eq!(json["app_domain"], "com.acme.app");
    }

    #[test]
    fn rejected_notification_is_an_error() {
        let (base, server) = serve_once(500, b"nope :(".to_vec());
        let url = format!("{}/builds", base);
        let http = Http::new(Duration::from_secs(5)).unwrap();
        let ctx = HookContext::for_test(std::path::Path::new("."), CONFIG, Stage::AfterCompile, vec![]);
        let err = send(&http, &url, &notification(&ctx, Platform::Ios), None).unwrap_err();
        assert!(format!("{:#}", err).contains("500"));
        let (head, _) = server.join().unwrap();
        assert!(!head.to_ascii_lowercase().contains("authorization"));
    }

    #[test]
    fn plain_http_endpoints_are_refused() {
        let ctx = HookContext::for_test(std::path::Path::new("."), CONFIG, Stage::AfterCompile, vec![]);
        assert!(matches!(BuildNotify.run(&ctx, Some(Platform::Android)).unwrap(), Outcome::Skipped(_)));
    }

    #[test]
    fn truthy_values() {
        assert!(is_truthy(" TRUE "));
        assert!(is_truthy("1"));
        assert!(!is_truthy("no"));
        assert!(!is_truthy(""));
    }
}
