// Stage operations — run hooks against a HookContext and report.
// These take the registry explicitly rather than building it, so the runner
// can be exercised with stand-in hooks.

use anyhow::{bail, Result};

use crate::context::HookContext;
use crate::hooks::{Hook, Outcome};
use crate::platform::Platform;

/// One hook invocation for one target.
#[derive(Debug)]
pub struct HookRun {
    pub hook: &'static str,
    pub platform: Option<Platform>,
    /// `Err` holds the formatted error chain.
    pub result: Result<Outcome, String>,
}

#[derive(Debug, Default)]
pub struct StageReport {
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
    pub runs: Vec<HookRun>,
}

impl StageReport {
    fn record(&mut self, run: HookRun) {
        match &run.result {
            Ok(Outcome::Applied(_)) => self.applied += 1,
            Ok(Outcome::Skipped(_)) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
        self.runs.push(run);
    }

    /// Files written across every run.
    pub fn files_written(&self) -> usize {
        self.runs.iter()
            .map(|r| match r.result { Ok(Outcome::Applied(n)) => n, _ => 0 })
            .sum()
    }
}

// ── Running ───────────────────────────────────────────────────────────────────

/// Run every enabled hook registered for `ctx.stage`. Hook failures are
/// logged and counted; the stage always completes.
pub fn run_stage(ctx: &HookContext, hooks: &[Box<dyn Hook>]) -> StageReport {
    let mut report = StageReport::default();
    for hook in hooks.iter().filter(|h| h.stages().contains(&ctx.stage)) {
        if ctx.settings.is_disabled(hook.name()) {
            tracing::debug!("↷ {}: disabled in settings", hook.name());
            continue;
        }
        for target in targets(hook.as_ref(), &ctx.platforms) {
            report.record(run_one(hook.as_ref(), ctx, target));
        }
    }
    tracing::info!(
        "{}: {} applied, {} skipped, {} failed ({} file(s) written)",
        ctx.stage, report.applied, report.skipped, report.failed, report.files_written()
    );
    report
}

/// Run the hook called `name` regardless of stage or settings.
pub fn run_hook(ctx: &HookContext, hooks: &[Box<dyn Hook>], name: &str) -> Result<StageReport> {
    let Some(hook) = hooks.iter().find(|h| h.name().eq_ignore_ascii_case(name)) else {
        bail!("unknown hook '{}' (see `cordova-hooks list`)", name);
    };
    if ctx.settings.is_disabled(hook.name()) {
        tracing::info!("{} is disabled in settings; running it because it was asked for", hook.name());
    }
    let mut report = StageReport::default();
    for target in targets(hook.as_ref(), &ctx.platforms) {
        report.record(run_one(hook.as_ref(), ctx, target));
    }
    Ok(report)
}

/// `[None]` for project-level hooks, else the context platforms the hook supports.
fn targets(hook: &dyn Hook, platforms: &[Platform]) -> Vec<Option<Platform>> {
    if hook.platforms().is_empty() {
        return vec![None];
    }
    let targets: Vec<_> = platforms.iter().copied()
        .filter(|p| hook.platforms().contains(p))
        .map(Some)
        .collect();
    if targets.is_empty() {
        tracing::debug!("↷ {}: no matching platform", hook.name());
    }
    targets
}

fn run_one(hook: &dyn Hook, ctx: &HookContext, platform: Option<Platform>) -> HookRun {
    let label = match platform {
        Some(p) => format!("{} [{}]", hook.name(), p),
        None => hook.name().to_string(),
    };
    let result = match hook.run(ctx, platform) {
        Ok(outcome) => {
            let mark = if matches!(outcome, Outcome::Applied(_)) { "✓" } else { "↷" };
            tracing::info!("{} {}: {}", mark, label, describe(&outcome));
            Ok(outcome)
        }
        Err(e) => {
            tracing::warn!("✗ {}: {:#}", label, e);
            Err(format!("{:#}", e))
        }
    };
    HookRun { hook: hook.name(), platform, result }
}

/// Log wording; hooks that act without writing files (build-notify) just
/// report `done`.
fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Applied(0) => "done".to_string(),
        Outcome::Applied(n) => format!("{} file(s) written", n),
        Outcome::Skipped(reason) => reason.clone(),
    }
}

// ── Listing ───────────────────────────────────────────────────────────────────

/// One line per hook: name, stages, platforms, description.
pub fn list_hooks(hooks: &[Box<dyn Hook>]) -> Vec<String> {
    let width = hooks.iter().map(|h| h.name().len()).max().unwrap_or(0);
    hooks.iter()
        .map(|h| {
            let stages: Vec<&str> = h.stages().iter().map(|s| s.as_str()).collect();
            let platforms = if h.platforms().is_empty() {
                "project".to_string()
            } else {
                h.platforms().iter().map(|p| p.as_str()).collect::<Vec<_>>().join(",")
            };
            format!("{:<width$}  {:<29}  {:<11}  {}", h.name(), stages.join(","), platforms, h.description())
        })
        .collect()
}
