// Logging — stderr only; Cordova prints hook output into the build log,
// which already carries timestamps.
// ref: tracing-subscriber — https://docs.rs/tracing-subscriber/

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RUST_LOG wins; otherwise info for this crate (debug with `--verbose`) and
/// warnings from dependencies.
pub fn init(verbose: bool) {
    let default = if verbose { "warn,cordova_hooks=debug" } else { "warn,cordova_hooks=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}
