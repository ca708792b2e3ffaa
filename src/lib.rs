// cordova-hooks — Cordova/MABS lifecycle hooks as one binary.
// The CLI in main.rs builds a HookContext and hands it to ops.

pub mod cache;
pub mod config;
pub mod context;
pub mod hooks;
pub mod logging;
pub mod model;
pub mod net;
pub mod ops;
pub mod platform;
pub mod text;
