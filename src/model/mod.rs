pub mod color;
pub mod snapshot;
