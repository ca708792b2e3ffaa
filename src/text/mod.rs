pub mod colors;
pub mod files;
pub mod xml;
