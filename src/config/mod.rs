pub mod config_xml;
pub mod settings;
