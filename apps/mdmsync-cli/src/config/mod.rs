//! Configuration management for the mdmsync CLI

mod credentials;
mod paths;
mod settings;

pub use credentials::load_credentials;
pub use paths::{ConfigPaths, CONFIG_DIR_ENV};
pub use settings::{DirectorySettings, MdmSettings, SessionSettings, Settings, DEFAULT_MDM_URL};
