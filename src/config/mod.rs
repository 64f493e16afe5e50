//! Configuration loading and normalization

pub mod normalize;
pub mod settings;

pub use normalize::ModuleConfig;
pub use settings::{DEFAULT_FORMAT, Settings, default_config_path};
