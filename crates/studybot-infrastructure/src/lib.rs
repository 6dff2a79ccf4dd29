pub mod config_loader;
pub mod paths;

pub use crate::config_loader::{load_config, load_default_config, save_config};
pub use crate::paths::StudybotPaths;
