pub mod blob_paths;
pub mod error;
mod loader;
mod raw;

pub use error::ConfigError;
pub use loader::{load_settings, BucketNames, DeploymentMode, Settings};
