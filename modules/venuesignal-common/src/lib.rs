pub mod config;
pub mod dataset;
pub mod error;
pub mod file_config;
pub mod tables;
pub mod types;

pub use config::Config;
pub use dataset::DatasetStore;
pub use error::{ConfigError, DataError};
pub use file_config::{
    load_config, FileConfig, IdentityConfig, RecurrenceConfig, ScoreMode, SpatialConfig,
    VerificationConfig,
};
pub use types::*;
