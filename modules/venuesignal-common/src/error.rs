use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading venue tables and event logs.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("missing required column `{column}` in {path}")]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Errors raised while assembling configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingEnv(&'static str),
}
