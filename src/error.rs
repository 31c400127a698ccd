use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for store persistence, document sources and settings.
///
/// Parsing never produces one of these: malformed reports and placements are
/// skipped and counted instead.
#[derive(Debug, Error)]
pub enum CritiqueError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("store file {path} is not valid critique JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed encoding store: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("document source '{name}' is unavailable: {reason}")]
    Source { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CritiqueError>;
