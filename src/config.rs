use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::parser::block::{Markers, DEFAULT_END_MARKER, DEFAULT_START_MARKER};

/// Looked up in the working directory when no explicit file is given.
pub const DEFAULT_CONFIG_FILE: &str = "critiques";
pub const ENV_PREFIX: &str = "CRITIQUES";

pub const DEFAULT_INPUT_DIR: &str = "golden-critiques";
pub const DEFAULT_STORE_PATH: &str = "golden-critiques/golden_critiques_by_dog.json";
pub const DEFAULT_DB_PATH: &str = "golden-critiques/reports.sqlite";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub start_marker: String,
    pub end_marker: String,
    pub input_dir: PathBuf,
    pub store_path: PathBuf,
    pub db_path: PathBuf,
}

impl Settings {
    /// Defaults, then `critiques.toml` (or `file`), then `CRITIQUES_*` env.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("start_marker", DEFAULT_START_MARKER)?
            .set_default("end_marker", DEFAULT_END_MARKER)?
            .set_default("input_dir", DEFAULT_INPUT_DIR)?
            .set_default("store_path", DEFAULT_STORE_PATH)?
            .set_default("db_path", DEFAULT_DB_PATH)?;

        builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn markers(&self) -> Markers {
        Markers {
            start: self.start_marker.clone(),
            end: self.end_marker.clone(),
        }
    }
}
