use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{CritiqueError, Result};

use super::DocumentSource;

/// `.txt` reports under a directory. Identifiers are paths relative to the
/// root with `/` separators, so top-level files are keyed by file name.
pub struct DirectorySource {
    root: PathBuf,
    label: String,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let label = root.display().to_string();
        Self { root, label }
    }
}

/// True if the path has a `.txt` extension (case-insensitive).
pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

fn identifier(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

impl DocumentSource for DirectorySource {
    fn name(&self) -> &str {
        &self.label
    }

    fn identifiers(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(CritiqueError::Source {
                name: self.label.clone(),
                reason: "not a directory".to_string(),
            });
        }

        let mut ids = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
        {
            if !is_text_file(entry.path()) {
                debug!("Ignoring non-report file {}", entry.path().display());
                continue;
            }
            if let Some(id) = identifier(&self.root, entry.path()) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn load(&self, id: &str) -> Result<String> {
        let bytes = fs::read(self.root.join(id))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
