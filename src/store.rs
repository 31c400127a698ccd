use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CritiqueError, Result};
use crate::parser::{Extraction, Outcome};

/// One judge critique about one dog, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritiqueEntry {
    pub class: String,
    pub critique: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub show: String,
    /// `null` when no year could be inferred.
    #[serde(default)]
    pub year: Option<i32>,
    /// Finishing position from the ordinal; absent for unnumbered buffers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Accumulated critiques keyed by the literal extracted dog name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CritiqueStore {
    dogs: BTreeMap<String, Vec<CritiqueEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub dogs: usize,
    pub entries: usize,
    pub sources: usize,
    pub earliest_year: Option<i32>,
    pub latest_year: Option<i32>,
    pub unknown_year: usize,
    pub owners: usize,
    pub per_class: BTreeMap<String, usize>,
    pub per_place: BTreeMap<u8, usize>,
}

impl CritiqueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a previously written store; a missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No store at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let raw = fs::read_to_string(path)?;
        let store = Self::from_json(&raw).map_err(|source| CritiqueError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "Loaded {} dogs / {} critiques from {}",
            store.dog_count(),
            store.entry_count(),
            path.display()
        );
        Ok(store)
    }

    pub fn from_json(raw: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rewrite the whole store: temp sibling file, fsync, rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_json()?;
        write_atomic(path, bytes.as_bytes())?;
        info!(
            "Saved {} dogs / {} critiques to {}",
            self.dog_count(),
            self.entry_count(),
            path.display()
        );
        Ok(())
    }

    /// Sources already folded in, recomputed from the entries themselves.
    pub fn processed_sources(&self) -> BTreeSet<String> {
        self.dogs
            .values()
            .flatten()
            .filter(|e| !e.source.is_empty())
            .map(|e| e.source.clone())
            .collect()
    }

    pub fn append(&mut self, dog: impl Into<String>, entry: CritiqueEntry) {
        self.dogs.entry(dog.into()).or_default().push(entry);
    }

    /// Append one document's entries. Call [`finalize`](Self::finalize) once
    /// the batch is complete.
    pub fn absorb(&mut self, extraction: Extraction) {
        if let Outcome::Extracted { entries, .. } = extraction.outcome {
            for (dog, entry) in entries {
                self.append(dog, entry);
            }
        }
    }

    /// Fold a batch of extractions into the store and return it deduplicated
    /// and ordered.
    pub fn merged(mut self, extractions: impl IntoIterator<Item = Extraction>) -> Self {
        for extraction in extractions {
            self.absorb(extraction);
        }
        self.finalize();
        self
    }

    /// Per dog: drop empty and repeated critique texts (first wins), then
    /// order by year, newest first, unknown years last.
    pub fn finalize(&mut self) {
        for entries in self.dogs.values_mut() {
            let mut seen: HashSet<String> = HashSet::new();
            entries.retain(|e| {
                let text = e.critique.trim();
                !text.is_empty() && seen.insert(text.to_string())
            });
            entries.sort_by_key(|e| Reverse(e.year.unwrap_or(i32::MIN)));
        }

        let before = self.dogs.len();
        self.dogs.retain(|_, entries| !entries.is_empty());
        if self.dogs.len() < before {
            warn!("Removed {} dogs with no critiques left", before - self.dogs.len());
        }
    }

    pub fn dogs(&self) -> impl Iterator<Item = &str> {
        self.dogs.keys().map(String::as_str)
    }

    pub fn entries(&self, dog: &str) -> &[CritiqueEntry] {
        self.dogs.get(dog).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dog_count(&self) -> usize {
        self.dogs.len()
    }

    pub fn entry_count(&self) -> usize {
        self.dogs.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.dogs.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            dogs: self.dog_count(),
            entries: self.entry_count(),
            sources: self.processed_sources().len(),
            ..Default::default()
        };
        let mut owners = HashSet::new();
        for entry in self.dogs.values().flatten() {
            *stats.per_class.entry(entry.class.clone()).or_default() += 1;
            if let Some(place) = entry.place {
                *stats.per_place.entry(place).or_default() += 1;
            }
            if let Some(owner) = &entry.owner {
                owners.insert(owner.as_str());
            }
            match entry.year {
                Some(y) => {
                    stats.earliest_year = Some(stats.earliest_year.map_or(y, |e| e.min(y)));
                    stats.latest_year = Some(stats.latest_year.map_or(y, |l| l.max(y)));
                }
                None => stats.unknown_year += 1,
            }
        }
        stats.owners = owners.len();
        stats
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let tmp = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|s| s.to_str()).unwrap_or("store"),
        std::process::id()
    ));
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

// ── Tests ──
