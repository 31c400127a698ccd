use std::collections::BTreeSet;
use std::path::Path;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::document::SourceDocument;
use crate::error::Result;
use crate::parser::block::Markers;
use crate::parser::{process_document, Extraction, Outcome};
use crate::source::DocumentSource;
use crate::store::CritiqueStore;

const CHUNK_SIZE: usize = 64;

/// Counters for one batch. Skips and drops are outcomes, not failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub available: usize,
    pub already_processed: usize,
    pub unreadable: usize,
    pub not_extractable: usize,
    pub extracted: usize,
    pub classes: usize,
    /// Sums of the `(entries, absent)` counts of class headers that had them.
    pub declared_entries: u64,
    pub declared_absent: u64,
    pub entries: usize,
    pub dropped_placements: usize,
    pub dogs_before: usize,
    pub dogs_after: usize,
    pub critiques_before: usize,
    pub critiques_after: usize,
}

impl IngestReport {
    pub fn print(&self) {
        println!(
            "{} documents: {} already processed, {} extracted, {} without critique block, {} unreadable.",
            self.available, self.already_processed, self.extracted, self.not_extractable, self.unreadable,
        );
        println!(
            "{} classes, {} placements kept, {} dropped.",
            self.classes, self.entries, self.dropped_placements,
        );
        if self.declared_entries > 0 {
            println!(
                "Headers declare {} entries, {} absent.",
                self.declared_entries, self.declared_absent,
            );
        }
        println!(
            "Store: {} -> {} dogs, {} -> {} critiques.",
            self.dogs_before, self.dogs_after, self.critiques_before, self.critiques_after,
        );
    }

    fn tally(&mut self, extraction: &Extraction) {
        match &extraction.outcome {
            Outcome::NotExtractable(reason) => {
                info!("Skipping {}: no critique block ({})", extraction.source, reason.as_str());
                self.not_extractable += 1;
            }
            Outcome::Extracted {
                classes,
                entries,
                dropped,
            } => {
                if classes.is_empty() {
                    info!("{}: critique block has no class headers", extraction.source);
                }
                self.extracted += 1;
                self.classes += classes.len();
                for (entries, absent) in classes.iter().filter_map(|c| c.counts) {
                    self.declared_entries += u64::from(entries);
                    self.declared_absent += u64::from(absent);
                }
                self.entries += entries.len();
                self.dropped_placements += dropped;
            }
        }
    }
}

/// Runs the parsing pipeline over a source and folds the results into a store.
#[derive(Debug, Clone)]
pub struct Ingestor {
    markers: Markers,
    chunk_size: usize,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(Markers::default())
    }
}

impl Ingestor {
    pub fn new(markers: Markers) -> Self {
        Ingestor {
            markers,
            chunk_size: CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn run(
        &self,
        store: CritiqueStore,
        source: &dyn DocumentSource,
    ) -> Result<(CritiqueStore, IngestReport)> {
        self.run_with_progress(store, source, |_, _| {})
    }

    /// Process every document of `source` not yet in `store`.
    ///
    /// Extraction runs in parallel per chunk; merging happens here, in source
    /// order, and the store is deduplicated and re-sorted once at the end.
    /// `progress(done, total)` is called after each chunk.
    pub fn run_with_progress<F>(
        &self,
        mut store: CritiqueStore,
        source: &dyn DocumentSource,
        mut progress: F,
    ) -> Result<(CritiqueStore, IngestReport)>
    where
        F: FnMut(usize, usize),
    {
        let mut report = IngestReport {
            dogs_before: store.dog_count(),
            critiques_before: store.entry_count(),
            ..Default::default()
        };

        let ids = source.identifiers()?;
        report.available = ids.len();

        let mut done: BTreeSet<String> = store.processed_sources();
        let mut pending = Vec::new();
        for id in ids {
            if done.contains(&id) {
                info!("Skipping {}: already processed", id);
                report.already_processed += 1;
                continue;
            }
            done.insert(id.clone());
            pending.push(id);
        }
        info!(
            "{}: {} documents, {} new",
            source.name(),
            report.available,
            pending.len()
        );

        let total = pending.len();
        let mut processed = 0usize;
        for chunk in pending.chunks(self.chunk_size) {
            let mut docs = Vec::with_capacity(chunk.len());
            for id in chunk {
                match source.load(id) {
                    Ok(text) => docs.push(SourceDocument::new(id.clone(), text)),
                    Err(e) => {
                        warn!("Could not read {}: {}", id, e);
                        report.unreadable += 1;
                    }
                }
            }

            let extractions: Vec<Extraction> = docs
                .par_iter()
                .map(|doc| process_document(doc, &self.markers))
                .collect();

            for extraction in extractions {
                report.tally(&extraction);
                store.absorb(extraction);
            }

            processed += chunk.len();
            progress(processed, total);
        }

        store.finalize();
        report.dogs_after = store.dog_count();
        report.critiques_after = store.entry_count();
        Ok((store, report))
    }
}

/// Load the store at `store_path`, ingest `source`, and rewrite the store.
/// Nothing is written unless the whole batch succeeds.
pub fn ingest_to_path(
    ingestor: &Ingestor,
    store_path: &Path,
    source: &dyn DocumentSource,
) -> Result<IngestReport> {
    let store = CritiqueStore::load(store_path)?;
    let (store, report) = ingestor.run(store, source)?;
    store.save(store_path)?;
    Ok(report)
}

// ── Tests ──
