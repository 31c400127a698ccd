pub mod block;
pub mod classes;
pub mod identity;
pub mod normalize;
pub mod placements;

use tracing::debug;

use crate::document::SourceDocument;
use crate::store::CritiqueEntry;
use block::{Markers, NoBlock};

/// Everything one document contributed, before it is merged.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub source: String,
    pub outcome: Outcome,
}

/// One class as seen in a document: declared `(entries, absent)` from the
/// header and how many placements resolved to a dog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTally {
    pub code: String,
    pub counts: Option<(u32, u32)>,
    pub placed: usize,
}

impl ClassTally {
    /// Dogs actually shown according to the header, if it had counts.
    pub fn present(&self) -> Option<u32> {
        self.counts.map(|(entries, absent)| entries.saturating_sub(absent))
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    /// Markers missing or out of order: the document is skipped.
    NotExtractable(NoBlock),
    Extracted {
        classes: Vec<ClassTally>,
        /// `(dog, entry)` in source order.
        entries: Vec<(String, CritiqueEntry)>,
        dropped: usize,
    },
}

impl Extraction {
    pub fn entry_count(&self) -> usize {
        match &self.outcome {
            Outcome::Extracted { entries, .. } => entries.len(),
            Outcome::NotExtractable(_) => 0,
        }
    }
}

/// Normalize → locate → segment → split placements → resolve dogs.
///
/// Pure function of the document, safe to run on many documents in parallel.
pub fn process_document(doc: &SourceDocument, markers: &Markers) -> Extraction {
    let text = normalize::fix_text(&doc.text);
    let block = match block::locate(&text, markers) {
        Ok(block) => block,
        Err(reason) => {
            return Extraction {
                source: doc.source.clone(),
                outcome: Outcome::NotExtractable(reason),
            }
        }
    };

    let sections = classes::segment(block);
    let mut tallies = Vec::with_capacity(sections.len());
    let mut entries = Vec::new();
    let mut dropped = 0usize;

    for section in &sections {
        let before = entries.len();
        for placement in placements::split_placements(&section.body) {
            let Some(id) = identity::resolve(&placement) else {
                debug!(
                    source = %doc.source,
                    class = %section.code,
                    "Dropped placement without owner/dog: {:?}",
                    placement.text
                );
                dropped += 1;
                continue;
            };
            entries.push((
                id.dog,
                CritiqueEntry {
                    class: section.code.clone(),
                    critique: placement.text.trim().to_string(),
                    source: doc.source.clone(),
                    show: doc.show.clone(),
                    year: doc.year,
                    place: placement.place(),
                    owner: Some(id.owner),
                },
            ));
        }

        let tally = ClassTally {
            code: section.code.clone(),
            counts: section.counts,
            placed: entries.len() - before,
        };
        if let Some(present) = tally.present() {
            if tally.placed > present as usize {
                debug!(
                    source = %doc.source,
                    class = %tally.code,
                    "{} placements resolved but header declares {} dogs shown",
                    tally.placed,
                    present
                );
            }
        }
        tallies.push(tally);
    }

    Extraction {
        source: doc.source.clone(),
        outcome: Outcome::Extracted {
            classes: tallies,
            entries,
            dropped,
        },
    }
}

// ── Tests ──
