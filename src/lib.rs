//! Judge critiques from dog-show reports, aggregated per dog.
//!
//! Report text → [`parser`] (normalize, locate, segment, split, resolve) →
//! [`store::CritiqueStore`]. [`ingest::Ingestor`] drives a batch from any
//! [`source::DocumentSource`].

pub mod config;
pub mod document;
pub mod error;
pub mod ingest;
pub mod parser;
pub mod source;
pub mod store;

pub use document::SourceDocument;
pub use error::{CritiqueError, Result};
pub use ingest::{IngestReport, Ingestor};
pub use parser::block::Markers;
pub use store::{CritiqueEntry, CritiqueStore};
