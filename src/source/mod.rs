//! Where report text comes from. Retrieval itself (browsing, login, upload)
//! happens elsewhere; a source only hands over `(identifier, text)` pairs.

pub mod dir;
pub mod memory;
pub mod sqlite;

pub use dir::DirectorySource;
pub use memory::MemorySource;
pub use sqlite::SqliteSource;

use crate::error::Result;

pub trait DocumentSource {
    /// Label used in logs.
    fn name(&self) -> &str;

    /// Identifiers of every available document, in a stable order.
    fn identifiers(&self) -> Result<Vec<String>>;

    /// Raw text of one document.
    fn load(&self, id: &str) -> Result<String>;
}
