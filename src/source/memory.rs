use crate::error::{CritiqueError, Result};

use super::DocumentSource;

/// Documents held in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    docs: Vec<(String, String)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.push(id, text);
        self
    }

    pub fn push(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.docs.push((id.into(), text.into()));
    }
}

impl DocumentSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn identifiers(&self) -> Result<Vec<String>> {
        Ok(self.docs.iter().map(|(id, _)| id.clone()).collect())
    }

    fn load(&self, id: &str) -> Result<String> {
        self.docs
            .iter()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(_, text)| text.clone())
            .ok_or_else(|| CritiqueError::Source {
                name: self.name().to_string(),
                reason: format!("no document '{}'", id),
            })
    }
}
