/// Literal strings bounding the judge critiques inside a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub start: String,
    pub end: String,
}

pub const DEFAULT_START_MARKER: &str = "RETRIEVER GOLDEN";
pub const DEFAULT_END_MARKER: &str = "Please note that all reports and articles";

impl Default for Markers {
    fn default() -> Self {
        Markers {
            start: DEFAULT_START_MARKER.to_string(),
            end: DEFAULT_END_MARKER.to_string(),
        }
    }
}

/// Why a document has no critique block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoBlock {
    MissingStart,
    MissingEnd,
    EndBeforeStart,
}

impl NoBlock {
    pub fn as_str(self) -> &'static str {
        match self {
            NoBlock::MissingStart => "start marker missing",
            NoBlock::MissingEnd => "end marker missing",
            NoBlock::EndBeforeStart => "end marker before start marker",
        }
    }
}

/// Return the trimmed text strictly between the first start marker and the
/// first end marker that follows it.
pub fn locate<'a>(text: &'a str, markers: &Markers) -> Result<&'a str, NoBlock> {
    let start = text.find(&markers.start).ok_or(NoBlock::MissingStart)?;
    let body_start = start + markers.start.len();

    match text[body_start..].find(&markers.end) {
        Some(rel_end) => Ok(text[body_start..body_start + rel_end].trim()),
        None if text[..start].contains(&markers.end) => Err(NoBlock::EndBeforeStart),
        None => Err(NoBlock::MissingEnd),
    }
}
