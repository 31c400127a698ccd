use std::path::Path;
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

static SHOW_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Championship Show\s*-\s*([^\n]*)").unwrap());
static HEADING_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());
static ID_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

const EARLIEST_YEAR: i32 = 1900;

/// One raw report as handed over by a document source.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub source: String,
    pub text: String,
    pub year: Option<i32>,
    pub show: String,
}

impl SourceDocument {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        let source = source.into();
        let text = text.into();
        let year = year_from_body(&text).or_else(|| year_from_identifier(&source));
        let show = show_from_identifier(&source);
        SourceDocument {
            source,
            text,
            year,
            show,
        }
    }
}

fn plausible(year: i32) -> bool {
    let latest = chrono::Utc::now().year() + 1;
    (EARLIEST_YEAR..=latest).contains(&year)
}

/// Year printed in the `Championship Show - <name> <year>` heading.
pub fn year_from_body(text: &str) -> Option<i32> {
    let heading = SHOW_HEADING_RE.captures(text)?.get(1)?.as_str();
    HEADING_YEAR_RE
        .captures_iter(heading)
        .filter_map(|c| c[1].parse().ok())
        .find(|y| plausible(*y))
}

/// First plausible four-digit group in the identifier, e.g. `Crufts_2023.txt`.
pub fn year_from_identifier(source: &str) -> Option<i32> {
    ID_YEAR_RE
        .find_iter(source)
        .filter_map(|m| m.as_str().parse().ok())
        .find(|y| plausible(*y))
}

/// Show name: the identifier's file stem up to the first underscore.
pub fn show_from_identifier(source: &str) -> String {
    let stem = Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source);
    stem.split('_').next().unwrap_or(stem).to_string()
}
