use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Class code at line start: 1–4 capitals, optional ` <digit>`, then
/// whitespace, `(` or end of line. The digit belongs to the code only when
/// counts or the end of the line follow it; see [`parse_header`].
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{1,4}(?: \d)?)((?:[\s(].*)?)$").unwrap());
static COUNTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(\s*(\d+)\s*,\s*(\d+)\s*\)(.*)$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSection {
    pub code: String,
    /// `(entries, absent)` when the header carries them, e.g. `PJ (2,0)`.
    pub counts: Option<(u32, u32)>,
    /// Header remainder and following lines joined into one prose string.
    pub body: String,
}

struct Header<'a> {
    code: &'a str,
    counts: Option<(u32, u32)>,
    rest: &'a str,
}

fn parse_header(line: &str) -> Option<Header<'_>> {
    let caps = HEADER_RE.captures(line)?;
    let mut code = caps.get(1)?.as_str();
    let mut tail = caps.get(2).map_or("", |m| m.as_str());

    // `PD 1 Smith's ...`: the digit is a bare ordinal opening the body.
    if let Some((letters, _)) = code.split_once(' ') {
        let after = tail.trim_start();
        if !after.is_empty() && !after.starts_with('(') {
            code = letters;
            tail = &line[letters.len()..];
        }
    }

    if let Some(c) = COUNTS_RE.captures(tail) {
        let entries: Option<u32> = c[1].parse().ok();
        let absent: Option<u32> = c[2].parse().ok();
        let rest = c.get(3).map_or("", |m| m.as_str());
        return Some(Header {
            code,
            counts: entries.zip(absent),
            rest,
        });
    }

    Some(Header {
        code,
        counts: None,
        rest: tail,
    })
}

/// Split a critique block into one section per class header line.
pub fn segment(block: &str) -> Vec<ClassSection> {
    let mut sections = Vec::new();
    let mut current: Option<(ClassSection, Vec<String>)> = None;
    let mut preamble = 0usize;

    for raw in block.lines() {
        let line = raw.trim();

        if let Some(header) = parse_header(line) {
            if let Some(done) = current.take() {
                sections.push(finish(done));
            }
            let mut parts = Vec::new();
            if !header.rest.trim().is_empty() {
                parts.push(header.rest.trim().to_string());
            }
            current = Some((
                ClassSection {
                    code: header.code.to_string(),
                    counts: header.counts,
                    body: String::new(),
                },
                parts,
            ));
            continue;
        }

        if line.is_empty() {
            continue;
        }
        match current.as_mut() {
            Some((_, parts)) => parts.push(line.to_string()),
            None => preamble += 1,
        }
    }

    if let Some(done) = current.take() {
        sections.push(finish(done));
    }
    if preamble > 0 {
        debug!("Ignored {} preamble line(s) before the first class header", preamble);
    }

    sections
}

fn finish((mut section, parts): (ClassSection, Vec<String>)) -> ClassSection {
    section.body = parts.join(" ");
    section
}

// ── Tests ──
