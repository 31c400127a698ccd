const SUFFIXES: &[&str] = &["st", "nd", "rd", "th"];

/// One candidate placement: its ordinal token, if any, and the full text
/// from that token up to the next accepted marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub ordinal: Option<String>,
    pub text: String,
}

impl Placement {
    /// Finishing position, when the placement starts with an ordinal.
    pub fn place(&self) -> Option<u8> {
        let ordinal = self.ordinal.as_deref()?;
        ordinal.chars().next()?.to_digit(10).map(|d| d as u8)
    }

    /// Placement text with the leading ordinal token removed.
    pub fn after_ordinal(&self) -> &str {
        match &self.ordinal {
            Some(o) => self.text[o.len()..].trim_start(),
            None => &self.text,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Marker {
    start: usize,
    end: usize,
}

fn is_terminator(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => c.is_whitespace() || c == '&' || c == ',',
    }
}

/// An ordinal is accepted at the start of the prose, or after the period
/// closing the previous placement. A period glued between two digits is a
/// decimal point, not a sentence end.
fn accepted_position(prose: &str, at: usize) -> bool {
    let before = &prose[..at];
    let trimmed = before.trim_end();
    if trimmed.is_empty() {
        return true;
    }
    if !trimmed.ends_with('.') {
        return false;
    }
    let glued = trimmed.len() == before.len();
    let digit_before_dot = trimmed[..trimmed.len() - 1]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit());
    !(glued && digit_before_dot)
}

fn marker_at(prose: &str, at: usize) -> Option<Marker> {
    let bytes = prose.as_bytes();
    if !bytes[at].is_ascii_digit() || !accepted_position(prose, at) {
        return None;
    }

    let mut end = at + 1;
    let rest = &prose[end..];
    if let Some(suffix) = SUFFIXES.iter().find(|s| rest.starts_with(**s)) {
        end += suffix.len();
    }

    if is_terminator(prose[end..].chars().next()) {
        Some(Marker { start: at, end })
    } else {
        None
    }
}

fn scan_markers(prose: &str) -> Vec<Marker> {
    let mut markers = Vec::new();
    let mut i = 0;
    while i < prose.len() {
        if let Some(m) = marker_at(prose, i) {
            markers.push(m);
            i = m.end;
            continue;
        }
        i += 1;
    }
    markers
}

/// Split a class body into placements, left to right.
pub fn split_placements(prose: &str) -> Vec<Placement> {
    let markers = scan_markers(prose);
    let mut placements = Vec::with_capacity(markers.len() + 1);

    let lead_end = markers.first().map_or(prose.len(), |m| m.start);
    let lead = prose[..lead_end].trim();
    if !lead.is_empty() {
        placements.push(Placement {
            ordinal: None,
            text: lead.to_string(),
        });
    }

    for (idx, m) in markers.iter().enumerate() {
        let stop = markers.get(idx + 1).map_or(prose.len(), |next| next.start);
        placements.push(Placement {
            ordinal: Some(prose[m.start..m.end].to_string()),
            text: prose[m.start..stop].trim().to_string(),
        });
    }

    placements
}

// ── Tests ──
