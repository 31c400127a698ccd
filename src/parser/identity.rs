use super::normalize::fix_text;
use super::placements::Placement;

const POSSESSIVES: &[&str] = &["'s ", "\u{2019}s "];
const TERMINATORS: &[char] = &[',', '(', '.'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DogIdentity {
    pub owner: String,
    pub dog: String,
}

/// Recover owner and dog from `Owner's Dog Name, ...`.
///
/// Returns `None` when there is no possessive or nothing terminates the dog
/// name; such placements cannot be keyed and are dropped by the caller.
pub fn resolve(placement: &Placement) -> Option<DogIdentity> {
    resolve_text(placement.after_ordinal())
}

pub fn resolve_text(text: &str) -> Option<DogIdentity> {
    let (owner_end, dog_start) = find_possessive(text)?;
    let owner = text[..owner_end].trim();
    if owner.is_empty() {
        return None;
    }

    let rest = &text[dog_start..];
    // The dog description needs at least one character before its terminator.
    let first_len = rest.chars().next()?.len_utf8();
    let term = rest[first_len..].find(TERMINATORS)? + first_len;

    let dog = fix_text(&rest[..term]).trim().to_string();
    if dog.is_empty() {
        return None;
    }

    Some(DogIdentity {
        owner: owner.to_string(),
        dog,
    })
}

/// Earliest possessive with a non-empty owner before it.
fn find_possessive(text: &str) -> Option<(usize, usize)> {
    POSSESSIVES
        .iter()
        .filter_map(|p| {
            text.match_indices(p)
                .find(|(idx, _)| *idx > 0)
                .map(|(idx, m)| (idx, idx + m.len()))
        })
        .min_by_key(|(idx, _)| *idx)
}

// ── Tests ──
