//! Encoding repair applied to report text before any pattern matching.

use unicode_normalization::UnicodeNormalization;

/// Windows-1252 code points for bytes 0x80..=0x9F. Bytes that are undefined
/// in 1252 decode to the matching C1 control, the way sloppy decoders do.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

const MAX_PASSES: usize = 4;
const MAX_LAYERS: usize = 8;

/// Lead bytes (as `Â`..`Å`) of two-byte sequences worth re-decoding on their
/// own. Other two-byte leads are ordinary capitals far more often.
const TWO_BYTE_LEADS: std::ops::RangeInclusive<u8> = 0xC2..=0xC5;

/// Repair mojibake and tidy typography. Never fails; applying it to its own
/// output returns the same string.
pub fn fix_text(text: &str) -> String {
    let mut current = fix_once(text);
    for _ in 1..MAX_PASSES {
        let next = fix_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Peel every encoding layer first; quotes and controls inside a layer are
/// still mojibake bytes and must not be touched until then.
fn fix_once(text: &str) -> String {
    let repaired = peel_layers(text);
    let unified = fix_line_breaks(&repaired);
    let cleaned = remove_control_chars(&unified);
    let uncurled = uncurl_quotes(&cleaned);
    let expanded = expand_ligatures(&uncurled);
    expanded.nfc().collect()
}

fn peel_layers(text: &str) -> String {
    let mut current = repair_mojibake(text);
    for _ in 1..MAX_LAYERS {
        let next = repair_mojibake(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Byte a character would have been if the text was decoded as 1252/Latin-1.
fn sloppy_byte(c: char) -> Option<u8> {
    let cp = c as u32;
    if cp <= 0xFF {
        return Some(cp as u8);
    }
    CP1252_HIGH
        .iter()
        .position(|&h| h == c)
        .map(|idx| 0x80 + idx as u8)
}

fn utf8_len(lead: u8) -> Option<usize> {
    match lead {
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

/// Re-decode runs like `Ã©` or `â€™` that are UTF-8 bytes shown through a
/// single-byte codepage. Runs that don't form valid UTF-8 are left alone.
fn repair_mojibake(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if let Some(decoded) = try_decode_at(&chars, i) {
            out.push(decoded.0);
            i += decoded.1;
            continue;
        }
        out.push(c);
        i += 1;
    }

    out
}

fn try_decode_at(chars: &[char], start: usize) -> Option<(char, usize)> {
    let lead_char = chars[start];
    if lead_char.is_ascii() {
        return None;
    }
    let lead = sloppy_byte(lead_char)?;
    let len = utf8_len(lead)?;
    if start + len > chars.len() {
        return None;
    }

    let mut bytes = [0u8; 4];
    bytes[0] = lead;
    for k in 1..len {
        let b = sloppy_byte(chars[start + k])?;
        if !(0x80..=0xBF).contains(&b) {
            return None;
        }
        bytes[k] = b;
    }

    let decoded = std::str::from_utf8(&bytes[..len]).ok()?.chars().next()?;
    if len == 2 && !plausible_two_byte(lead, chars[start + 1], decoded) {
        return None;
    }
    Some((decoded, len))
}

/// `Ã©` and `Â£` are mojibake; `ß’` and `É’` are a name and an apostrophe.
/// Runs decoding to a character of the Windows-1252 0x80-0x9F range belong
/// to a deeper encoding layer. `Ä`/`Å` runs must decode to a letter and must not end in
/// typographic punctuation.
fn plausible_two_byte(lead: u8, second: char, decoded: char) -> bool {
    if !TWO_BYTE_LEADS.contains(&lead) && !CP1252_HIGH.contains(&decoded) {
        return false;
    }
    if lead <= 0xC3 || CP1252_HIGH.contains(&decoded) {
        return true;
    }
    let punctuation = matches!(
        second,
        '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' | '\u{2013}' | '\u{2014}' | '\u{2026}' | '\u{A0}'
    );
    decoded.is_alphabetic() && !punctuation
}

fn fix_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace(['\r', '\u{2028}', '\u{2029}', '\u{0085}'], "\n")
}

fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            let cp = c as u32;
            let c0 = cp < 0x20 && c != '\n' && c != '\t';
            let c1 = (0x7F..=0x9F).contains(&cp);
            !(c0 || c1 || c == '\u{FEFF}')
        })
        .collect()
}

fn uncurl_quotes(text: &str) -> String {
    text.replace(['\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}'], "'")
        .replace(['\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}'], "\"")
}

fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ascii_untouched() {
        let s = "1st Smith's Goldie, a lovely bitch.";
        assert_eq!(fix_text(s), s);
    }

    #[test]
    fn latin1_double_encoding() {
        assert_eq!(fix_text("CafÃ© au lait"), "Café au lait");
        assert_eq!(fix_text("Â£50 prize"), "£50 prize");
    }

    #[test]
    fn curly_apostrophe_mojibake() {
        // U+2019 encoded as UTF-8 then read as cp1252
        assert_eq!(fix_text("Smithâ€™s Goldie"), "Smith's Goldie");
    }

    #[test]
    fn quotes_uncurled() {
        assert_eq!(fix_text("Jones\u{2019}s \u{201C}Star\u{201D}"), "Jones's \"Star\"");
    }

    #[test]
    fn genuine_accents_survive() {
        let s = "Bichon Frisé and Mañana";
        assert_eq!(fix_text(s), s);
    }

    #[test]
    fn line_breaks_and_controls() {
        assert_eq!(fix_text("a\r\nb\rc\u{0007}d"), "a\nb\ncd");
        assert_eq!(fix_text("\u{FEFF}PJ"), "PJ");
    }

    #[test]
    fn ligatures_expanded() {
        assert_eq!(fix_text("\u{FB01}ne \u{FB02}owing"), "fine flowing");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "Smithâ€™s Goldie, a lovely bitch.",
            "CafÃƒÂ© twice broken",
            "Ã\u{0007}© split by control",
            "mixed â€œquotesâ€\u{9D} and Ã¼ber",
            "",
        ];
        for input in inputs {
            let once = fix_text(input);
            assert_eq!(fix_text(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn doubly_encoded_repaired_fully() {
        assert_eq!(fix_text("CafÃƒÂ©"), "Café");
    }

    /// Encode as UTF-8 and read the bytes back as Windows-1252, `layers` times.
    fn garble(text: &str, layers: usize) -> String {
        let mut out = text.to_string();
        for _ in 0..layers {
            out = out
                .bytes()
                .map(|b| match b {
                    0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
                    _ => b as char,
                })
                .collect();
        }
        out
    }

    #[test]
    fn triple_encoded_apostrophe_survives() {
        let garbled = garble("Smith\u{2019}s Caf\u{e9}", 3);
        assert_ne!(garbled, "Smith\u{2019}s Caf\u{e9}");
        assert_eq!(fix_text(&garbled), "Smith's Caf\u{e9}");
        assert_eq!(fix_text(&garble("\u{201C}Star\u{201D}", 3)), "\"Star\"");
    }

    #[test]
    fn names_before_curly_apostrophe_kept() {
        assert_eq!(fix_text("Strau\u{df}\u{2019}s Goldie, lovely."), "Strau\u{df}'s Goldie, lovely.");
        assert_eq!(fix_text("JOS\u{c9}\u{2019}s Star, ok."), "JOS\u{c9}'s Star, ok.");
        assert_eq!(fix_text("BJ\u{d6}RK\u{d6}\u{2019}s Max."), "BJ\u{d6}RK\u{d6}'s Max.");
        assert_eq!(fix_text("Stra\u{c3}\u{178}e"), "Stra\u{df}e");
        assert_eq!(fix_text("\u{c5}\u{a1}ime"), "\u{161}ime");
    }

    #[test]
    fn composed_and_decomposed_accents_agree() {
        assert_eq!(fix_text("Caf\u{e9} Noir"), fix_text("Cafe\u{301} Noir"));
        assert_eq!(fix_text("Cafe\u{301} Noir"), "Caf\u{e9} Noir");
    }
}
