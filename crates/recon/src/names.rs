//! Person-name cleanup and filename slugs.

use std::sync::OnceLock;

use regex::Regex;

fn slug_strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9\s]").expect("static regex"))
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Capitalize the first letter of each alphabetic run, lowercase the
/// rest, and collapse whitespace. `"maría  o'brien"` -> `"María O'Brien"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in collapse_whitespace(text).chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// `"Pérez"` + `"Soto"` -> `"Pérez Soto"`; either side may be blank.
pub fn combine_surnames(paternal: &str, maternal: &str) -> String {
    [paternal.trim(), maternal.trim()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Filesystem-safe token: lowercase, accents folded, punctuation
/// dropped, spaces as `_`. Blank input becomes `sin_canal`.
pub fn slug(text: &str) -> String {
    let folded: String = text.trim().to_lowercase().chars().map(fold_accent).collect();
    let stripped = slug_strip_re().replace_all(&folded, "");
    let joined = stripped.split_whitespace().collect::<Vec<_>>().join("_");
    if joined.is_empty() {
        "sin_canal".to_string()
    } else {
        joined
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        other => other,
    }
}
