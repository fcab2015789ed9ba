//! RUT (national identity number) normalization.
//!
//! A normalized key carries no punctuation or whitespace, is uppercase
//! (the check digit may be `K`), and has no leading zeros. Two rows refer
//! to the same person iff their normalized keys are byte-equal.

/// Canonicalize a raw RUT cell into an identity key.
///
/// Trims, uppercases, removes `.`, `-` and all whitespace, then strips
/// leading zeros. Returns `None` when nothing is left.
pub fn normalize_identity_key(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != '-' && !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();

    let trimmed = cleaned.trim_start_matches('0');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Join a RUT number column and a check-digit column into one token.
///
/// Spreadsheet exports often render integers as floats (`20640480.0`);
/// an all-zero fraction is dropped before the remaining dots and dashes
/// are removed. A check digit of `0` is valid. An empty RUT yields `""`.
pub fn combine_rut_dv(rut: &str, dv: &str) -> String {
    let rut = strip_zero_fraction(rut.trim());
    let rut: String = rut.chars().filter(|c| *c != '.' && *c != '-').collect();
    if rut.is_empty() {
        return String::new();
    }

    let dv = strip_zero_fraction(dv.trim());
    let dv: String = dv.chars().filter(|c| *c != '.').collect::<String>().to_uppercase();

    format!("{rut}{dv}")
}

/// Key for a row that may carry a separate check-digit column.
pub fn row_key(rut: &str, dv: Option<&str>) -> Option<String> {
    match dv {
        Some(dv) => normalize_identity_key(&combine_rut_dv(rut, dv)),
        None => normalize_identity_key(rut),
    }
}

/// `"123.000"` -> `"123"`; anything else is returned untouched.
fn strip_zero_fraction(s: &str) -> &str {
    match s.split_once('.') {
        Some((int, frac))
            if !int.is_empty()
                && int.chars().all(|c| c.is_ascii_digit())
                && !frac.is_empty()
                && frac.chars().all(|c| c == '0') =>
        {
            int
        }
        _ => s,
    }
}
