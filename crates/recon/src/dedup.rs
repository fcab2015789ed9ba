//! Duplicate-key resolution.
//!
//! Upstream rosters list one RUT several times when a person holds several
//! policies. Downstream bulk-import tools reject repeated keys, so repeats
//! are rewritten with trailing zeros: the n-th repeat (0-based occurrence
//! index `n`) gets `n` zeros appended.

use std::collections::{HashMap, HashSet};

/// Stable-order pass assigning each repeated key `occurrence_index`
/// trailing zeros. First occurrences are never modified.
///
/// If a padded candidate collides with a key present elsewhere in the
/// input (or already emitted), zeros keep being appended until it is
/// free, so the output is always pairwise distinct.
pub fn resolve_duplicate_keys(keys: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = keys.iter().cloned().collect();
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    let mut out = Vec::with_capacity(keys.len());

    for key in keys {
        let seen = occurrences.entry(key.as_str()).or_insert(0);
        let index = *seen;
        *seen += 1;

        if index == 0 {
            out.push(key.clone());
            continue;
        }

        let mut candidate = format!("{key}{}", "0".repeat(index));
        while taken.contains(&candidate) {
            candidate.push('0');
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

/// Drop repeats, keeping the first appearance order.
pub fn unique_in_order(keys: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.iter().filter(|k| seen.insert(k.as_str())).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn second_occurrence_gets_one_zero() {
        assert_eq!(resolve_duplicate_keys(&keys(&["1", "1"])), keys(&["1", "10"]));
    }

    #[test]
    fn occurrence_index_sets_zero_count() {
        let out = resolve_duplicate_keys(&keys(&["5", "7", "5", "5", "7"]));
        assert_eq!(out, keys(&["5", "7", "50", "500", "70"]));
    }

    #[test]
    fn collision_with_existing_key_keeps_padding() {
        // "10" already exists in the input, so the repeat of "1" skips it.
        let out = resolve_duplicate_keys(&keys(&["1", "1", "10"]));
        assert_eq!(out, keys(&["1", "100", "10"]));
    }

    #[test]
    fn collision_with_previous_padding() {
        let out = resolve_duplicate_keys(&keys(&["1", "1", "1", "10", "10"]));
        let unique: HashSet<_> = out.iter().collect();
        assert_eq!(unique.len(), out.len());
        assert_eq!(out[0], "1");
        assert_eq!(out[3], "10");
    }

    #[test]
    fn unique_keys_untouched() {
        let input = keys(&["3", "1", "2"]);
        assert_eq!(resolve_duplicate_keys(&input), input);
        assert!(resolve_duplicate_keys(&[]).is_empty());
    }

    #[test]
    fn unique_in_order_keeps_first() {
        assert_eq!(
            unique_in_order(&keys(&["b", "a", "b", "c", "a"])),
            keys(&["b", "a", "c"])
        );
    }
}
