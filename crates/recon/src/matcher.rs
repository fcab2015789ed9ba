use std::collections::BTreeSet;

use serde::Serialize;

/// Result of comparing two key spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyDiff {
    pub matched: BTreeSet<String>,
    pub only_a: BTreeSet<String>,
    pub only_b: BTreeSet<String>,
}

/// Plain set algebra: intersection and both one-sided differences.
pub fn diff_key_sets(a: &BTreeSet<String>, b: &BTreeSet<String>) -> KeyDiff {
    KeyDiff {
        matched: a.intersection(b).cloned().collect(),
        only_a: a.difference(b).cloned().collect(),
        only_b: b.difference(a).cloned().collect(),
    }
}

/// Collect keys into an ordered set.
pub fn key_set<I, S>(keys: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_diff() {
        let d = diff_key_sets(&key_set(["A", "B"]), &key_set(["B", "C"]));
        assert_eq!(d.matched, key_set(["B"]));
        assert_eq!(d.only_a, key_set(["A"]));
        assert_eq!(d.only_b, key_set(["C"]));
    }

    #[test]
    fn empty_sides() {
        let d = diff_key_sets(&key_set(Vec::<String>::new()), &key_set(["X"]));
        assert!(d.matched.is_empty());
        assert!(d.only_a.is_empty());
        assert_eq!(d.only_b, key_set(["X"]));
    }

    #[test]
    fn identical_sets() {
        let keys = key_set(["1", "2", "3"]);
        let d = diff_key_sets(&keys, &keys);
        assert_eq!(d.matched, keys);
        assert!(d.only_a.is_empty() && d.only_b.is_empty());
    }
}
