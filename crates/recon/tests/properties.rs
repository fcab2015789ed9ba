// Property-based tests for key normalization and duplicate resolution.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::{BTreeSet, HashMap, HashSet};

use proptest::prelude::*;
use padron_recon::{
    diff_key_sets, normalize_email, normalize_identity_key, resolve_duplicate_emails,
    resolve_duplicate_keys, EmailRegistry,
};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// RUT-ish cell: digits with optional dots, dash, check digit and noise.
fn arb_rut_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"0{0,2}[1-9][0-9]{6,7}-[0-9kK]",
        2 => r"[1-9]{1,2}\.[0-9]{3}\.[0-9]{3}-[0-9kK]",
        1 => r" ?[0-9kK .\-]{0,12} ?",
    ]
}

/// Small key alphabet so duplicates and zero-padding collisions happen.
fn arb_keys() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(
        proptest::sample::select(vec!["1", "10", "100", "2", "20", "19", "190"]),
        0..24,
    )
        .prop_map(|v| v.into_iter().map(str::to_string).collect())
}

fn arb_email() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => r"[a-c]{1,2}@x\.cl",
        1 => r"[a-c]{1,2}-copy@x\.cl",
        1 => r"[a-c]{1,2}",
    ]
}

/// An address as typed in a spreadsheet: maybe uppercased, maybe padded.
fn arb_raw_email() -> impl Strategy<Value = String> {
    (arb_email(), any::<bool>(), any::<bool>()).prop_map(|(email, upper, pad)| {
        let email = if upper { email.to_uppercase() } else { email };
        if pad { format!("  {email} ") } else { email }
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn normalize_is_idempotent(cell in arb_rut_cell()) {
        if let Some(key) = normalize_identity_key(&cell) {
            prop_assert_eq!(normalize_identity_key(&key), Some(key.clone()));
            prop_assert!(!key.starts_with('0'));
            prop_assert!(!key.contains(['.', '-', ' ']));
        }
    }

    #[test]
    fn punctuation_does_not_change_key(digits in r"[1-9][0-9]{6,7}", dv in r"[0-9K]") {
        let plain = format!("{digits}{dv}");
        let mut dotted = String::new();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                dotted.push('.');
            }
            dotted.push(c);
        }
        let formatted = format!("{dotted}-{}", dv.to_lowercase());
        prop_assert_eq!(normalize_identity_key(&formatted), normalize_identity_key(&plain));
    }

    #[test]
    fn padded_keys_are_distinct(keys in arb_keys()) {
        let out = resolve_duplicate_keys(&keys);
        prop_assert_eq!(out.len(), keys.len());

        let unique: HashSet<&String> = out.iter().collect();
        prop_assert_eq!(unique.len(), out.len());

        let mut first_seen: HashMap<&String, usize> = HashMap::new();
        for (i, key) in keys.iter().enumerate() {
            first_seen.entry(key).or_insert(i);
        }
        for (key, i) in first_seen {
            prop_assert_eq!(&out[i], key);
        }
        for (raw, padded) in keys.iter().zip(&out) {
            prop_assert!(padded.starts_with(raw.as_str()));
            prop_assert!(padded[raw.len()..].chars().all(|c| c == '0'));
        }
    }

    #[test]
    fn resolved_email_is_unused(email in arb_raw_email(), seen in proptest::collection::hash_set(arb_email(), 0..12)) {
        let out = resolve_duplicate_emails(&email, &seen);
        let normalized = normalize_email(&email);
        prop_assert!(!seen.contains(&out));
        if !seen.contains(&normalized) {
            prop_assert_eq!(out, normalized);
        }
    }

    #[test]
    fn registry_never_repeats(emails in proptest::collection::vec(arb_raw_email(), 0..20)) {
        let mut registry = EmailRegistry::new();
        let claimed: Vec<String> = emails.iter().map(|e| registry.claim(e)).collect();
        let unique: HashSet<&String> = claimed.iter().collect();
        prop_assert_eq!(unique.len(), claimed.len());
        prop_assert_eq!(registry.len(), claimed.len());
    }

    #[test]
    fn diff_partitions_union(
        a in proptest::collection::btree_set(r"[1-9]{1,2}", 0..15),
        b in proptest::collection::btree_set(r"[1-9]{1,2}", 0..15),
    ) {
        let diff = diff_key_sets(&a, &b);
        let union: BTreeSet<String> = a.union(&b).cloned().collect();
        let rebuilt: BTreeSet<String> = diff
            .matched
            .iter()
            .chain(&diff.only_a)
            .chain(&diff.only_b)
            .cloned()
            .collect();
        prop_assert_eq!(rebuilt, union);
        prop_assert!(diff.matched.is_disjoint(&diff.only_a));
        prop_assert!(diff.matched.is_disjoint(&diff.only_b));
        prop_assert!(diff.only_a.is_disjoint(&b));
        prop_assert!(diff.only_b.is_disjoint(&a));
    }
}

#[test]
fn worked_examples() {
    assert_eq!(normalize_identity_key("12.345.678-9"), normalize_identity_key("123456789"));

    let a: BTreeSet<String> = ["A", "B"].map(String::from).into();
    let b: BTreeSet<String> = ["B", "C"].map(String::from).into();
    let diff = diff_key_sets(&a, &b);
    assert_eq!(diff.matched, BTreeSet::from(["B".to_string()]));
    assert_eq!(diff.only_a, BTreeSet::from(["A".to_string()]));
    assert_eq!(diff.only_b, BTreeSet::from(["C".to_string()]));

    let keys: Vec<String> = ["1-9", "1-9"].iter().filter_map(|k| normalize_identity_key(k)).collect();
    assert_eq!(resolve_duplicate_keys(&keys), ["19", "190"]);
}
