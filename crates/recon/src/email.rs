//! Email normalization and `-copy` suffixing for repeated addresses.

use std::collections::HashSet;

use tracing::warn;

/// Attempts after which a warning is logged. The search keeps going.
pub const EMAIL_RETRY_BOUND: usize = 100;

/// Trim + lowercase. Empty stays empty.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalize `email` and return it if it is not in `seen`; otherwise
/// insert `-copy`, `--copy`, `---copy`, ... before the last `@` (or
/// append it when there is no `@`) until the candidate is unused.
pub fn resolve_duplicate_emails(email: &str, seen: &HashSet<String>) -> String {
    let email = normalize_email(email);
    if !seen.contains(&email) {
        return email;
    }
    let email = email.as_str();

    let (local, domain) = match email.rsplit_once('@') {
        Some((local, domain)) => (local, Some(domain)),
        None => (email, None),
    };

    let mut dashes = 1usize;
    loop {
        let marker = format!("{}copy", "-".repeat(dashes));
        let candidate = match domain {
            Some(domain) => format!("{local}{marker}@{domain}"),
            None => format!("{local}{marker}"),
        };
        if !seen.contains(&candidate) {
            return candidate;
        }
        if dashes == EMAIL_RETRY_BOUND {
            warn!(email, attempts = dashes, "email still taken after retry bound, continuing");
        }
        dashes += 1;
    }
}

/// Set of claimed addresses for one output file.
#[derive(Debug, Default, Clone)]
pub struct EmailRegistry {
    seen: HashSet<String>,
}

impl EmailRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled with addresses that already exist downstream.
    pub fn seeded<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let seen = emails
            .into_iter()
            .map(|e| normalize_email(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        Self { seen }
    }

    /// Normalize `raw`, resolve it against the registry and record the
    /// result. Empty addresses are returned as-is and never recorded.
    pub fn claim(&mut self, raw: &str) -> String {
        let email = normalize_email(raw);
        if email.is_empty() {
            return email;
        }
        let unique = resolve_duplicate_emails(&email, &self.seen);
        self.seen.insert(unique.clone());
        unique
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
