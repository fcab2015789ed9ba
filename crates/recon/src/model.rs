use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::config::JobMode;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One sheet of a spreadsheet, every cell rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text, `""` when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Find a column by candidate names. For each candidate in order:
    /// exact match, then case-insensitive match, then case-insensitive
    /// substring. The first candidate that resolves wins.
    pub fn resolve_column(&self, candidates: &[String]) -> Option<usize> {
        for candidate in candidates {
            let wanted = candidate.trim().to_lowercase();
            if wanted.is_empty() {
                continue;
            }
            if let Some(i) = self.headers.iter().position(|h| h == candidate) {
                return Some(i);
            }
            if let Some(i) = self.headers.iter().position(|h| h.trim().to_lowercase() == wanted) {
                return Some(i);
            }
            if let Some(i) = self.headers.iter().position(|h| h.to_lowercase().contains(&wanted)) {
                return Some(i);
            }
        }
        None
    }

    /// Split rows by predicate into (matching, rest), headers shared.
    pub fn partition<F>(&self, mut keep: F) -> (Table, Table)
    where
        F: FnMut(&[String]) -> bool,
    {
        let (yes, no): (Vec<_>, Vec<_>) = self.rows.iter().cloned().partition(|r| keep(r));
        (
            Table::new(self.headers.clone(), yes),
            Table::new(self.headers.clone(), no),
        )
    }
}

/// Pre-loaded tables keyed by role name.
#[derive(Debug, Default)]
pub struct JobInput {
    pub tables: HashMap<String, Table>,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Closed set of comparison outcomes. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Match,
    AlreadyActive,
    QuantityMismatch,
    NotFound,
    Inactive,
    MissingInTarget,
    MissingInSource,
    Misclassified,
}

impl Outcome {
    /// Outcomes written to the coincidences workbook.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match | Self::AlreadyActive)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::AlreadyActive => write!(f, "already_active"),
            Self::QuantityMismatch => write!(f, "quantity_mismatch"),
            Self::NotFound => write!(f, "not_found"),
            Self::Inactive => write!(f, "inactive"),
            Self::MissingInTarget => write!(f, "missing_in_target"),
            Self::MissingInSource => write!(f, "missing_in_source"),
            Self::Misclassified => write!(f, "misclassified"),
        }
    }
}

/// Name, surname and email shown next to a key in reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersonView {
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub company: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRow {
    pub key: String,
    pub outcome: Outcome,
    /// Operator-facing label, e.g. `CARGA_OMG_SIN_BICE`.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(skip)]
    pub segment_index: usize,
    pub observation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PersonView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PersonView>,
    pub source_count: usize,
    pub target_count: usize,
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// One line of a bulk-import roster: `Nombre,Apellido,Email,RUT`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSheet {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Quoted roster CSV with header.
    Roster(Vec<RosterRow>),
    /// Quoted RUT-only CSV, no header.
    KeyList(Vec<String>),
    /// Excel workbook for human review.
    Report(ReportSheet),
}

impl ArtifactKind {
    pub fn records(&self) -> usize {
        match self {
            Self::Roster(rows) => rows.len(),
            Self::KeyList(keys) => keys.len(),
            Self::Report(sheet) => sheet.rows.len(),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Roster(_) | Self::KeyList(_) => "csv",
            Self::Report(_) => "xlsx",
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Roster(_) => "roster",
            Self::KeyList(_) => "key_list",
            Self::Report(_) => "report",
        }
    }
}

/// An output file described as data. The filename is `stem` plus a run
/// timestamp plus the kind's extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub stem: String,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub fn roster(stem: impl Into<String>, rows: Vec<RosterRow>) -> Self {
        Self { stem: stem.into(), kind: ArtifactKind::Roster(rows) }
    }

    pub fn key_list(stem: impl Into<String>, keys: Vec<String>) -> Self {
        Self { stem: stem.into(), kind: ArtifactKind::KeyList(keys) }
    }

    pub fn report(stem: impl Into<String>, sheet: ReportSheet) -> Self {
        Self { stem: stem.into(), kind: ArtifactKind::Report(sheet) }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub stem: String,
    pub kind: &'static str,
    pub records: usize,
}

impl From<&Artifact> for ArtifactInfo {
    fn from(a: &Artifact) -> Self {
        Self {
            stem: a.stem.clone(),
            kind: a.kind.kind_name(),
            records: a.kind.records(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct JobSummary {
    /// Rows loaded per role, before filters.
    pub rows_read: BTreeMap<String, usize>,
    /// Rows dropped per role because the RUT did not normalize.
    pub invalid_keys: BTreeMap<String, usize>,
    /// Count per operator-facing label.
    pub outcome_counts: BTreeMap<String, usize>,
    pub matched: usize,
    pub quantity_mismatches: usize,
    pub missing_in_target: usize,
    pub missing_in_source: usize,
    pub misclassified: usize,
    pub activations: usize,
    pub deactivations: usize,
    /// Keys rewritten with trailing zeros.
    pub padded_keys: usize,
    /// Emails rewritten with a `-copy` marker.
    pub suffixed_emails: usize,
    /// Rows skipped for lacking a required value (e.g. email in load jobs).
    pub skipped_rows: usize,
}

impl JobSummary {
    pub fn inconsistencies(&self) -> usize {
        self.quantity_mismatches + self.missing_in_target + self.missing_in_source + self.misclassified
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobMeta {
    pub job_name: String,
    pub mode: JobMode,
    pub tag: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub meta: JobMeta,
    pub summary: JobSummary,
    pub outcomes: Vec<OutcomeRow>,
    pub artifacts: Vec<ArtifactInfo>,
    #[serde(skip)]
    pub outputs: Vec<Artifact>,
}
