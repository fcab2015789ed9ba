use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::names::slug;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub mode: JobMode,
    /// Token used in output filenames. Defaults to a slug of `name`.
    #[serde(default)]
    pub tag: Option<String>,
    /// Directory searched for input files, relative to the job file.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory receiving outputs, relative to the job file.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Prepended to report workbook names.
    #[serde(default)]
    pub prefix: String,
    /// Title-case names written to rosters.
    #[serde(default = "default_true")]
    pub title_case_names: bool,
    pub roles: HashMap<String, RoleConfig>,
    #[serde(default)]
    pub compare: Option<CompareConfig>,
    #[serde(default)]
    pub sync: Option<SyncConfig>,
    #[serde(default)]
    pub status: Option<StatusConfig>,
    #[serde(default)]
    pub load: Option<LoadConfig>,
    #[serde(default)]
    pub extract: Option<ExtractConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobMode {
    /// Source roster vs target roster, optionally split into segments.
    Compare,
    /// Internal base vs vendor roster: activations and deactivations.
    Sync,
    /// Removal/addition sheets checked against an active/inactive base.
    Status,
    /// One bulk-import roster per group (channel).
    Load,
    /// Active rows to a roster, inactive rows to a workbook.
    Extract,
}

impl std::fmt::Display for JobMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compare => write!(f, "compare"),
            Self::Sync => write!(f, "sync"),
            Self::Status => write!(f, "status"),
            Self::Load => write!(f, "load"),
            Self::Extract => write!(f, "extract"),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("resultado")
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RoleConfig {
    pub file: FileMatch,
    /// Exact sheet name.
    #[serde(default)]
    pub sheet: Option<String>,
    /// Case-insensitive substring of the sheet name.
    #[serde(default)]
    pub sheet_contains: Option<String>,
    /// 0-based row holding the headers.
    #[serde(default)]
    pub header_row: usize,
    pub columns: ColumnMapping,
    #[serde(default)]
    pub active: Option<ActiveFilter>,
    /// Rows not matching are dropped before anything else.
    #[serde(default)]
    pub filter: Option<RowFilter>,
    /// Label used in report states and headers. Defaults to the
    /// uppercased role name.
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileMatch {
    /// Exact path relative to the data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Every substring must appear in the filename (case-insensitive).
    #[serde(default)]
    pub contains: Vec<String>,
    /// No substring may appear in the filename (case-insensitive).
    #[serde(default)]
    pub exclude: Vec<String>,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// A column name, or a list of candidate names tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    One(String),
    Many(Vec<String>),
}

impl ColumnRef {
    pub fn candidates(&self) -> &[String] {
        match self {
            Self::One(name) => std::slice::from_ref(name),
            Self::Many(names) => names,
        }
    }

    /// First candidate, for error messages.
    pub fn display_name(&self) -> String {
        self.candidates().join(" | ")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub rut: ColumnRef,
    #[serde(default)]
    pub dv: Option<ColumnRef>,
    #[serde(default)]
    pub name: Option<ColumnRef>,
    /// Single surname column. Takes precedence over the split columns.
    #[serde(default)]
    pub surname: Option<ColumnRef>,
    #[serde(default)]
    pub surname_paternal: Option<ColumnRef>,
    #[serde(default)]
    pub surname_maternal: Option<ColumnRef>,
    #[serde(default)]
    pub email: Option<ColumnRef>,
    /// Grouping column for load jobs (channel).
    #[serde(default)]
    pub group: Option<ColumnRef>,
    /// Contracting company, shown in reports.
    #[serde(default)]
    pub company: Option<ColumnRef>,
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

pub const DEFAULT_ACTIVE_TOKENS: &[&str] = &["VERDADERO", "TRUE", "ACTIVO", "1", "SI", "SÍ", "YES"];

fn default_active_tokens() -> Vec<String> {
    DEFAULT_ACTIVE_TOKENS.iter().map(|s| s.to_string()).collect()
}

/// Status column predicate. A row is active when its cell, trimmed and
/// uppercased, equals one of `tokens`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveFilter {
    pub column: ColumnRef,
    #[serde(default = "default_active_tokens")]
    pub tokens: Vec<String>,
}

/// Generic row predicate: the cell equals any of `equals` or contains
/// any of `contains`, both case-insensitive after trimming.
#[derive(Debug, Clone, Deserialize)]
pub struct RowFilter {
    pub column: ColumnRef,
    #[serde(default)]
    pub equals: Vec<String>,
    #[serde(default)]
    pub contains: Vec<String>,
}

// ---------------------------------------------------------------------------
// Mode sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CompareConfig {
    pub source: String,
    /// Target role when there are no segments.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub segments: Vec<SegmentConfig>,
}

/// A slice of the source roster compared against its own target. Rows go
/// to the first segment whose `select` matches; a segment without
/// `select` takes every remaining row and must come last.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentConfig {
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub select: Option<RowFilter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub source: String,
    pub target: String,
    /// Source rows flagged for deactivation.
    #[serde(default)]
    pub terminations: Option<RowFilter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusConfig {
    pub base: String,
    pub removals: String,
    pub additions: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadConfig {
    pub source: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    pub source: String,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl JobConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: JobConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Output filename token.
    pub fn tag(&self) -> String {
        match &self.tag {
            Some(tag) if !tag.trim().is_empty() => slug(tag),
            _ => slug(&self.name),
        }
    }

    /// Report label for a role.
    pub fn role_label(&self, role: &str) -> String {
        self.roles
            .get(role)
            .and_then(|r| r.label.clone())
            .unwrap_or_else(|| role.to_uppercase())
    }

    /// Roles the configured mode reads, sorted. Declared but unused roles
    /// are not loaded.
    pub fn roles_in_use(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = match self.mode {
            JobMode::Compare => self
                .compare
                .iter()
                .flat_map(|c| {
                    std::iter::once(c.source.as_str())
                        .chain(c.target.as_deref())
                        .chain(c.segments.iter().map(|s| s.target.as_str()))
                })
                .collect(),
            JobMode::Sync => self
                .sync
                .iter()
                .flat_map(|s| [s.source.as_str(), s.target.as_str()])
                .collect(),
            JobMode::Status => self
                .status
                .iter()
                .flat_map(|s| [s.base.as_str(), s.removals.as_str(), s.additions.as_str()])
                .collect(),
            JobMode::Load => self.load.iter().map(|l| l.source.as_str()).collect(),
            JobMode::Extract => self.extract.iter().map(|e| e.source.as_str()).collect(),
        };
        roles.sort_unstable();
        roles.dedup();
        roles
    }

    pub fn role(&self, name: &str) -> Result<&RoleConfig, ReconError> {
        self.roles
            .get(name)
            .ok_or_else(|| ReconError::UnknownRole(name.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        if self.roles.is_empty() {
            return Err(ReconError::ConfigValidation("at least 1 role is required".into()));
        }

        for (role_name, role) in &self.roles {
            if role.file.path.is_none() && role.file.contains.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "role '{role_name}': file needs `path` or a non-empty `contains`"
                )));
            }
            if role.sheet.is_some() && role.sheet_contains.is_some() {
                return Err(ReconError::ConfigValidation(format!(
                    "role '{role_name}': set either `sheet` or `sheet_contains`, not both"
                )));
            }
            if let Some(filter) = &role.filter {
                validate_row_filter(role_name, "filter", filter)?;
            }
            if let Some(active) = &role.active {
                if active.tokens.is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "role '{role_name}': active.tokens must not be empty"
                    )));
                }
            }
        }

        match self.mode {
            JobMode::Compare => self.validate_compare(),
            JobMode::Sync => {
                let sync = self.sync.as_ref().ok_or(ReconError::ModeMismatch { mode: "sync".into() })?;
                self.check_role("sync.source", &sync.source)?;
                self.check_role("sync.target", &sync.target)?;
                if sync.source == sync.target {
                    return Err(ReconError::ConfigValidation(
                        "sync.source and sync.target must differ".into(),
                    ));
                }
                if let Some(t) = &sync.terminations {
                    validate_row_filter(&sync.source, "terminations", t)?;
                }
                Ok(())
            }
            JobMode::Status => {
                let status =
                    self.status.as_ref().ok_or(ReconError::ModeMismatch { mode: "status".into() })?;
                self.check_role("status.base", &status.base)?;
                self.check_role("status.removals", &status.removals)?;
                self.check_role("status.additions", &status.additions)?;
                Ok(())
            }
            JobMode::Load => {
                let load = self.load.as_ref().ok_or(ReconError::ModeMismatch { mode: "load".into() })?;
                let role = self.check_role("load.source", &load.source)?;
                if role.columns.group.is_none() {
                    return Err(ReconError::ConfigValidation(format!(
                        "role '{}': load jobs need columns.group",
                        load.source
                    )));
                }
                Ok(())
            }
            JobMode::Extract => {
                let extract =
                    self.extract.as_ref().ok_or(ReconError::ModeMismatch { mode: "extract".into() })?;
                let role = self.check_role("extract.source", &extract.source)?;
                if role.active.is_none() {
                    return Err(ReconError::ConfigValidation(format!(
                        "role '{}': extract jobs need an `active` filter",
                        extract.source
                    )));
                }
                Ok(())
            }
        }
    }

    fn validate_compare(&self) -> Result<(), ReconError> {
        let compare = self
            .compare
            .as_ref()
            .ok_or(ReconError::ModeMismatch { mode: "compare".into() })?;
        self.check_role("compare.source", &compare.source)?;

        match (&compare.target, compare.segments.is_empty()) {
            (Some(_), false) => {
                return Err(ReconError::ConfigValidation(
                    "compare: set either `target` or `segments`, not both".into(),
                ))
            }
            (None, true) => {
                return Err(ReconError::ConfigValidation(
                    "compare: `target` or at least one segment is required".into(),
                ))
            }
            (Some(target), true) => {
                self.check_role("compare.target", target)?;
            }
            (None, false) => {}
        }

        let mut names = HashSet::new();
        let last = compare.segments.len().saturating_sub(1);
        for (i, segment) in compare.segments.iter().enumerate() {
            if segment.name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "compare.segments[{i}]: name must not be empty"
                )));
            }
            if !names.insert(segment.name.to_lowercase()) {
                return Err(ReconError::ConfigValidation(format!(
                    "compare.segments: duplicate segment '{}'",
                    segment.name
                )));
            }
            self.check_role(&format!("segment '{}'", segment.name), &segment.target)?;
            match &segment.select {
                Some(select) => validate_row_filter(&compare.source, "select", select)?,
                None if i != last => {
                    return Err(ReconError::ConfigValidation(format!(
                        "segment '{}' has no `select` and would shadow later segments; move it last",
                        segment.name
                    )));
                }
                None => {}
            }
        }
        Ok(())
    }

    fn check_role(&self, field: &str, role: &str) -> Result<&RoleConfig, ReconError> {
        self.roles
            .get(role)
            .ok_or_else(|| ReconError::UnknownRole(format!("{field}: role '{role}' not found")))
    }
}

fn validate_row_filter(role: &str, what: &str, filter: &RowFilter) -> Result<(), ReconError> {
    if filter.equals.is_empty() && filter.contains.is_empty() {
        return Err(ReconError::ConfigValidation(format!(
            "role '{role}': {what} needs `equals` or `contains` values"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_COMPARE: &str = r#"
name = "Sonda vs BICE"
mode = "compare"
data_dir = "data/Sonda"

[roles.carga]
file = { contains = ["sonda"], exclude = ["~$"] }
[roles.carga.columns]
rut = "RUT"
name = "Nombres"
surname_paternal = "Primer apellido"
surname_maternal = "Segundo apellido"
email = ["Correo electrónico", "email"]

[roles.bice]
file = { contains = ["users"] }
active = { column = "Estado" }
[roles.bice.columns]
rut = "RUT"
name = "Nombre"
surname = "Apellido"
email = "Email"

[compare]
source = "carga"
target = "bice"
"#;

    #[test]
    fn parse_valid_compare() {
        let config = JobConfig::from_toml(VALID_COMPARE).unwrap();
        assert_eq!(config.name, "Sonda vs BICE");
        assert_eq!(config.mode, JobMode::Compare);
        assert_eq!(config.roles.len(), 2);
        assert_eq!(config.tag(), "sonda_vs_bice");
        assert_eq!(config.output_dir, PathBuf::from("resultado"));
        assert_eq!(config.data_dir, PathBuf::from("data/Sonda"));
        assert!(config.title_case_names);
        assert_eq!(config.role_label("carga"), "CARGA");

        let bice = &config.roles["bice"];
        let active = bice.active.as_ref().unwrap();
        assert_eq!(active.tokens.len(), DEFAULT_ACTIVE_TOKENS.len());
        assert_eq!(
            config.roles["carga"].columns.email.as_ref().unwrap().candidates(),
            &["Correo electrónico".to_string(), "email".to_string()]
        );
    }

    #[test]
    fn roles_in_use_follow_mode() {
        let input = VALID_COMPARE.replace(
            "[compare]",
            "[roles.unused]\nfile = { contains = [\"x\"] }\n[roles.unused.columns]\nrut = \"RUT\"\n\n[compare]",
        );
        let config = JobConfig::from_toml(&input).unwrap();
        assert_eq!(config.roles.len(), 3);
        assert_eq!(config.roles_in_use(), ["bice", "carga"]);
    }

    #[test]
    fn explicit_tag_is_slugged() {
        let input = VALID_COMPARE.replace("mode = \"compare\"", "mode = \"compare\"\ntag = \"Sonda Chile\"");
        let config = JobConfig::from_toml(&input).unwrap();
        assert_eq!(config.tag(), "sonda_chile");
    }

    #[test]
    fn missing_mode_section() {
        let input = VALID_COMPARE.replace("mode = \"compare\"", "mode = \"sync\"");
        let err = JobConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::ModeMismatch { .. }), "{err}");
    }

    #[test]
    fn rejects_unknown_mode() {
        let input = VALID_COMPARE.replace("mode = \"compare\"", "mode = \"compair\"");
        assert!(matches!(JobConfig::from_toml(&input), Err(ReconError::ConfigParse(_))));
    }

    #[test]
    fn rejects_unknown_target_role() {
        let input = VALID_COMPARE.replace("target = \"bice\"", "target = \"mapfre\"");
        let err = JobConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::UnknownRole(_)), "{err}");
    }

    #[test]
    fn rejects_file_without_pattern() {
        let input = VALID_COMPARE.replace(
            "file = { contains = [\"users\"] }",
            "file = { contains = [] }",
        );
        assert!(matches!(
            JobConfig::from_toml(&input),
            Err(ReconError::ConfigValidation(_))
        ));
    }

    #[test]
    fn segments_need_catch_all_last() {
        let base = VALID_COMPARE.replace("target = \"bice\"\n", "");
        let good = format!(
            r#"{base}
[[compare.segments]]
name = "omg"
target = "bice"
select = {{ column = "company", contains = ["OMG"] }}

[[compare.segments]]
name = "pyme"
target = "bice"
"#
        );
        let config = JobConfig::from_toml(&good).unwrap();
        assert_eq!(config.compare.as_ref().unwrap().segments.len(), 2);

        let bad = format!(
            r#"{base}
[[compare.segments]]
name = "pyme"
target = "bice"

[[compare.segments]]
name = "omg"
target = "bice"
select = {{ column = "company", contains = ["OMG"] }}
"#
        );
        assert!(matches!(
            JobConfig::from_toml(&bad),
            Err(ReconError::ConfigValidation(_))
        ));
    }

    #[test]
    fn target_and_segments_conflict() {
        let input = format!(
            r#"{VALID_COMPARE}
[[compare.segments]]
name = "pyme"
target = "bice"
"#
        );
        assert!(matches!(
            JobConfig::from_toml(&input),
            Err(ReconError::ConfigValidation(_))
        ));
    }

    #[test]
    fn load_requires_group_column() {
        let input = r#"
name = "Southbridge"
mode = "load"

[roles.polizas]
file = { contains = ["southbridge"] }
[roles.polizas.columns]
rut = "Rut propietario"
dv = "Propietario DV"

[load]
source = "polizas"
"#;
        assert!(matches!(
            JobConfig::from_toml(input),
            Err(ReconError::ConfigValidation(_))
        ));

        let with_group = input.replace(
            "dv = \"Propietario DV\"",
            "dv = \"Propietario DV\"\ngroup = \"Canal\"",
        );
        let config = JobConfig::from_toml(&with_group).unwrap();
        assert_eq!(config.mode, JobMode::Load);
    }

    #[test]
    fn extract_requires_active_filter() {
        let input = r#"
name = "Tinet"
mode = "extract"

[roles.nomina]
file = { path = "tinet.xlsx" }
[roles.nomina.columns]
rut = "RUT"

[extract]
source = "nomina"
"#;
        assert!(matches!(
            JobConfig::from_toml(input),
            Err(ReconError::ConfigValidation(_))
        ));
    }

    #[test]
    fn sync_terminations_need_values() {
        let input = r#"
name = "Mapfre"
mode = "sync"

[roles.base]
file = { contains = ["base"] }
[roles.base.columns]
rut = "RUT"

[roles.mapfre]
file = { contains = ["mapfre"] }
[roles.mapfre.columns]
rut = "RUT"

[sync]
source = "base"
target = "mapfre"
terminations = { column = "COMENTARIOS" }
"#;
        assert!(matches!(
            JobConfig::from_toml(input),
            Err(ReconError::ConfigValidation(_))
        ));
    }
}
