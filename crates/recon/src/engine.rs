use tracing::{info, warn};

use crate::config::{JobConfig, JobMode};
use crate::error::ReconError;
use crate::filter::{apply_row_filter, split_active};
use crate::model::{Artifact, ArtifactInfo, JobInput, JobMeta, JobResult, JobSummary, OutcomeRow, Table};
use crate::people::{extract_people, Person};
use crate::summary::tally_outcomes;

/// Accumulated output of one mode run.
#[derive(Debug, Default)]
pub struct RunState {
    pub summary: JobSummary,
    pub outcomes: Vec<OutcomeRow>,
    pub outputs: Vec<Artifact>,
}

impl RunState {
    /// Queue an artifact, skipping empty rosters and key lists. Reports
    /// are always written.
    pub fn emit(&mut self, artifact: Artifact) {
        use crate::model::ArtifactKind;
        let empty = match &artifact.kind {
            ArtifactKind::Roster(rows) => rows.is_empty(),
            ArtifactKind::KeyList(keys) => keys.is_empty(),
            ArtifactKind::Report(_) => false,
        };
        if empty {
            info!(stem = %artifact.stem, "nothing to write");
        } else {
            self.outputs.push(artifact);
        }
    }
}

/// Run a job per config. Returns outcome rows, summary and the artifacts
/// to write.
pub fn run(config: &JobConfig, input: &JobInput) -> Result<JobResult, ReconError> {
    let mut state = RunState::default();

    match config.mode {
        JobMode::Compare => crate::compare::run_compare(config, input, &mut state)?,
        JobMode::Sync => crate::sync::run_sync(config, input, &mut state)?,
        JobMode::Status => crate::status::run_status(config, input, &mut state)?,
        JobMode::Load => crate::load::run_load(config, input, &mut state)?,
        JobMode::Extract => crate::extract::run_extract(config, input, &mut state)?,
    }

    tally_outcomes(&mut state.summary, &state.outcomes);

    info!(
        job = %config.name,
        mode = %config.mode,
        outcomes = state.outcomes.len(),
        artifacts = state.outputs.len(),
        "job finished"
    );

    Ok(JobResult {
        meta: JobMeta {
            job_name: config.name.clone(),
            mode: config.mode,
            tag: config.tag(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary: state.summary,
        outcomes: state.outcomes,
        artifacts: state.outputs.iter().map(ArtifactInfo::from).collect(),
        outputs: state.outputs,
    })
}

// ---------------------------------------------------------------------------
// Shared role preparation
// ---------------------------------------------------------------------------

/// The role's table after its row filter. Records the raw row count.
pub(crate) fn filtered_table(
    config: &JobConfig,
    role: &str,
    input: &JobInput,
    summary: &mut JobSummary,
) -> Result<Table, ReconError> {
    let role_config = config.role(role)?;
    let table = input
        .tables
        .get(role)
        .ok_or_else(|| ReconError::MissingInput(role.to_string()))?;
    summary.rows_read.insert(role.to_string(), table.len());

    match &role_config.filter {
        Some(filter) => {
            let kept = apply_row_filter(role, table, filter)?;
            info!(role, kept = kept.len(), dropped = table.len() - kept.len(), "row filter applied");
            Ok(kept)
        }
        None => Ok(table.clone()),
    }
}

/// (active, inactive) split by the role's status filter. Without one,
/// every row is active.
pub(crate) fn split_role(config: &JobConfig, role: &str, table: &Table) -> Result<(Table, Table), ReconError> {
    let role_config = config.role(role)?;
    Ok(match &role_config.active {
        Some(filter) => {
            let (active, inactive) = split_active(role, table, filter);
            info!(role, active = active.len(), inactive = inactive.len(), "status split");
            (active, inactive)
        }
        None => (table.clone(), Table::new(table.headers.clone(), Vec::new())),
    })
}

/// Map a table to people, counting rows with invalid keys.
pub(crate) fn people_of(
    config: &JobConfig,
    role: &str,
    table: &Table,
    summary: &mut JobSummary,
) -> Result<Vec<Person>, ReconError> {
    let role_config = config.role(role)?;
    let extracted = extract_people(role, table, &role_config.columns)?;
    if extracted.invalid > 0 {
        warn!(role, rows = extracted.invalid, "rows without a valid RUT skipped");
        *summary.invalid_keys.entry(role.to_string()).or_insert(0) += extracted.invalid;
    }
    Ok(extracted.people)
}

/// Active people of a role: row filter, status split, column mapping.
pub(crate) fn active_people(
    config: &JobConfig,
    role: &str,
    input: &JobInput,
    summary: &mut JobSummary,
) -> Result<Vec<Person>, ReconError> {
    let table = filtered_table(config, role, input, summary)?;
    let (active, _) = split_role(config, role, &table)?;
    people_of(config, role, &active, summary)
}
