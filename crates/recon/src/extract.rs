//! Active rows to a roster, inactive rows to a workbook.

use tracing::info;

use crate::config::JobConfig;
use crate::engine::{filtered_table, people_of, split_role, RunState};
use crate::error::ReconError;
use crate::model::{Artifact, JobInput, ReportSheet};

pub fn run_extract(config: &JobConfig, input: &JobInput, state: &mut RunState) -> Result<(), ReconError> {
    let cfg = config
        .extract
        .as_ref()
        .ok_or(ReconError::ModeMismatch { mode: "extract".into() })?;
    let tag = config.tag();

    let table = filtered_table(config, &cfg.source, input, &mut state.summary)?;
    let (active, inactive) = split_role(config, &cfg.source, &table)?;

    let roster: Vec<_> = people_of(config, &cfg.source, &active, &mut state.summary)?
        .iter()
        .map(|p| p.roster_row(&p.key, &p.email, config.title_case_names))
        .collect();

    info!(active = roster.len(), inactive = inactive.len(), "extract split");
    state.summary.activations += roster.len();
    state.summary.deactivations += inactive.len();

    state.emit(Artifact::roster(format!("datos_{tag}_activos"), roster));
    state.emit(Artifact::report(
        format!("datos_{tag}_inactivos"),
        ReportSheet {
            sheet_name: "Datos".to_string(),
            headers: inactive.headers.clone(),
            rows: inactive.rows,
        },
    ));
    Ok(())
}
