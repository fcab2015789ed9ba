//! Removal and addition sheets checked against an active/inactive base.

use std::collections::BTreeSet;

use tracing::info;

use crate::aggregate::group_by_key;
use crate::classify::{outcome_row, sort_outcomes, split_reports, Labels, RowContext};
use crate::config::JobConfig;
use crate::dedup::unique_in_order;
use crate::engine::{filtered_table, people_of, split_role, RunState};
use crate::error::ReconError;
use crate::model::{Artifact, JobInput, Outcome, RosterRow};

pub fn run_status(config: &JobConfig, input: &JobInput, state: &mut RunState) -> Result<(), ReconError> {
    let cfg = config
        .status
        .as_ref()
        .ok_or(ReconError::ModeMismatch { mode: "status".into() })?;
    let tag = config.tag();

    let base = filtered_table(config, &cfg.base, input, &mut state.summary)?;
    let (active, inactive) = split_role(config, &cfg.base, &base)?;
    let active = people_of(config, &cfg.base, &active, &mut state.summary)?;
    let inactive = people_of(config, &cfg.base, &inactive, &mut state.summary)?;
    let active_groups = group_by_key(&active);
    let inactive_groups = group_by_key(&inactive);

    let removals = filtered_table(config, &cfg.removals, input, &mut state.summary)?;
    let removals = people_of(config, &cfg.removals, &removals, &mut state.summary)?;
    let removal_keys: Vec<String> = removals.into_iter().map(|p| p.key).collect();
    let removal_keys = unique_in_order(&removal_keys);
    state.summary.deactivations += removal_keys.len();
    state.emit(Artifact::key_list(format!("bajas_{tag}"), removal_keys));

    let additions = filtered_table(config, &cfg.additions, input, &mut state.summary)?;
    let additions = people_of(config, &cfg.additions, &additions, &mut state.summary)?;
    let addition_groups = group_by_key(&additions);

    let labels = Labels::new(config.role_label(&cfg.additions), config.role_label(&cfg.base));
    let ctx = RowContext { labels: &labels, segment: None, segment_index: 0 };

    let mut rows = Vec::with_capacity(addition_groups.len());
    // Keys both active and inactive in the base count as active.
    for (key, group) in &addition_groups {
        let row = if let Some(base) = active_groups.get(key) {
            outcome_row(key, Outcome::AlreadyActive, ctx, None, Some(group), Some(base))
        } else if let Some(base) = inactive_groups.get(key) {
            outcome_row(key, Outcome::Inactive, ctx, None, Some(group), Some(base))
        } else {
            outcome_row(key, Outcome::NotFound, ctx, None, Some(group), None)
        };
        rows.push(row);
    }
    sort_outcomes(&mut rows);

    for report in split_reports(&config.prefix, &rows, &labels) {
        state.emit(report);
    }

    let to_add: BTreeSet<&str> = rows
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::NotFound | Outcome::Inactive))
        .map(|r| r.key.as_str())
        .collect();
    let roster: Vec<_> = additions
        .iter()
        .filter(|p| to_add.contains(p.key.as_str()))
        .map(|p| p.roster_row(&p.key, &p.email, config.title_case_names))
        .collect();
    let roster = first_per_key(roster);

    info!(
        already_active = rows.len() - to_add.len(),
        to_add = roster.len(),
        "status checked"
    );
    state.summary.activations += roster.len();
    state.emit(Artifact::roster(format!("agregar_{tag}"), roster));

    state.outcomes.extend(rows);
    Ok(())
}

fn first_per_key(rows: Vec<RosterRow>) -> Vec<RosterRow> {
    let mut seen = BTreeSet::new();
    rows.into_iter().filter(|r| seen.insert(r.key.clone())).collect()
}
