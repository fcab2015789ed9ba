//! Internal base vs vendor roster: who to activate, who to deactivate.

use std::collections::BTreeSet;

use tracing::info;

use crate::aggregate::{group_by_key, keys_of, KeyGroup};
use crate::classify::{outcome_row, Labels, RowContext};
use crate::config::JobConfig;
use crate::dedup::{resolve_duplicate_keys, unique_in_order};
use crate::email::EmailRegistry;
use crate::engine::{active_people, filtered_table, people_of, split_role, RunState};
use crate::error::ReconError;
use crate::filter::partition_rows;
use crate::model::{Artifact, JobInput, Outcome, Table};

pub fn run_sync(config: &JobConfig, input: &JobInput, state: &mut RunState) -> Result<(), ReconError> {
    let cfg = config
        .sync
        .as_ref()
        .ok_or(ReconError::ModeMismatch { mode: "sync".into() })?;
    let tag = config.tag();

    let source = filtered_table(config, &cfg.source, input, &mut state.summary)?;
    let (source, _) = split_role(config, &cfg.source, &source)?;
    let (terminated, remaining) = match &cfg.terminations {
        Some(filter) => partition_rows(&cfg.source, &source, filter)?,
        None => (Table::new(source.headers.clone(), Vec::new()), source),
    };

    // Deactivations requested by the base itself.
    let terminated = people_of(config, &cfg.source, &terminated, &mut state.summary)?;
    let terminated_keys: Vec<String> = terminated.into_iter().map(|p| p.key).collect();
    let terminated_keys = unique_in_order(&terminated_keys);
    state.summary.deactivations += terminated_keys.len();
    state.emit(Artifact::key_list(format!("bajas_{tag}_desactivacion"), terminated_keys));

    let people = people_of(config, &cfg.source, &remaining, &mut state.summary)?;
    let raw_keys: Vec<String> = people.iter().map(|p| p.key.clone()).collect();
    let padded = resolve_duplicate_keys(&raw_keys);
    state.summary.padded_keys += raw_keys.iter().zip(&padded).filter(|(a, b)| a != b).count();

    let target = active_people(config, &cfg.target, input, &mut state.summary)?;
    let target_groups = group_by_key(&target);
    let target_keys = keys_of(&target_groups);
    let mut emails = EmailRegistry::seeded(target.iter().map(|p| p.email.as_str()));

    let labels = Labels::new(config.role_label(&cfg.source), config.role_label(&cfg.target));
    let ctx = RowContext { labels: &labels, segment: None, segment_index: 0 };

    let mut activations = Vec::new();
    for (person, key) in people.iter().zip(&padded) {
        let group = KeyGroup { first: person, count: 1 };
        if target_keys.contains(key) {
            state
                .outcomes
                .push(outcome_row(key, Outcome::Match, ctx, None, Some(&group), target_groups.get(key)));
            continue;
        }
        let email = emails.claim(&person.email);
        if !email.is_empty() && email != person.email {
            state.summary.suffixed_emails += 1;
        }
        activations.push(person.roster_row(key, &email, config.title_case_names));
        state
            .outcomes
            .push(outcome_row(key, Outcome::MissingInTarget, ctx, None, Some(&group), None));
    }

    let source_keys: BTreeSet<&String> = padded.iter().collect();
    let extra: Vec<String> = target_keys
        .iter()
        .filter(|k| !source_keys.contains(k))
        .cloned()
        .collect();
    for key in &extra {
        state
            .outcomes
            .push(outcome_row(key, Outcome::MissingInSource, ctx, None, None, target_groups.get(key)));
    }

    info!(
        activations = activations.len(),
        deactivations = extra.len(),
        padded = state.summary.padded_keys,
        "sync computed"
    );
    state.summary.activations += activations.len();
    state.summary.deactivations += extra.len();

    state.emit(Artifact::roster(format!("altas_{tag}_activacion"), activations));
    state.emit(Artifact::key_list(format!("bajas_{tag}_no_en_base"), extra));
    Ok(())
}
