//! Source vs target roster comparison, optionally split into segments.

use std::collections::{BTreeMap, HashMap};

use tracing::{info, warn};

use crate::aggregate::{group_by_key, keys_of, KeyGroup};
use crate::classify::{outcome_row, report_labels, sort_outcomes, split_reports, FoundIn, Labels, RowContext};
use crate::config::JobConfig;
use crate::engine::{active_people, filtered_table, people_of, split_role, RunState};
use crate::error::ReconError;
use crate::filter::partition_rows;
use crate::matcher::diff_key_sets;
use crate::model::{Artifact, JobInput, Outcome, OutcomeRow, RosterRow, Table};
use crate::names::slug;
use crate::people::Person;

struct Segment {
    /// Label suffix; `None` for a job without explicit segments.
    name: Option<String>,
    /// Filename token.
    token: String,
    target: String,
    rows: Table,
}

pub fn run_compare(config: &JobConfig, input: &JobInput, state: &mut RunState) -> Result<(), ReconError> {
    let cfg = config
        .compare
        .as_ref()
        .ok_or(ReconError::ModeMismatch { mode: "compare".into() })?;

    let source = filtered_table(config, &cfg.source, input, &mut state.summary)?;
    let (source, _) = split_role(config, &cfg.source, &source)?;
    let segments = build_segments(config, &source)?;

    let mut targets: HashMap<&str, Vec<Person>> = HashMap::new();
    for seg in &segments {
        if !targets.contains_key(seg.target.as_str()) {
            let people = active_people(config, &seg.target, input, &mut state.summary)?;
            targets.insert(seg.target.as_str(), people);
        }
    }
    let mut sources: Vec<Vec<Person>> = Vec::with_capacity(segments.len());
    for seg in &segments {
        sources.push(people_of(config, &cfg.source, &seg.rows, &mut state.summary)?);
    }

    let src_label = config.role_label(&cfg.source);
    let labels: Vec<Labels> = segments
        .iter()
        .map(|s| Labels::new(src_label.clone(), config.role_label(&s.target)))
        .collect();
    let src_groups: Vec<BTreeMap<String, KeyGroup<'_>>> = sources.iter().map(|p| group_by_key(p)).collect();
    let tgt_groups: Vec<BTreeMap<String, KeyGroup<'_>>> = segments
        .iter()
        .map(|s| group_by_key(targets.get(s.target.as_str()).map(Vec::as_slice).unwrap_or(&[])))
        .collect();

    let mut rows: Vec<OutcomeRow> = Vec::new();

    for (i, seg) in segments.iter().enumerate() {
        let ctx = RowContext { labels: &labels[i], segment: seg.name.as_deref(), segment_index: i };
        let (src, tgt) = (&src_groups[i], &tgt_groups[i]);
        let diff = diff_key_sets(&keys_of(src), &keys_of(tgt));

        let mut mismatched = 0usize;
        for key in &diff.matched {
            let (s, t) = (src.get(key), tgt.get(key));
            let same_count = s.map(|g| g.count) == t.map(|g| g.count);
            let outcome = if same_count {
                Outcome::Match
            } else {
                mismatched += 1;
                Outcome::QuantityMismatch
            };
            rows.push(outcome_row(key, outcome, ctx, None, s, t));
        }
        for key in &diff.only_a {
            rows.push(outcome_row(key, Outcome::MissingInTarget, ctx, None, src.get(key), None));
        }
        for key in &diff.only_b {
            rows.push(outcome_row(key, Outcome::MissingInSource, ctx, None, None, tgt.get(key)));
        }

        info!(
            segment = %seg.token,
            matched = diff.matched.len() - mismatched,
            quantity_mismatches = mismatched,
            missing_in_target = diff.only_a.len(),
            missing_in_source = diff.only_b.len(),
            "segment compared"
        );
    }

    // A source key filed under one segment but present in another
    // segment's target is reported in addition to its own outcome.
    for (i, seg) in segments.iter().enumerate() {
        let ctx = RowContext { labels: &labels[i], segment: seg.name.as_deref(), segment_index: i };
        for (j, other) in segments.iter().enumerate() {
            if i == j || seg.target == other.target {
                continue;
            }
            let found = FoundIn { segment: other.name.as_deref(), target: &labels[j].target };
            for (key, s) in &src_groups[i] {
                if let Some(t) = tgt_groups[j].get(key) {
                    rows.push(outcome_row(key, Outcome::Misclassified, ctx, Some(found), Some(s), Some(t)));
                }
            }
        }
    }

    sort_outcomes(&mut rows);

    if let Some(shared) = report_labels(&labels) {
        for report in split_reports(&config.prefix, &rows, &shared) {
            state.emit(report);
        }
    }

    for (i, seg) in segments.iter().enumerate() {
        let src_tok = slug(&labels[i].source);
        let tgt_tok = slug(&labels[i].target);
        let mut with_email: Vec<RosterRow> = Vec::new();
        let mut without_email: Vec<RosterRow> = Vec::new();
        let mut extra: Vec<String> = Vec::new();

        for row in rows.iter().filter(|r| r.segment_index == i) {
            match row.outcome {
                Outcome::MissingInTarget => {
                    let Some(group) = src_groups[i].get(&row.key) else { continue };
                    let person = group.first;
                    let line = person.roster_row(&row.key, &person.email, config.title_case_names);
                    if person.email.is_empty() {
                        without_email.push(line);
                    } else {
                        with_email.push(line);
                    }
                }
                Outcome::MissingInSource => extra.push(row.key.clone()),
                _ => {}
            }
        }

        if !without_email.is_empty() {
            warn!(segment = %seg.token, rows = without_email.len(), "missing rows without email");
        }
        state.summary.activations += with_email.len();
        state.summary.deactivations += extra.len();

        state.emit(Artifact::roster(format!("{src_tok}_sin_{tgt_tok}_{}", seg.token), with_email));
        state.emit(Artifact::roster(format!("error_{src_tok}_{}", seg.token), without_email));
        state.emit(Artifact::key_list(format!("{tgt_tok}_sin_{src_tok}_{}", seg.token), extra));
    }

    state.outcomes.extend(rows);
    Ok(())
}

fn build_segments(config: &JobConfig, source: &Table) -> Result<Vec<Segment>, ReconError> {
    let cfg = config
        .compare
        .as_ref()
        .ok_or(ReconError::ModeMismatch { mode: "compare".into() })?;

    if cfg.segments.is_empty() {
        let target = cfg.target.clone().ok_or_else(|| {
            ReconError::ConfigValidation("compare: `target` or at least one segment is required".into())
        })?;
        return Ok(vec![Segment {
            name: None,
            token: config.tag(),
            target,
            rows: source.clone(),
        }]);
    }

    let mut remaining = source.clone();
    let mut out = Vec::with_capacity(cfg.segments.len());
    for seg in &cfg.segments {
        let (mine, rest) = match &seg.select {
            Some(select) => partition_rows(&cfg.source, &remaining, select)?,
            None => (remaining.clone(), Table::new(remaining.headers.clone(), Vec::new())),
        };
        info!(segment = %seg.name, rows = mine.len(), "segment selected");
        remaining = rest;
        out.push(Segment {
            name: Some(seg.name.clone()),
            token: slug(&seg.name),
            target: seg.target.clone(),
            rows: mine,
        });
    }
    if !remaining.is_empty() {
        warn!(rows = remaining.len(), "source rows matched no segment and were ignored");
    }
    Ok(out)
}
