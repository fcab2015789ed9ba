//! Bulk-import rosters, one per channel.

use std::collections::{BTreeMap, HashSet};

use tracing::{info, warn};

use crate::config::JobConfig;
use crate::dedup::resolve_duplicate_keys;
use crate::email::EmailRegistry;
use crate::engine::{filtered_table, people_of, split_role, RunState};
use crate::error::ReconError;
use crate::model::{Artifact, JobInput};
use crate::names::slug;
use crate::people::Person;

/// Group value used when the group cell is empty.
pub const UNGROUPED: &str = "Sin canal";

pub fn run_load(config: &JobConfig, input: &JobInput, state: &mut RunState) -> Result<(), ReconError> {
    let cfg = config
        .load
        .as_ref()
        .ok_or(ReconError::ModeMismatch { mode: "load".into() })?;

    let table = filtered_table(config, &cfg.source, input, &mut state.summary)?;
    let (table, _) = split_role(config, &cfg.source, &table)?;
    let people = people_of(config, &cfg.source, &table, &mut state.summary)?;

    let mut groups: BTreeMap<String, Vec<&Person>> = BTreeMap::new();
    let mut skipped = 0usize;
    for person in &people {
        if person.email.is_empty() {
            skipped += 1;
            continue;
        }
        let group = if person.group.is_empty() { UNGROUPED } else { person.group.as_str() };
        groups.entry(group.to_string()).or_default().push(person);
    }
    if skipped > 0 {
        warn!(role = %cfg.source, rows = skipped, "rows without email skipped");
    }
    state.summary.skipped_rows += skipped;

    let mut stems = HashSet::new();
    for (group, members) in &groups {
        let keys: Vec<String> = members.iter().map(|p| p.key.clone()).collect();
        let padded = resolve_duplicate_keys(&keys);
        state.summary.padded_keys += keys.iter().zip(&padded).filter(|(a, b)| a != b).count();

        let mut emails = EmailRegistry::new();
        let mut roster = Vec::with_capacity(members.len());
        for (person, key) in members.iter().zip(&padded) {
            let email = emails.claim(&person.email);
            if email != person.email {
                state.summary.suffixed_emails += 1;
            }
            roster.push(person.roster_row(key, &email, config.title_case_names));
        }

        let base = format!("altas_{}", slug(group));
        let mut stem = base.clone();
        let mut n = 2;
        while !stems.insert(stem.clone()) {
            stem = format!("{base}_{n}");
            n += 1;
        }

        info!(group = %group, rows = roster.len(), stem = %stem, "group roster");
        state.summary.activations += roster.len();
        state.emit(Artifact::roster(stem, roster));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::JobConfig;
    use crate::engine::run;
    use crate::model::{ArtifactKind, JobInput, Table};

    const JOB: &str = r#"
name = "Southbridge"
mode = "load"

[roles.polizas]
file = { contains = ["southbridge"] }
[roles.polizas.columns]
rut = "Rut propietario"
dv = "Propietario DV"
name = "Nombre"
surname_paternal = "Paterno"
surname_maternal = "Materno"
email = "Email"
group = "Canal"

[load]
source = "polizas"
"#;

    fn t(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter().map(|r| r.iter().map(|s| s.to_string()).collect()).collect(),
        )
    }

    #[test]
    fn one_roster_per_channel() {
        let config = JobConfig::from_toml(JOB).unwrap();
        let polizas = t(
            &["Rut propietario", "Propietario DV", "Nombre", "Paterno", "Materno", "Email", "Canal"],
            &[
                &["12345678.0", "5", "ana", "soto", "", "ana@x.cl", "Corredora Sur"],
                &["12345678", "5", "ana", "soto", "", "ana@x.cl", "Corredora Sur"],
                &["7654321", "k", "bob", "lee", "paz", "bob@x.cl", ""],
                &["1111111", "1", "cata", "ruiz", "", "", "Banca"],
                &["2222222", "2", "dani", "mora", "", "DANI@x.cl", "banca"],
            ],
        );
        let input = JobInput {
            tables: [("polizas".to_string(), polizas)].into_iter().collect(),
        };
        let result = run(&config, &input).unwrap();

        let stems: Vec<_> = result.outputs.iter().map(|a| a.stem.as_str()).collect();
        assert_eq!(stems, ["altas_corredora_sur", "altas_sin_canal", "altas_banca"]);

        match &result.outputs[0].kind {
            ArtifactKind::Roster(rows) => {
                let got: Vec<_> = rows.iter().map(|r| (r.key.as_str(), r.email.as_str())).collect();
                assert_eq!(got, [("123456785", "ana@x.cl"), ("1234567850", "ana-copy@x.cl")]);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &result.outputs[1].kind {
            ArtifactKind::Roster(rows) => {
                assert_eq!(rows[0].key, "7654321K");
                assert_eq!(rows[0].surname, "Lee Paz");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(result.summary.skipped_rows, 1);
        assert_eq!(result.summary.padded_keys, 1);
        assert_eq!(result.summary.suffixed_emails, 1);
    }
}
