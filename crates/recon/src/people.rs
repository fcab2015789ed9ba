//! Column mapping: table rows into keyed person records.

use serde::Serialize;
use tracing::debug;

use crate::config::{ColumnMapping, ColumnRef};
use crate::email::normalize_email;
use crate::error::ReconError;
use crate::model::{PersonView, RosterRow, Table};
use crate::names::{collapse_whitespace, combine_surnames, title_case};
use crate::rut::row_key;

/// A roster row with a valid identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    /// Index into the table the person was read from.
    pub row: usize,
    pub key: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub company: String,
    pub group: String,
}

impl Person {
    pub fn view(&self) -> PersonView {
        PersonView {
            name: self.name.clone(),
            surname: self.surname.clone(),
            email: self.email.clone(),
            company: self.company.clone(),
        }
    }

    /// Roster line under `key`, optionally title-casing names.
    pub fn roster_row(&self, key: &str, email: &str, title: bool) -> RosterRow {
        let (name, surname) = if title {
            (title_case(&self.name), title_case(&self.surname))
        } else {
            (collapse_whitespace(&self.name), collapse_whitespace(&self.surname))
        };
        RosterRow {
            name,
            surname,
            email: email.to_string(),
            key: key.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Extracted {
    pub people: Vec<Person>,
    /// Rows whose RUT did not normalize.
    pub invalid: usize,
}

struct Columns {
    rut: usize,
    dv: Option<usize>,
    name: Option<usize>,
    surname: Option<usize>,
    paternal: Option<usize>,
    maternal: Option<usize>,
    email: Option<usize>,
    company: Option<usize>,
    group: Option<usize>,
}

fn required(role: &str, table: &Table, col: &ColumnRef) -> Result<usize, ReconError> {
    table
        .resolve_column(col.candidates())
        .ok_or_else(|| ReconError::MissingColumn {
            role: role.to_string(),
            column: col.display_name(),
        })
}

fn optional(role: &str, table: &Table, col: &Option<ColumnRef>) -> Result<Option<usize>, ReconError> {
    col.as_ref().map(|c| required(role, table, c)).transpose()
}

impl Columns {
    fn resolve(role: &str, table: &Table, mapping: &ColumnMapping) -> Result<Self, ReconError> {
        Ok(Self {
            rut: required(role, table, &mapping.rut)?,
            dv: optional(role, table, &mapping.dv)?,
            name: optional(role, table, &mapping.name)?,
            surname: optional(role, table, &mapping.surname)?,
            paternal: optional(role, table, &mapping.surname_paternal)?,
            maternal: optional(role, table, &mapping.surname_maternal)?,
            email: optional(role, table, &mapping.email)?,
            company: optional(role, table, &mapping.company)?,
            group: optional(role, table, &mapping.group)?,
        })
    }
}

/// Map every row of `table` to a [`Person`]. Every mapped column must
/// exist; rows whose key does not normalize are counted and dropped.
pub fn extract_people(role: &str, table: &Table, mapping: &ColumnMapping) -> Result<Extracted, ReconError> {
    let cols = Columns::resolve(role, table, mapping)?;
    let text = |row: usize, col: Option<usize>| -> String {
        col.map(|c| table.cell(row, c).trim().to_string()).unwrap_or_default()
    };

    let mut out = Extracted::default();
    for row in 0..table.len() {
        let dv = cols.dv.map(|c| table.cell(row, c));
        let Some(key) = row_key(table.cell(row, cols.rut), dv) else {
            out.invalid += 1;
            continue;
        };

        let surname = match cols.surname {
            Some(_) => text(row, cols.surname),
            None => combine_surnames(&text(row, cols.paternal), &text(row, cols.maternal)),
        };

        out.people.push(Person {
            row,
            key,
            name: text(row, cols.name),
            surname,
            email: normalize_email(&text(row, cols.email)),
            company: text(row, cols.company),
            group: text(row, cols.group),
        });
    }

    debug!(role, people = out.people.len(), invalid = out.invalid, "mapped rows");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> ColumnMapping {
        ColumnMapping {
            rut: ColumnRef::One("RUT_ASEGURADO".into()),
            dv: Some(ColumnRef::One("DV_ASEGURADO".into())),
            name: Some(ColumnRef::One("NOMBRE".into())),
            surname: None,
            surname_paternal: Some(ColumnRef::One("PATERNO".into())),
            surname_maternal: Some(ColumnRef::One("MATERNO".into())),
            email: Some(ColumnRef::Many(vec!["correo".into(), "email".into()])),
            group: None,
            company: None,
        }
    }

    fn table() -> Table {
        Table::new(
            vec![
                "RUT_ASEGURADO".into(),
                "DV_ASEGURADO".into(),
                "NOMBRE".into(),
                "PATERNO".into(),
                "MATERNO".into(),
                "EMAIL".into(),
            ],
            vec![
                vec!["12345678".into(), "k".into(), "ana".into(), "Pérez".into(), "Soto".into(), " Ana@X.cl ".into()],
                vec!["".into(), "5".into(), "nadie".into()],
                vec!["007654321".into(), "0".into(), "Bob".into(), "".into(), "Lee".into(), "".into()],
            ],
        )
    }

    #[test]
    fn maps_and_normalizes() {
        let out = extract_people("carga", &table(), &mapping()).unwrap();
        assert_eq!(out.invalid, 1);
        assert_eq!(out.people.len(), 2);

        let ana = &out.people[0];
        assert_eq!(ana.key, "12345678K");
        assert_eq!(ana.surname, "Pérez Soto");
        assert_eq!(ana.email, "ana@x.cl");
        assert_eq!(ana.row, 0);

        let bob = &out.people[1];
        assert_eq!(bob.key, "76543210");
        assert_eq!(bob.surname, "Lee");
        assert_eq!(bob.row, 2);
    }

    #[test]
    fn missing_mapped_column_is_error() {
        let mut m = mapping();
        m.company = Some(ColumnRef::One("NOMBRE_CONTRATANTE".into()));
        let err = extract_people("carga", &table(), &m).unwrap_err();
        match err {
            ReconError::MissingColumn { role, column } => {
                assert_eq!(role, "carga");
                assert_eq!(column, "NOMBRE_CONTRATANTE");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn roster_row_title_cases() {
        let out = extract_people("carga", &table(), &mapping()).unwrap();
        let row = out.people[0].roster_row("12345678K", "ana@x.cl", true);
        assert_eq!(row.name, "Ana");
        assert_eq!(row.surname, "Pérez Soto");
        let raw = out.people[0].roster_row("12345678K", "ana@x.cl", false);
        assert_eq!(raw.name, "ana");
    }
}
