use tracing::warn;

use crate::config::{ActiveFilter, RowFilter};
use crate::error::ReconError;
use crate::model::Table;

impl ActiveFilter {
    pub fn is_active(&self, cell: &str) -> bool {
        let value = cell.trim().to_uppercase();
        self.tokens.iter().any(|t| t.trim().to_uppercase() == value)
    }
}

impl RowFilter {
    pub fn matches(&self, cell: &str) -> bool {
        let value = cell.trim().to_lowercase();
        self.equals.iter().any(|v| v.trim().to_lowercase() == value)
            || self
                .contains
                .iter()
                .map(|v| v.trim().to_lowercase())
                .any(|v| !v.is_empty() && value.contains(&v))
    }
}

/// Split a table into (active, inactive) rows.
///
/// When the status column cannot be found every row counts as active and
/// a warning is logged.
pub fn split_active(role: &str, table: &Table, filter: &ActiveFilter) -> (Table, Table) {
    match table.resolve_column(filter.column.candidates()) {
        Some(col) => table.partition(|row| filter.is_active(row.get(col).map(String::as_str).unwrap_or(""))),
        None => {
            warn!(
                role,
                column = %filter.column.display_name(),
                "status column not found, treating every row as active"
            );
            (table.clone(), Table::new(table.headers.clone(), Vec::new()))
        }
    }
}

/// Split a table into (matching, rest) rows. The column must exist.
pub fn partition_rows(role: &str, table: &Table, filter: &RowFilter) -> Result<(Table, Table), ReconError> {
    let col = table
        .resolve_column(filter.column.candidates())
        .ok_or_else(|| ReconError::MissingColumn {
            role: role.to_string(),
            column: filter.column.display_name(),
        })?;
    Ok(table.partition(|row| filter.matches(row.get(col).map(String::as_str).unwrap_or(""))))
}

/// Keep only rows matching the filter.
pub fn apply_row_filter(role: &str, table: &Table, filter: &RowFilter) -> Result<Table, ReconError> {
    partition_rows(role, table, filter).map(|(kept, _)| kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnRef, DEFAULT_ACTIVE_TOKENS};

    fn active(column: &str) -> ActiveFilter {
        ActiveFilter {
            column: ColumnRef::One(column.into()),
            tokens: DEFAULT_ACTIVE_TOKENS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn table() -> Table {
        Table::new(
            vec!["RUT".into(), "Estado".into(), "COMENTARIOS".into()],
            vec![
                vec!["1".into(), "Activo".into(), "".into()],
                vec!["2".into(), "true".into(), "dar de BAJA".into()],
                vec!["3".into(), "FALSE".into(), "ok".into()],
                vec!["4".into(), " sí ".into(), "".into()],
                vec!["5".into(), "".into()],
                vec!["6".into(), "1".into(), "baja".into()],
            ],
        )
    }

    #[test]
    fn default_tokens_recognized() {
        let f = active("Estado");
        for v in ["VERDADERO", "true", "Activo", "1", "si", "Sí", "yes"] {
            assert!(f.is_active(v), "{v} should be active");
        }
        for v in ["FALSE", "0", "inactivo", "", "no"] {
            assert!(!f.is_active(v), "{v} should be inactive");
        }
    }

    #[test]
    fn split_by_status() {
        let (on, off) = split_active("bice", &table(), &active("estado"));
        let keys: Vec<_> = on.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(keys, ["1", "2", "4", "6"]);
        assert_eq!(off.len(), 2);
    }

    #[test]
    fn missing_status_column_keeps_everything() {
        let (on, off) = split_active("bice", &table(), &active("Vigente"));
        assert_eq!(on.len(), 6);
        assert!(off.is_empty());
    }

    #[test]
    fn contains_filter_case_insensitive() {
        let f = RowFilter {
            column: ColumnRef::One("comentarios".into()),
            equals: vec![],
            contains: vec!["baja".into()],
        };
        let (bajas, rest) = partition_rows("base", &table(), &f).unwrap();
        let keys: Vec<_> = bajas.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(keys, ["2", "6"]);
        assert_eq!(rest.len(), 4);
    }

    #[test]
    fn equals_filter() {
        let f = RowFilter {
            column: ColumnRef::One("Estado".into()),
            equals: vec!["ACTIVO".into()],
            contains: vec![],
        };
        let kept = apply_row_filter("base", &table(), &f).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.rows[0][0], "1");
    }

    #[test]
    fn row_filter_missing_column_is_error() {
        let f = RowFilter {
            column: ColumnRef::One("Estado póliza".into()),
            equals: vec!["APROBADO".into()],
            contains: vec![],
        };
        let err = apply_row_filter("southbridge", &table(), &f).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { .. }));
    }
}
