//! Active membership ids from a platform export.

use crate::error::ReconError;
use crate::model::Table;

#[derive(Debug, Clone)]
pub struct IdsOptions {
    pub status_column: String,
    pub active_value: String,
    pub id_column: String,
}

impl Default for IdsOptions {
    fn default() -> Self {
        Self {
            status_column: "Estado de la membresía".to_string(),
            active_value: "Activo".to_string(),
            id_column: "MembershipId".to_string(),
        }
    }
}

/// Ids of rows whose status equals `active_value` (both trimmed), in row
/// order. Rows with an empty id are dropped.
pub fn extract_active_ids(table: &Table, options: &IdsOptions) -> Result<Vec<String>, ReconError> {
    let column = |name: &str| {
        table
            .resolve_column(&[name.to_string()])
            .ok_or_else(|| ReconError::MissingColumn {
                role: "ids".to_string(),
                column: name.to_string(),
            })
    };
    let status = column(&options.status_column)?;
    let id = column(&options.id_column)?;
    let wanted = options.active_value.trim();

    Ok((0..table.len())
        .filter(|&row| table.cell(row, status).trim() == wanted)
        .map(|row| table.cell(row, id).trim().to_string())
        .filter(|id| !id.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let headers = ["MembershipId", "Nombre", "Estado de la membresía"].map(String::from).to_vec();
        let rows = [
            ["m-1", "ana", "Activo"],
            ["m-2", "bob", "Inactivo"],
            ["", "cata", "Activo"],
            [" m-4 ", "dani", " Activo "],
        ]
        .into_iter()
        .map(|r| r.map(String::from).to_vec())
        .collect();
        Table::new(headers, rows)
    }

    #[test]
    fn keeps_active_non_empty_ids() {
        let ids = extract_active_ids(&table(), &IdsOptions::default()).unwrap();
        assert_eq!(ids, ["m-1", "m-4"]);
    }

    #[test]
    fn custom_columns() {
        let options = IdsOptions {
            status_column: "Estado de la membresía".into(),
            active_value: "Inactivo".into(),
            id_column: "Nombre".into(),
        };
        assert_eq!(extract_active_ids(&table(), &options).unwrap(), ["bob"]);
    }

    #[test]
    fn missing_column() {
        let options = IdsOptions { id_column: "Socio".into(), ..IdsOptions::default() };
        let err = extract_active_ids(&table(), &options).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { ref column, .. } if column == "Socio"));
    }
}
