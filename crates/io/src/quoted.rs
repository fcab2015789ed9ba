//! Quoted-line CSV consumed by the benefits platform's bulk importer.
//!
//! Each record is one double-quoted string followed by a comma, with the
//! fields joined by bare commas inside the quotes. Values are written as
//! is; the importer does no escaping of its own.

use std::path::Path;

use padron_recon::RosterRow;

use crate::error::IoError;

const BOM: &str = "\u{FEFF}";

pub const ROSTER_HEADER: &str = "Nombre,Apellido,Email,RUT";

/// Roster file body: BOM, quoted header without trailing comma, then one
/// `"name,surname,email,rut",` line per row.
pub fn render_roster(rows: &[RosterRow]) -> String {
    let mut out = String::from(BOM);
    out.push('"');
    out.push_str(ROSTER_HEADER);
    out.push_str("\"\n");
    for row in rows {
        out.push_str(&format!(
            "\"{},{},{},{}\",\n",
            row.name, row.surname, row.email, row.key
        ));
    }
    out
}

/// Key list body: BOM, then `"rut",` per line. No header.
pub fn render_key_list(keys: &[String]) -> String {
    let mut out = String::from(BOM);
    for key in keys {
        out.push_str(&format!("\"{key}\",\n"));
    }
    out
}

/// Membership ids: quoted, joined by `,` + newline, no BOM, no trailing
/// newline.
pub fn render_id_list(ids: &[String]) -> String {
    ids.iter()
        .map(|id| format!("\"{id}\""))
        .collect::<Vec<_>>()
        .join(",\n")
}

fn write(path: &Path, body: &str) -> Result<(), IoError> {
    std::fs::write(path, body).map_err(|e| IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn write_roster(rows: &[RosterRow], path: &Path) -> Result<(), IoError> {
    write(path, &render_roster(rows))
}

pub fn write_key_list(keys: &[String], path: &Path) -> Result<(), IoError> {
    write(path, &render_key_list(keys))
}

pub fn write_id_list(ids: &[String], path: &Path) -> Result<(), IoError> {
    write(path, &render_id_list(ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(name: &str, surname: &str, email: &str, key: &str) -> RosterRow {
        RosterRow {
            name: name.into(),
            surname: surname.into(),
            email: email.into(),
            key: key.into(),
        }
    }

    #[test]
    fn roster_bytes() {
        let body = render_roster(&[
            row("Ana", "Soto Pérez", "ana@x.cl", "123456785"),
            row("Bob", "", "", "7654321K"),
        ]);
        assert_eq!(
            body,
            "\u{FEFF}\"Nombre,Apellido,Email,RUT\"\n\"Ana,Soto Pérez,ana@x.cl,123456785\",\n\"Bob,,,7654321K\",\n"
        );
        assert_eq!(&body.as_bytes()[..3], &[0xEF, 0xBB, 0xBF]);
    }

    #[test]
    fn empty_roster_keeps_header() {
        assert_eq!(render_roster(&[]), "\u{FEFF}\"Nombre,Apellido,Email,RUT\"\n");
    }

    #[test]
    fn key_list_bytes() {
        let keys = vec!["19".to_string(), "190".to_string()];
        assert_eq!(render_key_list(&keys), "\u{FEFF}\"19\",\n\"190\",\n");
    }

    #[test]
    fn id_list_bytes() {
        let ids = vec!["m-1".to_string(), "m-4".to_string()];
        assert_eq!(render_id_list(&ids), "\"m-1\",\n\"m-4\"");
        assert_eq!(render_id_list(&[]), "");
    }

    #[test]
    fn write_to_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bajas.csv");
        write_key_list(&["1".to_string()], &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, b"\xEF\xBB\xBF\"1\",\n");

        let missing = dir.path().join("no/such/dir/x.csv");
        assert!(matches!(write_key_list(&[], &missing), Err(IoError::Write { .. })));
    }
}
