//! Artifact files: `<stem>_<timestamp>.<ext>` in the output directory.

use std::path::{Path, PathBuf};

use padron_recon::{Artifact, ArtifactKind};
use tracing::info;

use crate::error::IoError;
use crate::{quoted, xlsx};

/// Local-time run stamp, e.g. `20250314_093015`.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// File name for an artifact under a run stamp.
pub fn file_name(artifact: &Artifact, stamp: &str) -> String {
    format!("{}_{}.{}", artifact.stem, stamp, artifact.kind.extension())
}

/// Write one artifact into `dir`, creating the directory if needed.
pub fn write_artifact(dir: &Path, artifact: &Artifact, stamp: &str) -> Result<PathBuf, IoError> {
    std::fs::create_dir_all(dir).map_err(|e| IoError::Write {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let path = dir.join(file_name(artifact, stamp));
    match &artifact.kind {
        ArtifactKind::Roster(rows) => quoted::write_roster(rows, &path)?,
        ArtifactKind::KeyList(keys) => quoted::write_key_list(keys, &path)?,
        ArtifactKind::Report(sheet) => xlsx::write_report(sheet, &path)?,
    }

    info!(
        file = %path.display(),
        kind = artifact.kind.kind_name(),
        records = artifact.kind.records(),
        "artifact written"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use padron_recon::{ReportSheet, RosterRow};
    use tempfile::tempdir;

    #[test]
    fn stamp_shape() {
        let stamp = timestamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn writes_each_kind() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("resultado");
        let stamp = "20250101_120000";

        let roster = Artifact::roster(
            "altas_banca",
            vec![RosterRow {
                name: "Ana".into(),
                surname: "Soto".into(),
                email: "ana@x.cl".into(),
                key: "19".into(),
            }],
        );
        let keys = Artifact::key_list("bajas_banca", vec!["27".into()]);
        let report = Artifact::report(
            "comparacion_coincidencias",
            ReportSheet {
                sheet_name: "Coincidencias".into(),
                headers: vec!["RUT".into()],
                rows: vec![vec!["19".into()]],
            },
        );

        let p1 = write_artifact(&out, &roster, stamp).unwrap();
        let p2 = write_artifact(&out, &keys, stamp).unwrap();
        let p3 = write_artifact(&out, &report, stamp).unwrap();

        assert_eq!(p1.file_name().unwrap(), "altas_banca_20250101_120000.csv");
        assert_eq!(p2.file_name().unwrap(), "bajas_banca_20250101_120000.csv");
        assert_eq!(p3.file_name().unwrap(), "comparacion_coincidencias_20250101_120000.xlsx");
        assert!(std::fs::read_to_string(&p1).unwrap().contains("\"Ana,Soto,ana@x.cl,19\","));
        assert!(p3.is_file());
    }
}
