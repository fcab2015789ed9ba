use crate::aggregate::KeyGroup;
use crate::model::{Artifact, Outcome, OutcomeRow, ReportSheet};

/// Operator-facing names of the two sides, e.g. `CARGA` / `BICE`.
#[derive(Debug, Clone)]
pub struct Labels {
    pub source: String,
    pub target: String,
}

impl Labels {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into().to_uppercase(),
            target: target.into().to_uppercase(),
        }
    }
}

/// Segment and target label where a misclassified key was found.
#[derive(Debug, Clone, Copy)]
pub struct FoundIn<'a> {
    pub segment: Option<&'a str>,
    pub target: &'a str,
}

/// Labels for a report spanning several segments. Target columns get a
/// neutral `DESTINO` label unless every segment shares one target label.
pub fn report_labels(labels: &[Labels]) -> Option<Labels> {
    let first = labels.first()?;
    if labels.iter().all(|l| l.target == first.target) {
        Some(first.clone())
    } else {
        Some(Labels::new(first.source.clone(), "DESTINO"))
    }
}

/// Where an outcome row sits: which segment (if the job has several)
/// and its position for sorting.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub labels: &'a Labels,
    pub segment: Option<&'a str>,
    pub segment_index: usize,
}

/// State label written to the `ESTADO` column.
pub fn state_label(outcome: Outcome, labels: &Labels, segment: Option<&str>, found: Option<FoundIn<'_>>) -> String {
    let seg = segment
        .map(|s| format!("_{}", s.to_uppercase()))
        .unwrap_or_default();
    let (s, t) = (&labels.source, &labels.target);
    match outcome {
        Outcome::Match => format!("COINCIDENCIA{seg}"),
        Outcome::QuantityMismatch => format!("DIFERENCIA_CANTIDAD{seg}"),
        Outcome::MissingInTarget => format!("{s}{seg}_SIN_{t}"),
        Outcome::MissingInSource => format!("{t}{seg}_SIN_{s}"),
        Outcome::Misclassified => format!(
            "ERROR{seg}_EN_{}",
            found
                .map(|f| f.segment.unwrap_or(f.target).to_uppercase())
                .unwrap_or_else(|| t.clone())
        ),
        Outcome::AlreadyActive => "YA_ACTIVO".to_string(),
        Outcome::NotFound => "NO_EXISTE".to_string(),
        Outcome::Inactive => "INACTIVO".to_string(),
    }
}

fn observation(
    outcome: Outcome,
    labels: &Labels,
    segment: Option<&str>,
    found: Option<FoundIn<'_>>,
    source_count: usize,
    target_count: usize,
) -> String {
    let (s, t) = (&labels.source, &labels.target);
    match outcome {
        Outcome::Match => "OK - RUT presente en ambos archivos".to_string(),
        Outcome::QuantityMismatch => format!(
            "DIFERENCIA - {s} tiene {source_count} registros, {t} tiene {target_count} registros"
        ),
        Outcome::MissingInTarget => format!("FALTA - RUT en {s} pero NO en {t}"),
        Outcome::MissingInSource => format!("EXTRA - RUT en {t} pero NO en {s}"),
        Outcome::Misclassified => {
            let (where_target, where_segment) = match found {
                Some(f) => (f.target.to_uppercase(), f.segment.map(str::to_uppercase)),
                None => (t.clone(), None),
            };
            let mut text = format!(
                "ERROR - RUT clasificado como {} en {s} pero está en {where_target}",
                segment.unwrap_or_default().to_uppercase()
            );
            if let Some(seg) = where_segment {
                text.push_str(&format!(" ({seg})"));
            }
            text
        }
        Outcome::AlreadyActive => "OK - Usuario ya existe y está activo".to_string(),
        Outcome::NotFound => "AGREGAR - Usuario no existe en base".to_string(),
        Outcome::Inactive => "REACTIVAR - Usuario existe pero está inactivo".to_string(),
    }
}

/// Build one outcome row. `found` locates a misclassified key.
pub fn outcome_row(
    key: &str,
    outcome: Outcome,
    ctx: RowContext<'_>,
    found: Option<FoundIn<'_>>,
    source: Option<&KeyGroup<'_>>,
    target: Option<&KeyGroup<'_>>,
) -> OutcomeRow {
    let source_count = source.map(|g| g.count).unwrap_or(0);
    let target_count = target.map(|g| g.count).unwrap_or(0);
    OutcomeRow {
        key: key.to_string(),
        outcome,
        label: state_label(outcome, ctx.labels, ctx.segment, found),
        segment: ctx.segment.map(str::to_string),
        segment_index: ctx.segment_index,
        observation: observation(outcome, ctx.labels, ctx.segment, found, source_count, target_count),
        source: source.map(|g| g.first.view()),
        target: target.map(|g| g.first.view()),
        source_count,
        target_count,
    }
}

/// Report order: outcome, then segment, then key.
pub fn sort_outcomes(rows: &mut [OutcomeRow]) {
    rows.sort_by(|a, b| {
        (a.outcome, a.segment_index, &a.key).cmp(&(b.outcome, b.segment_index, &b.key))
    });
}

/// Render outcome rows as a review sheet.
pub fn report_sheet(sheet_name: &str, rows: &[&OutcomeRow], labels: &Labels) -> ReportSheet {
    let (s, t) = (&labels.source, &labels.target);
    let headers = vec![
        "RUT".to_string(),
        "ESTADO".to_string(),
        "TIPO".to_string(),
        format!("NOMBRE_{s}"),
        format!("APELLIDO_{s}"),
        format!("EMAIL_{s}"),
        format!("EMPRESA_{s}"),
        format!("NOMBRE_{t}"),
        format!("APELLIDO_{t}"),
        format!("EMAIL_{t}"),
        format!("CANTIDAD_{s}"),
        format!("CANTIDAD_{t}"),
        "OBSERVACION".to_string(),
    ];

    let rows = rows
        .iter()
        .map(|r| {
            let src = r.source.clone().unwrap_or_default();
            let tgt = r.target.clone().unwrap_or_default();
            vec![
                r.key.clone(),
                r.label.clone(),
                r.segment.as_deref().map(str::to_uppercase).unwrap_or_default(),
                src.name,
                src.surname,
                src.email,
                src.company,
                tgt.name,
                tgt.surname,
                tgt.email,
                r.source_count.to_string(),
                r.target_count.to_string(),
                r.observation.clone(),
            ]
        })
        .collect();

    ReportSheet {
        sheet_name: sheet_name.to_string(),
        headers,
        rows,
    }
}

/// Coincidences and inconsistencies workbooks, in that order. Rows must
/// already be sorted.
pub fn split_reports(prefix: &str, rows: &[OutcomeRow], labels: &Labels) -> [Artifact; 2] {
    let (matches, rest): (Vec<&OutcomeRow>, Vec<&OutcomeRow>) =
        rows.iter().partition(|r| r.outcome.is_match());
    [
        Artifact::report(
            format!("{prefix}comparacion_coincidencias"),
            report_sheet("Coincidencias", &matches, labels),
        ),
        Artifact::report(
            format!("{prefix}comparacion_inconsistencias"),
            report_sheet("Inconsistencias", &rest, labels),
        ),
    ]
}
