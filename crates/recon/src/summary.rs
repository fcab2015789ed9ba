use crate::model::{JobSummary, Outcome, OutcomeRow};

/// Fold outcome counts into the summary. Counters owned by the modes
/// (activations, padded keys, ...) are left as they are.
pub fn tally_outcomes(summary: &mut JobSummary, outcomes: &[OutcomeRow]) {
    for row in outcomes {
        *summary.outcome_counts.entry(row.label.clone()).or_insert(0) += 1;

        match row.outcome {
            Outcome::Match | Outcome::AlreadyActive => summary.matched += 1,
            Outcome::QuantityMismatch => summary.quantity_mismatches += 1,
            Outcome::MissingInTarget | Outcome::NotFound | Outcome::Inactive => {
                summary.missing_in_target += 1
            }
            Outcome::MissingInSource => summary.missing_in_source += 1,
            Outcome::Misclassified => summary.misclassified += 1,
        }
    }
}
