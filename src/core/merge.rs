//! Field-by-field precedence between the keyed provider and the public layers.

use crate::domain::model::{ControlType, FieldSource, FieldSources, PlanningSummary};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub summary: PlanningSummary,
    pub sources: FieldSources,
}

/// Primary value wins when present, fallback fills the gaps, otherwise null.
pub fn merge(
    primary: Option<&PlanningSummary>,
    fallback: Option<&PlanningSummary>,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for control in ControlType::ALL {
        let from_primary = primary.and_then(|summary| summary.get(control));
        let from_fallback = fallback.and_then(|summary| summary.get(control));

        let (value, source) = match (from_primary, from_fallback) {
            (Some(value), _) => (Some(value.clone()), Some(FieldSource::Primary)),
            (None, Some(value)) => (Some(value.clone()), Some(FieldSource::Fallback)),
            (None, None) => (None, None),
        };

        outcome.summary.set(control, value);
        outcome.sources.set(control, source);
    }

    outcome
}

/// Fallback is skipped exactly when a credential is configured and the
/// primary produced at least one of the three controls.
pub fn needs_fallback(credential_configured: bool, primary: Option<&PlanningSummary>) -> bool {
    if !credential_configured {
        return true;
    }
    primary.map_or(true, PlanningSummary::is_empty)
}
