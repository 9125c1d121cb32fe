//! Story priority aggregation: decay-weighted average of active signals.

use crate::db::{DbError, DbSignal, StackDb};
use crate::types::StoryPriority;

use super::decay;
use super::level::PriorityLevel;

/// Collapse a set of active signals into one priority.
///
/// Each signal contributes its level's coarse aggregate score, weighted
/// by `decay_weight(age, confidence)`. Unclassified signals (no level
/// yet) are skipped. With nothing to count, the neutral default applies.
pub fn aggregate_signals(signals: &[DbSignal]) -> StoryPriority {
    let mut weight_sum = 0.0;
    let mut weighted_total = 0.0;
    let mut counted = 0usize;

    for signal in signals {
        let Some(level_str) = signal.level.as_deref() else {
            continue;
        };
        let level = PriorityLevel::from_str_lossy(level_str);
        let age = decay::age_hours_from_now(&signal.created_at);
        let weight = decay::decay_weight(age, signal.confidence);
        if weight <= 0.0 {
            continue;
        }

        weighted_total += weight * level.aggregate_score() as f64;
        weight_sum += weight;
        counted += 1;
    }

    if counted == 0 || weight_sum <= 0.0 {
        return StoryPriority::neutral();
    }

    let score = (weighted_total / weight_sum).round() as i64;
    StoryPriority {
        level: PriorityLevel::from_aggregate_score(score),
        score,
        signal_count: counted,
    }
}

/// Aggregate the active signals visible to a project into one priority.
pub fn calculate_project_priority(
    db: &StackDb,
    workspace_id: &str,
    project_id: &str,
) -> Result<StoryPriority, DbError> {
    let signals = db.find_active_signals(workspace_id, Some(project_id))?;
    Ok(aggregate_signals(&signals))
}
