//! Priorities service: the operations exposed to ingestion paths, the
//! issue-tracker webhook handler, and the dashboard/API layer.
//!
//! Everything here is request/response. Triggering classification,
//! aggregation, or ranking is the caller's responsibility; there is no
//! background scheduling in this crate.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::db::{DbError, DbSignal, StackDb};
use crate::priority::classifier::SignalClassifier;
use crate::priority::{aggregate, launch, ranker};
use crate::types::{
    Classification, NewSignal, ProcessedSignal, RankedStory, SignalMetadata, SignalSource,
    StoryPriority,
};

/// Expiry for ambient signals.
const AMBIENT_SIGNAL_TTL_HOURS: i64 = 72;
/// Expiry for an explicit manual override tied to one story.
const EXPLICIT_STORY_TTL_DAYS: i64 = 7;

/// Classify a raw signal and append it to the signal log.
///
/// Expiry policy: explicit overrides tied to a story live 7 days, all
/// other signals 72 hours.
pub async fn process_priority_signal(
    db: &StackDb,
    classifier: &SignalClassifier,
    signal: NewSignal,
) -> Result<ProcessedSignal, DbError> {
    let classification = classifier
        .classify(&signal.raw_text, signal.source, signal.metadata.as_ref())
        .await;

    let now = Utc::now();
    let ttl = if classification.explicit && signal.story_id.is_some() {
        Duration::days(EXPLICIT_STORY_TTL_DAYS)
    } else {
        Duration::hours(AMBIENT_SIGNAL_TTL_HOURS)
    };

    let row = DbSignal {
        id: format!("sig-{}", Uuid::new_v4()),
        workspace_id: signal.workspace_id,
        project_id: signal.project_id,
        story_id: signal.story_id,
        source: signal.source.as_str().to_string(),
        kind: signal.kind.as_str().to_string(),
        raw_text: signal.raw_text,
        level: Some(classification.level.as_str().to_string()),
        confidence: classification.confidence,
        explicit: classification.explicit,
        reasoning: Some(classification.reasoning.clone()),
        created_at: now.to_rfc3339(),
        expires_at: Some((now + ttl).to_rfc3339()),
    };
    db.insert_signal(&row)?;

    log::info!(
        "Processed priority signal {} ({} -> {} @ {:.2})",
        row.id,
        row.source,
        classification.level,
        classification.confidence
    );

    Ok(ProcessedSignal {
        signal_id: row.id,
        classification,
    })
}

/// Classification only, no persistence. Used by preview surfaces.
pub async fn classify_priority_signal(
    classifier: &SignalClassifier,
    text: &str,
    source: SignalSource,
    metadata: Option<&SignalMetadata>,
) -> Classification {
    classifier.classify(text, source, metadata).await
}

/// Aggregate the active signals visible to a story's project into one
/// priority. The story id scopes logging only; signals attach to
/// projects, not stories, on this path.
pub fn calculate_story_priority(
    db: &StackDb,
    story_id: &str,
    workspace_id: &str,
    project_id: &str,
) -> Result<StoryPriority, DbError> {
    let priority = aggregate::calculate_project_priority(db, workspace_id, project_id)?;
    log::debug!(
        "Story {}: {} active signals -> {} ({})",
        story_id,
        priority.signal_count,
        priority.level,
        priority.score
    );
    Ok(priority)
}

/// Recompute a story's priority from current signals and write it back.
///
/// Last-writer-wins: no version check or lock. Concurrent updates can
/// interleave, but recomputation is idempotent and converges on re-run.
pub fn update_story_priority(
    db: &StackDb,
    story_id: &str,
    workspace_id: &str,
    project_id: &str,
) -> Result<StoryPriority, DbError> {
    let priority = calculate_story_priority(db, story_id, workspace_id, project_id)?;
    db.update_story_priority(story_id, priority.level.as_str(), priority.score)?;
    Ok(priority)
}

/// Stack-rank one project's open stories, highest composite first.
pub fn get_stack_ranked_stories_by_project(
    db: &StackDb,
    project_id: &str,
    workspace_id: &str,
    limit: usize,
    signals_enabled: bool,
) -> Result<Vec<RankedStory>, DbError> {
    ranker::rank_project(db, project_id, workspace_id, limit, signals_enabled)
}

/// Stack-rank open stories across every project in the workspace.
pub fn get_stack_ranked_stories_global(
    db: &StackDb,
    workspace_id: &str,
    limit: usize,
    signals_enabled: bool,
) -> Result<Vec<RankedStory>, DbError> {
    ranker::rank_global(db, workspace_id, limit, signals_enabled)
}

/// Derive the advances-launch-stage flag from story text.
pub fn compute_advances_launch_stage(title: &str, description: Option<&str>) -> bool {
    launch::advances_launch_stage(title, description)
}

/// Re-derive the advances flag for all open stories in a project.
pub fn refresh_launch_flags(
    db: &StackDb,
    workspace_id: &str,
    project_id: &str,
) -> Result<usize, DbError> {
    launch::refresh_launch_flags(db, workspace_id, project_id)
}
