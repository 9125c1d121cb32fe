//! Multi-factor stack ranking of open stories.
//!
//! Five factors per story: the project's aggregated signal score, launch
//! impact, inverted effort, an age boost, and recent user focus. The
//! composite weights must sum to exactly 1.0; that is a structural
//! invariant, not a tunable default.

use crate::db::{DbError, DbStory, StackDb};
use crate::types::{RankFactors, RankedStory};

use super::aggregate;
use super::decay;
use super::launch;

pub const WEIGHT_PRIORITY_SIGNAL: f64 = 0.40;
pub const WEIGHT_LAUNCH_IMPACT: f64 = 0.25;
pub const WEIGHT_EFFORT: f64 = 0.15;
pub const WEIGHT_AGE: f64 = 0.10;
pub const WEIGHT_USER_FOCUS: f64 = 0.10;

/// Trailing window for the user-focus factor.
const FOCUS_WINDOW_HOURS: i64 = 24;

/// Inverted effort: cheaper stories rank higher. Unknown or unrecognized
/// estimates land in the neutral bucket.
pub fn effort_score(effort: Option<&str>) -> i64 {
    match effort.map(|e| e.trim().to_lowercase()).as_deref() {
        Some("low") => 100,
        Some("medium") => 70,
        Some("high") => 40,
        None => 50,
        Some(other) => {
            log::debug!("Unknown effort estimate '{}', using neutral bucket", other);
            50
        }
    }
}

/// Bucketed age boost so long-waiting stories creep upward.
pub fn age_boost(created_at: &str) -> i64 {
    let days = decay::age_hours_from_now(created_at) / 24.0;
    if days < 1.0 {
        0
    } else if days < 7.0 {
        10
    } else if days < 14.0 {
        20
    } else if days < 30.0 {
        30
    } else {
        40
    }
}

/// Recent-focus factor from the count of project signals in the last 24h.
pub fn focus_score(recent_signals: i64) -> i64 {
    match recent_signals {
        0 => 0,
        1 => 50,
        2 => 75,
        _ => 100,
    }
}

/// Weighted composite of the five factors, rounded.
pub fn composite_score(factors: &RankFactors) -> i64 {
    (WEIGHT_PRIORITY_SIGNAL * factors.priority_signal as f64
        + WEIGHT_LAUNCH_IMPACT * factors.launch_impact as f64
        + WEIGHT_EFFORT * factors.effort as f64
        + WEIGHT_AGE * factors.age as f64
        + WEIGHT_USER_FOCUS * factors.user_focus as f64)
        .round() as i64
}

/// Sort descending by composite score; exact ties go to the
/// earlier-created story.
fn sort_ranked(ranked: &mut [RankedStory]) {
    ranked.sort_by(|a, b| {
        b.composite_score
            .cmp(&a.composite_score)
            .then_with(|| a.story.created_at.cmp(&b.story.created_at))
    });
}

fn story_text(story: &DbStory) -> String {
    match &story.description {
        Some(desc) => format!("{} {}", story.title, desc),
        None => story.title.clone(),
    }
}

/// Rank one project's open stories.
///
/// With `signals_enabled == false` the ranker degrades to a sort by each
/// story's already-stored priority score, bypassing signal aggregation
/// entirely. That mode is a documented fallback, not an error path.
pub fn rank_project(
    db: &StackDb,
    project_id: &str,
    workspace_id: &str,
    limit: usize,
    signals_enabled: bool,
) -> Result<Vec<RankedStory>, DbError> {
    let stories = db.list_open_stories(workspace_id, project_id)?;
    if stories.is_empty() {
        return Ok(Vec::new());
    }

    if !signals_enabled {
        let mut ranked: Vec<RankedStory> = stories
            .into_iter()
            .map(|story| {
                let factors = RankFactors {
                    priority_signal: story.priority_score,
                    launch_impact: launch::launch_impact(
                        story.advances_launch_stage,
                        &story_text(&story),
                    ),
                    effort: effort_score(story.effort.as_deref()),
                    age: age_boost(&story.created_at),
                    user_focus: 0,
                };
                RankedStory {
                    composite_score: story.priority_score,
                    factors,
                    story,
                }
            })
            .collect();
        sort_ranked(&mut ranked);
        ranked.truncate(limit);
        return Ok(ranked);
    }

    // Signals are project-scoped, so the aggregated score and the focus
    // count are computed once and shared by every story in the project.
    let project_priority = aggregate::calculate_project_priority(db, workspace_id, project_id)?;
    let recent =
        db.count_recent_project_signals(workspace_id, project_id, FOCUS_WINDOW_HOURS)?;
    let user_focus = focus_score(recent);

    let mut ranked: Vec<RankedStory> = stories
        .into_iter()
        .map(|story| {
            let factors = RankFactors {
                priority_signal: project_priority.score,
                launch_impact: launch::launch_impact(
                    story.advances_launch_stage,
                    &story_text(&story),
                ),
                effort: effort_score(story.effort.as_deref()),
                age: age_boost(&story.created_at),
                user_focus,
            };
            RankedStory {
                composite_score: composite_score(&factors),
                factors,
                story,
            }
        })
        .collect();

    sort_ranked(&mut ranked);
    ranked.truncate(limit);
    Ok(ranked)
}

/// Rank across every project in the workspace: fan out per-project
/// ranking, concatenate, re-sort, truncate. Projects are ranked
/// sequentially; each per-project call is a pure function of the signals
/// it reads, so the merge order does not affect the result.
pub fn rank_global(
    db: &StackDb,
    workspace_id: &str,
    limit: usize,
    signals_enabled: bool,
) -> Result<Vec<RankedStory>, DbError> {
    let mut merged = Vec::new();
    for project_id in db.list_project_ids(workspace_id)? {
        let ranked = rank_project(db, &project_id, workspace_id, limit, signals_enabled)?;
        merged.extend(ranked);
    }
    sort_ranked(&mut merged);
    merged.truncate(limit);
    Ok(merged)
}
