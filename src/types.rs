//! Shared API-facing types for the classification and ranking surface.

use serde::{Deserialize, Serialize};

use crate::db::DbStory;
use crate::priority::level::PriorityLevel;

/// Where a priority signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    ChatInterface,
    IssueTracker,
    Dashboard,
    Scan,
    Orchestrator,
}

impl SignalSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::ChatInterface => "chat_interface",
            SignalSource::IssueTracker => "issue_tracker",
            SignalSource::Dashboard => "dashboard",
            SignalSource::Scan => "scan",
            SignalSource::Orchestrator => "orchestrator",
        }
    }
}

/// What kind of observation a signal carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    ExplicitPriority,
    EmojiReaction,
    ModelClassified,
    ScanFinding,
    UserMention,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::ExplicitPriority => "explicit_priority",
            SignalKind::EmojiReaction => "emoji_reaction",
            SignalKind::ModelClassified => "model_classified",
            SignalKind::ScanFinding => "scan_finding",
            SignalKind::UserMention => "user_mention",
        }
    }
}

/// Structured side data accompanying a raw signal. Only scan sources
/// populate `severity` today.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalMetadata {
    #[serde(default)]
    pub severity: Option<String>,
}

/// The result of classifying one raw signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub level: PriorityLevel,
    /// Always inside the score band for `level`.
    pub score: i64,
    /// In [0, 1].
    pub confidence: f64,
    /// True only when a hard pattern matched, never for model output.
    pub explicit: bool,
    pub reasoning: String,
}

/// An unclassified signal as submitted by an ingestion path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSignal {
    pub workspace_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub story_id: Option<String>,
    pub source: SignalSource,
    pub kind: SignalKind,
    pub raw_text: String,
    #[serde(default)]
    pub metadata: Option<SignalMetadata>,
}

/// Outcome of ingesting one signal: the stored row id plus how it classified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedSignal {
    pub signal_id: String,
    pub classification: Classification,
}

/// Aggregated priority for one story, derived from its project's active signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPriority {
    pub level: PriorityLevel,
    pub score: i64,
    pub signal_count: usize,
}

impl StoryPriority {
    /// The documented no-signals default: P2 at 50.
    pub fn neutral() -> Self {
        StoryPriority {
            level: PriorityLevel::P2,
            score: 50,
            signal_count: 0,
        }
    }
}

/// The five named ranking factors for one story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankFactors {
    pub priority_signal: i64,
    pub launch_impact: i64,
    pub effort: i64,
    pub age: i64,
    pub user_focus: i64,
}

/// A story enriched with ranking factors and a composite score.
/// Built fresh on every ranking call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStory {
    pub story: DbStory,
    pub factors: RankFactors,
    pub composite_score: i64,
}
