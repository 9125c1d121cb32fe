//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("Story not found: {0}")]
    StoryNotFound(String),
}

/// A row from the `priority_signals` table. Immutable after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSignal {
    pub id: String,
    pub workspace_id: String,
    /// None means the signal applies workspace-wide.
    pub project_id: Option<String>,
    /// Set when the signal targets one specific story.
    pub story_id: Option<String>,
    pub source: String,
    pub kind: String,
    pub raw_text: String,
    /// None until classified.
    pub level: Option<String>,
    pub confidence: f64,
    /// True only when a hard pattern matched.
    pub explicit: bool,
    pub reasoning: Option<String>,
    pub created_at: String,
    /// None means the signal never expires.
    pub expires_at: Option<String>,
}

/// A row from the `stories` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStory {
    pub id: String,
    pub workspace_id: String,
    pub project_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority_level: String,
    pub priority_score: i64,
    pub advances_launch_stage: bool,
    /// low / medium / high; None means unestimated.
    pub effort: Option<String>,
    /// Opaque external issue linkage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
