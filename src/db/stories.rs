//! Story reads and priority writes.
//!
//! Status transitions belong to the execution layer; this crate only
//! touches the priority fields and the launch-stage flag.

use chrono::Utc;
use rusqlite::params;

use super::{DbError, DbStory, StackDb};

/// Statuses that keep a story out of the ranked backlog.
const CLOSED_STATUSES: &[&str] = &["completed", "rejected"];

impl StackDb {
    /// Map a row to DbStory. Expects columns:
    /// id, workspace_id, project_id, title, description, status,
    /// priority_level, priority_score, advances_launch_stage, effort,
    /// external_ref, created_at, updated_at
    fn map_story_row(row: &rusqlite::Row) -> rusqlite::Result<DbStory> {
        Ok(DbStory {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            project_id: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            status: row.get(5)?,
            priority_level: row.get(6)?,
            priority_score: row.get(7)?,
            advances_launch_stage: row.get::<_, i64>(8)? != 0,
            effort: row.get(9)?,
            external_ref: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    /// Insert a story row.
    pub fn insert_story(&self, story: &DbStory) -> Result<(), DbError> {
        self.conn_ref().execute(
            "INSERT INTO stories
                (id, workspace_id, project_id, title, description, status,
                 priority_level, priority_score, advances_launch_stage, effort,
                 external_ref, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                story.id,
                story.workspace_id,
                story.project_id,
                story.title,
                story.description,
                story.status,
                story.priority_level,
                story.priority_score,
                story.advances_launch_stage as i64,
                story.effort,
                story.external_ref,
                story.created_at,
                story.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Fetch a story by id.
    pub fn get_story(&self, id: &str) -> Result<Option<DbStory>, DbError> {
        match self.conn_ref().query_row(
            "SELECT id, workspace_id, project_id, title, description, status,
                    priority_level, priority_score, advances_launch_stage, effort,
                    external_ref, created_at, updated_at
             FROM stories WHERE id = ?1",
            params![id],
            Self::map_story_row,
        ) {
            Ok(story) => Ok(Some(story)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::Sqlite(e)),
        }
    }

    /// Write a recomputed priority onto a story. Last writer wins; the
    /// aggregation is idempotent so concurrent writers converge on re-run.
    pub fn update_story_priority(
        &self,
        id: &str,
        level: &str,
        score: i64,
    ) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn_ref().execute(
            "UPDATE stories
             SET priority_level = ?1, priority_score = ?2, updated_at = ?3
             WHERE id = ?4",
            params![level, score, now, id],
        )?;
        if changed == 0 {
            return Err(DbError::StoryNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Write a re-derived launch-stage flag.
    pub fn set_advances_launch_stage(&self, id: &str, advances: bool) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339();
        self.conn_ref().execute(
            "UPDATE stories
             SET advances_launch_stage = ?1, updated_at = ?2
             WHERE id = ?3",
            params![advances as i64, now, id],
        )?;
        Ok(())
    }

    /// Open stories for one project, oldest first (insertion order backs
    /// the ranking tie-break).
    pub fn list_open_stories(
        &self,
        workspace_id: &str,
        project_id: &str,
    ) -> Result<Vec<DbStory>, DbError> {
        let mut stmt = self.conn_ref().prepare(
            "SELECT id, workspace_id, project_id, title, description, status,
                    priority_level, priority_score, advances_launch_stage, effort,
                    external_ref, created_at, updated_at
             FROM stories
             WHERE workspace_id = ?1
               AND project_id = ?2
               AND status NOT IN (?3, ?4)
             ORDER BY created_at ASC",
        )?;

        let rows = stmt.query_map(
            params![workspace_id, project_id, CLOSED_STATUSES[0], CLOSED_STATUSES[1]],
            Self::map_story_row,
        )?;

        let mut stories = Vec::new();
        for row in rows {
            stories.push(row?);
        }
        Ok(stories)
    }

    /// Distinct project ids with at least one open story in the workspace.
    pub fn list_project_ids(&self, workspace_id: &str) -> Result<Vec<String>, DbError> {
        let mut stmt = self.conn_ref().prepare(
            "SELECT DISTINCT project_id FROM stories
             WHERE workspace_id = ?1
               AND status NOT IN (?2, ?3)
             ORDER BY project_id",
        )?;

        let rows = stmt.query_map(
            params![workspace_id, CLOSED_STATUSES[0], CLOSED_STATUSES[1]],
            |row| row.get::<_, String>(0),
        )?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;

    pub(crate) fn story(id: &str, project: &str, status: &str) -> DbStory {
        let now = Utc::now().to_rfc3339();
        DbStory {
            id: id.to_string(),
            workspace_id: "ws1".to_string(),
            project_id: project.to_string(),
            title: format!("story {id}"),
            description: None,
            status: status.to_string(),
            priority_level: "P2".to_string(),
            priority_score: 50,
            advances_launch_stage: false,
            effort: None,
            external_ref: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    #[test]
    fn open_stories_exclude_closed_statuses() {
        let db = test_db();
        db.insert_story(&story("a", "p1", "pending")).unwrap();
        db.insert_story(&story("b", "p1", "in_progress")).unwrap();
        db.insert_story(&story("c", "p1", "completed")).unwrap();
        db.insert_story(&story("d", "p1", "rejected")).unwrap();

        let open = db.list_open_stories("ws1", "p1").unwrap();
        let ids: Vec<&str> = open.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn priority_update_writes_level_and_score() {
        let db = test_db();
        db.insert_story(&story("a", "p1", "pending")).unwrap();
        db.update_story_priority("a", "P0", 95).unwrap();

        let updated = db.get_story("a").unwrap().unwrap();
        assert_eq!(updated.priority_level, "P0");
        assert_eq!(updated.priority_score, 95);
    }

    #[test]
    fn priority_update_on_missing_story_errors() {
        let db = test_db();
        let err = db.update_story_priority("ghost", "P1", 75).unwrap_err();
        assert!(matches!(err, DbError::StoryNotFound(_)));
    }

    #[test]
    fn project_ids_are_distinct_and_open_only() {
        let db = test_db();
        db.insert_story(&story("a", "p1", "pending")).unwrap();
        db.insert_story(&story("b", "p1", "pending")).unwrap();
        db.insert_story(&story("c", "p2", "in_progress")).unwrap();
        db.insert_story(&story("d", "p3", "completed")).unwrap();

        let ids = db.list_project_ids("ws1").unwrap();
        assert_eq!(ids, vec!["p1", "p2"]);
    }
}
