//! Priority signal log: append and scoped active-signal reads.

use chrono::{Duration, Utc};
use rusqlite::params;

use super::{DbError, DbSignal, StackDb};

impl StackDb {
    /// Map a row to DbSignal. Expects columns:
    /// id, workspace_id, project_id, story_id, source, kind, raw_text,
    /// level, confidence, explicit, reasoning, created_at, expires_at
    fn map_signal_row(row: &rusqlite::Row) -> rusqlite::Result<DbSignal> {
        Ok(DbSignal {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            project_id: row.get(2)?,
            story_id: row.get(3)?,
            source: row.get(4)?,
            kind: row.get(5)?,
            raw_text: row.get(6)?,
            level: row.get(7)?,
            confidence: row.get(8)?,
            explicit: row.get::<_, i64>(9)? != 0,
            reasoning: row.get(10)?,
            created_at: row.get(11)?,
            expires_at: row.get(12)?,
        })
    }

    /// Append one classified signal to the log.
    pub fn insert_signal(&self, signal: &DbSignal) -> Result<(), DbError> {
        self.conn_ref().execute(
            "INSERT INTO priority_signals
                (id, workspace_id, project_id, story_id, source, kind, raw_text,
                 level, confidence, explicit, reasoning, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                signal.id,
                signal.workspace_id,
                signal.project_id,
                signal.story_id,
                signal.source,
                signal.kind,
                signal.raw_text,
                signal.level,
                signal.confidence,
                signal.explicit as i64,
                signal.reasoning,
                signal.created_at,
                signal.expires_at,
            ],
        )?;
        Ok(())
    }

    /// Active (non-expired) signals visible to a project: rows scoped to
    /// that project plus workspace-wide rows (NULL project_id). Expiry is
    /// evaluated here at read time; expired rows stay in the table.
    pub fn find_active_signals(
        &self,
        workspace_id: &str,
        project_id: Option<&str>,
    ) -> Result<Vec<DbSignal>, DbError> {
        let now = Utc::now().to_rfc3339();
        let mut stmt = self.conn_ref().prepare(
            "SELECT id, workspace_id, project_id, story_id, source, kind, raw_text,
                    level, confidence, explicit, reasoning, created_at, expires_at
             FROM priority_signals
             WHERE workspace_id = ?1
               AND (project_id IS NULL OR project_id = ?2)
               AND (expires_at IS NULL OR expires_at >= ?3)
             ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map(
            params![workspace_id, project_id, now],
            Self::map_signal_row,
        )?;

        let mut signals = Vec::new();
        for row in rows {
            signals.push(row?);
        }
        Ok(signals)
    }

    /// Count signals created for a project within the trailing `hours`
    /// window. Drives the user-focus ranking factor; workspace-wide rows
    /// are excluded since they say nothing about one project in particular.
    pub fn count_recent_project_signals(
        &self,
        workspace_id: &str,
        project_id: &str,
        hours: i64,
    ) -> Result<i64, DbError> {
        let cutoff = (Utc::now() - Duration::hours(hours)).to_rfc3339();
        let count = self.conn_ref().query_row(
            "SELECT COUNT(*) FROM priority_signals
             WHERE workspace_id = ?1
               AND project_id = ?2
               AND created_at >= ?3",
            params![workspace_id, project_id, cutoff],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
