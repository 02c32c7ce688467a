use sqlx::Row;

use tripgenie_core::domain::session::{Session, SessionId};

use super::{RepositoryError, SessionRepository};
use crate::DbPool;

/// Stores each session as a JSON document keyed by id.
pub struct SqlSessionRepository {
    pool: DbPool,
}

impl SqlSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_document(row: &sqlx::sqlite::SqliteRow) -> Result<Session, RepositoryError> {
    let document: String =
        row.try_get("document").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    serde_json::from_str(&document).map_err(|e| RepositoryError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl SessionRepository for SqlSessionRepository {
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query("SELECT document FROM trip_session WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(decode_document(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, session: Session) -> Result<(), RepositoryError> {
        let document =
            serde_json::to_string(&session).map_err(|e| RepositoryError::Decode(e.to_string()))?;

        sqlx::query(
            "INSERT INTO trip_session (id, phase, document, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 phase = excluded.phase,
                 document = excluded.document,
                 updated_at = excluded.updated_at",
        )
        .bind(&session.id.0)
        .bind(session.phase.as_str())
        .bind(&document)
        .bind(session.created_at.to_rfc3339())
        .bind(session.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
