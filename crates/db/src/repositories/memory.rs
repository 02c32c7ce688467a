use std::collections::HashMap;

use tokio::sync::RwLock;

use tripgenie_core::domain::session::{Session, SessionId};

use super::{RepositoryError, SessionRepository};

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionRepository {
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait::async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&id.0).cloned())
    }

    async fn save(&self, session: Session) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.0.clone(), session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use tripgenie_core::domain::session::{Session, SessionId};

    use crate::repositories::{InMemorySessionRepository, SessionRepository};

    #[tokio::test]
    async fn in_memory_session_repo_round_trip() {
        let repo = InMemorySessionRepository::default();
        let mut session = Session::new(SessionId("trip-1".to_string()), Utc::now());
        session.slots.origin = Some("Delhi".to_string());

        repo.save(session.clone()).await.expect("save session");
        let found = repo.find_by_id(&session.id).await.expect("find session");

        assert_eq!(found, Some(session));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn missing_session_is_none() {
        let repo = InMemorySessionRepository::default();
        let found = repo.find_by_id(&SessionId("unknown".to_string())).await.expect("lookup");
        assert!(found.is_none());
    }
}
