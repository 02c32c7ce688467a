use async_trait::async_trait;
use thiserror::Error;

use tripgenie_core::domain::session::{Session, SessionId};

pub mod memory;
pub mod session;

pub use memory::InMemorySessionRepository;
pub use session::SqlSessionRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Load/save-by-id store for conversation sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError>;
    async fn save(&self, session: Session) -> Result<(), RepositoryError>;
}
