use async_trait::async_trait;
use thiserror::Error;

use metrobot_core::domain::chat::{ChatRole, ChatTurn};
use metrobot_core::domain::order::{Order, OrderData, OrderId};

pub mod memory;
pub mod order;

pub use memory::{InMemoryConversationLog, InMemoryOrderStore};
pub use order::SqlOrderStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Append-only order sink. Ids are 1-indexed, dense, and monotonic per
/// process lifetime; every successful `add` is flushed before it returns.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn add(&self, order: OrderData) -> Result<OrderId, RepositoryError>;
    async fn list_all(&self) -> Result<Vec<Order>, RepositoryError>;
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;
    async fn count(&self) -> Result<i64, RepositoryError>;
}

/// Per-session chat transcript: snapshot at turn start, append user and
/// assistant turns, clear on session reset.
pub trait ConversationLog: Send + Sync {
    fn history(&self, session_id: &str) -> Vec<ChatTurn>;
    fn append(&self, session_id: &str, role: ChatRole, content: &str);
    fn clear(&self, session_id: &str);
}
