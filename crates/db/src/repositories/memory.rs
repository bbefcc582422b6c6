use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use metrobot_core::domain::chat::{ChatRole, ChatTurn};
use metrobot_core::domain::order::{Order, OrderData, OrderId};

use super::{ConversationLog, OrderStore, RepositoryError};

#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<Vec<Order>>,
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn add(&self, order: OrderData) -> Result<OrderId, RepositoryError> {
        let mut orders = lock(&self.orders);
        let id = OrderId(orders.len() as i64 + 1);
        orders.push(Order { id, data: order, created_at: Utc::now() });
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(lock(&self.orders).clone())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = lock(&self.orders);
        if id.0 < 1 || id.0 > orders.len() as i64 {
            return Ok(None);
        }
        Ok(Some(orders[(id.0 - 1) as usize].clone()))
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(lock(&self.orders).len() as i64)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryConversationLog {
    transcripts: Mutex<HashMap<String, Vec<ChatTurn>>>,
}

impl ConversationLog for InMemoryConversationLog {
    fn history(&self, session_id: &str) -> Vec<ChatTurn> {
        lock(&self.transcripts).get(session_id).cloned().unwrap_or_default()
    }

    fn append(&self, session_id: &str, role: ChatRole, content: &str) {
        lock(&self.transcripts)
            .entry(session_id.to_string())
            .or_default()
            .push(ChatTurn::new(role, content));
    }

    fn clear(&self, session_id: &str) {
        lock(&self.transcripts).remove(session_id);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use metrobot_core::domain::chat::ChatRole;
    use metrobot_core::domain::order::{OrderData, OrderId};

    use super::{InMemoryConversationLog, InMemoryOrderStore};
    use crate::repositories::{ConversationLog, OrderStore};

    fn order_fixture(name: &str) -> OrderData {
        OrderData {
            full_name: name.to_string(),
            email: "alice@example.com".to_string(),
            phone: "555-123-4567".to_string(),
            address: "12345 Main Street".to_string(),
            product_interest: "The Cloud Sofa".to_string(),
            quantity: 1,
        }
    }

    #[tokio::test]
    async fn add_assigns_ids_one_to_n_in_call_order() {
        let store = InMemoryOrderStore::default();

        for expected in 1..=5 {
            let id = store.add(order_fixture("Alice Carter")).await.expect("add order");
            assert_eq!(id, OrderId(expected));
        }
    }

    #[tokio::test]
    async fn listing_returns_a_defensive_copy() {
        let store = InMemoryOrderStore::default();
        store.add(order_fixture("Alice Carter")).await.expect("add order");

        let mut listed = store.list_all().await.expect("list");
        listed.clear();

        assert_eq!(store.count().await.expect("count"), 1);
        assert_eq!(store.list_all().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn lookup_is_one_indexed_with_none_outside_range() {
        let store = InMemoryOrderStore::default();
        store.add(order_fixture("First Customer")).await.expect("add order");
        store.add(order_fixture("Second Customer")).await.expect("add order");

        let second =
            store.find_by_id(OrderId(2)).await.expect("lookup").expect("order 2 should exist");
        assert_eq!(second.data.full_name, "Second Customer");

        assert!(store.find_by_id(OrderId(0)).await.expect("lookup").is_none());
        assert!(store.find_by_id(OrderId(3)).await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn concurrent_adds_never_duplicate_or_skip_ids() {
        let store = Arc::new(InMemoryOrderStore::default());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.add(order_fixture("Concurrent Customer")).await.expect("add order")
            }));
        }

        let mut ids = BTreeSet::new();
        for handle in handles {
            ids.insert(handle.await.expect("task").0);
        }

        assert_eq!(ids.len(), 16);
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&16));
    }

    #[test]
    fn transcript_appends_in_order_and_clears_per_session() {
        let log = InMemoryConversationLog::default();
        log.append("s-1", ChatRole::User, "hello");
        log.append("s-1", ChatRole::Assistant, "hi there");
        log.append("s-2", ChatRole::User, "other session");

        let history = log.history("s-1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[1].content, "hi there");

        log.clear("s-1");
        assert!(log.history("s-1").is_empty());
        assert_eq!(log.history("s-2").len(), 1);
    }
}
