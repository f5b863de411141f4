//! Fixtures shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::model::{Todo, User, UserFilter};
use crate::storage::{MemoryStore, Repositories, ScanRequest, Storage, StorageResult};

/// A fixed instant, `minute` minutes after the fixture epoch.
pub fn at(minute: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + minute * 60, 0).unwrap()
}

pub fn user(key: &str, minute: i64) -> User {
    User {
        key: key.to_string(),
        name: format!("user {key}"),
        email: format!("{key}@example.com"),
        created_at: at(minute),
        updated_at: at(minute),
    }
}

pub fn todo(key: &str, owner: &User, minute: i64) -> Todo {
    Todo {
        key: key.to_string(),
        owner_key: owner.key.clone(),
        title: format!("todo {key}"),
        completed: false,
        created_at: at(minute),
        updated_at: at(minute),
    }
}

/// Two users; `u1` owns `t1`..`t3` created at minutes 1..3, `u2` owns `t4`.
async fn seed(store: &MemoryStore) {
    let u1 = user("u1", 0);
    let u2 = user("u2", 10);
    for (key, minute) in [("t1", 1), ("t2", 2), ("t3", 3)] {
        store.todos.insert(todo(key, &u1, minute)).await;
    }
    store.todos.insert(todo("t4", &u2, 4)).await;
    store.users.insert(u1).await;
    store.users.insert(u2).await;
}

pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    seed(&store).await;
    Arc::new(store)
}

/// The seeded store, counting user `fetch` calls. Each fetch yields once
/// before answering, like a round trip would.
#[derive(Default)]
pub struct CountingStore {
    store: MemoryStore,
    pub user_fetches: AtomicUsize,
}

pub async fn counting_store() -> Arc<CountingStore> {
    let counting = CountingStore::default();
    seed(&counting.store).await;
    Arc::new(counting)
}

#[async_trait]
impl Storage<User> for CountingStore {
    async fn scan(&self, request: &ScanRequest<'_, User>) -> StorageResult<Vec<User>> {
        self.store.users.scan(request).await
    }

    async fn count(&self, filter: &UserFilter) -> StorageResult<u64> {
        self.store.users.count(filter).await
    }

    async fn fetch(&self, keys: &[String]) -> StorageResult<Vec<User>> {
        self.user_fetches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.store.users.fetch(keys).await
    }
}

impl Repositories for CountingStore {
    fn users(&self) -> &dyn Storage<User> {
        self
    }

    fn todos(&self) -> &dyn Storage<Todo> {
        &self.store.todos
    }
}
