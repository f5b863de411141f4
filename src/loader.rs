//! Request-scoped batch loading
//!
//! Resolving `Todo.owner` for every edge of a page would otherwise cost one
//! storage round trip per todo. The [`DataLoader`] gathers the owner keys a
//! page asks for while it resolves and hands them to [`UserBatch`] in one
//! `fetch`. Its cache lives as long as the request that carries it.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dataloader::{DataLoader, HashMapCache, Loader};
use tracing::debug;

use crate::model::User;
use crate::storage::{by_key, Repositories, StorageError};

/// Fetches users by local key.
pub struct UserBatch {
    repos: Arc<dyn Repositories>,
}

impl UserBatch {
    pub fn new(repos: Arc<dyn Repositories>) -> Self {
        Self { repos }
    }
}

impl Loader<String> for UserBatch {
    type Value = User;
    type Error = StorageError;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, User>, StorageError> {
        debug!(keys = keys.len(), "loading users");
        let rows = self.repos.users().fetch(keys).await?;
        Ok(by_key(rows))
    }
}

pub type UserLoader = DataLoader<UserBatch, HashMapCache>;

/// A caching loader for one request.
pub fn user_loader(repos: Arc<dyn Repositories>) -> UserLoader {
    DataLoader::with_cache(UserBatch::new(repos), tokio::spawn, HashMapCache::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::testing::{counting_store, seeded_store, user};

    #[tokio::test]
    async fn test_user_loader() {
        let store = seeded_store().await;
        let loader = user_loader(store);

        let found = loader.load_one("u2".to_string()).await.unwrap().unwrap();
        assert_eq!(found, user("u2", 10));
        assert_eq!(loader.load_one("nobody".to_string()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_fetch() {
        let store = counting_store().await;
        let loader = user_loader(store.clone());

        let (a, b, c) = tokio::join!(
            loader.load_one("u1".to_string()),
            loader.load_one("u2".to_string()),
            loader.load_one("u1".to_string()),
        );
        assert_eq!(a.unwrap().unwrap().key, "u1");
        assert_eq!(b.unwrap().unwrap().key, "u2");
        assert_eq!(c.unwrap().unwrap().key, "u1");
        assert_eq!(store.user_fetches.load(Ordering::SeqCst), 1);

        // cached for the rest of the request
        loader.load_one("u2".to_string()).await.unwrap();
        assert_eq!(store.user_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fed_values_skip_storage() {
        let store = counting_store().await;
        let loader = user_loader(store.clone());

        loader.feed_one("u1".to_string(), user("u1", 0)).await;
        let found = loader.load_one("u1".to_string()).await.unwrap();
        assert_eq!(found, Some(user("u1", 0)));
        assert_eq!(store.user_fetches.load(Ordering::SeqCst), 0);
    }
}
