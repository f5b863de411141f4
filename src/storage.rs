//! Storage collaborator contract and an in-memory backend
//!
//! The pagination engine only needs an ordered range scan with an exclusive
//! bound and a count over the same filter. [`MemoryStore`] is the reference
//! implementation used by the schema tests and by embedders that do not
//! bring their own database.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::{Entity, Todo, User};
use crate::order::OrderSpec;

/// Storage errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Bound row `{0}` does not exist")]
    UnknownBound(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Which way a scan walks relative to the requested order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    Forward,
    Backward,
}

/// One ordered range scan.
#[derive(Debug)]
pub struct ScanRequest<'a, E: Entity> {
    pub filter: &'a E::Filter,
    /// Requested logical order, including the tie-break key.
    pub order: &'a OrderSpec<E::Field>,
    pub direction: ScanDirection,
    /// Key of the row the scan starts after (exclusive), in scan order.
    pub bound: Option<&'a str>,
    pub limit: usize,
}

impl<E: Entity> ScanRequest<'_, E> {
    /// Order rows are returned in: the requested order, reversed for
    /// backward scans.
    pub fn scan_order(&self) -> OrderSpec<E::Field> {
        match self.direction {
            ScanDirection::Forward => self.order.clone(),
            ScanDirection::Backward => self.order.reversed(),
        }
    }
}

/// Ordered access to one entity table.
#[async_trait]
pub trait Storage<E: Entity>: Send + Sync {
    /// Rows matching the filter, strictly after the bound in scan order,
    /// at most `limit` of them.
    async fn scan(&self, request: &ScanRequest<'_, E>) -> StorageResult<Vec<E>>;

    /// Number of rows matching the filter, ignoring any bound or limit.
    async fn count(&self, filter: &E::Filter) -> StorageResult<u64>;

    /// Rows with the given keys; missing keys are skipped.
    async fn fetch(&self, keys: &[String]) -> StorageResult<Vec<E>>;
}

/// All tables the GraphQL layer reads from.
pub trait Repositories: Send + Sync {
    fn users(&self) -> &dyn Storage<User>;
    fn todos(&self) -> &dyn Storage<Todo>;
}

/// One table kept in key order.
#[derive(Debug)]
pub struct MemoryTable<E> {
    rows: RwLock<BTreeMap<String, E>>,
}

impl<E: Entity> Default for MemoryTable<E> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<E: Entity> MemoryTable<E> {
    /// Insert or replace a row.
    pub async fn insert(&self, row: E) {
        let mut rows = self.rows.write().await;
        rows.insert(row.key().to_string(), row);
    }

    pub async fn remove(&self, key: &str) -> Option<E> {
        let mut rows = self.rows.write().await;
        rows.remove(key)
    }
}

#[async_trait]
impl<E: Entity> Storage<E> for MemoryTable<E> {
    async fn scan(&self, request: &ScanRequest<'_, E>) -> StorageResult<Vec<E>> {
        let rows = self.rows.read().await;
        let order = request.scan_order();

        let bound = request
            .bound
            .map(|key| {
                rows.get(key)
                    .ok_or_else(|| StorageError::UnknownBound(key.to_string()))
            })
            .transpose()?;

        let mut matched: Vec<&E> = rows
            .values()
            .filter(|row| row.matches(request.filter))
            .filter(|row| bound.map_or(true, |b| order.compare(*row, b) == Ordering::Greater))
            .collect();
        matched.sort_by(|a, b| order.compare(*a, *b));

        Ok(matched.into_iter().take(request.limit).cloned().collect())
    }

    async fn count(&self, filter: &E::Filter) -> StorageResult<u64> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|row| row.matches(filter)).count() as u64)
    }

    async fn fetch(&self, keys: &[String]) -> StorageResult<Vec<E>> {
        let rows = self.rows.read().await;
        Ok(keys.iter().filter_map(|key| rows.get(key).cloned()).collect())
    }
}

/// In-memory users and todos.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub users: MemoryTable<User>,
    pub todos: MemoryTable<Todo>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repositories for MemoryStore {
    fn users(&self) -> &dyn Storage<User> {
        &self.users
    }

    fn todos(&self) -> &dyn Storage<Todo> {
        &self.todos
    }
}

/// Index fetched rows by key.
pub fn by_key<E: Entity>(rows: Vec<E>) -> HashMap<String, E> {
    rows.into_iter()
        .map(|row| (row.key().to_string(), row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TodoFilter, TodoOrderField};
    use crate::order::{Direction, OrderBy};
    use crate::testing::{at, todo, user};

    fn created_asc() -> OrderSpec<TodoOrderField> {
        OrderSpec::resolve(
            Some(OrderBy {
                field: Some(TodoOrderField::CreatedAt),
                direction: Some(Direction::Asc),
            }),
            Todo::DEFAULT_ORDER,
        )
    }

    async fn table() -> MemoryTable<Todo> {
        let table = MemoryTable::default();
        let owner = user("u1", 0);
        for (key, minute) in [("c", 3), ("a", 1), ("b", 2), ("b2", 2)] {
            table.insert(todo(key, &owner, minute)).await;
        }
        table
    }

    fn keys(rows: &[Todo]) -> Vec<&str> {
        rows.iter().map(|row| row.key.as_str()).collect()
    }

    #[tokio::test]
    async fn test_scan_orders_and_limits() {
        let table = table().await;
        let order = created_asc();
        let filter = TodoFilter::default();

        let rows = table
            .scan(&ScanRequest {
                filter: &filter,
                order: &order,
                direction: ScanDirection::Forward,
                bound: None,
                limit: 3,
            })
            .await
            .unwrap();
        assert_eq!(keys(&rows), ["a", "b", "b2"]);
    }

    #[tokio::test]
    async fn test_backward_scan_with_bound() {
        let table = table().await;
        let order = created_asc();
        let filter = TodoFilter::default();

        let rows = table
            .scan(&ScanRequest {
                filter: &filter,
                order: &order,
                direction: ScanDirection::Backward,
                bound: Some("c"),
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(keys(&rows), ["b2", "b", "a"]);
    }

    #[test]
    fn test_unknown_bound() {
        tokio_test::block_on(async {
            let table = table().await;
            let order = created_asc();
            let filter = TodoFilter::default();

            let err = table
                .scan(&ScanRequest {
                    filter: &filter,
                    order: &order,
                    direction: ScanDirection::Forward,
                    bound: Some("missing"),
                    limit: 1,
                })
                .await
                .unwrap_err();
            assert_eq!(err, StorageError::UnknownBound("missing".to_string()));
        });
    }

    #[test]
    fn test_count_and_fetch() {
        tokio_test::block_on(async {
            let table = table().await;
            assert_eq!(table.count(&TodoFilter::default()).await.unwrap(), 4);
            assert_eq!(
                table
                    .count(&TodoFilter {
                        owner_key: Some("nobody".to_string()),
                    })
                    .await
                    .unwrap(),
                0
            );

            let fetched = table
                .fetch(&["b".to_string(), "zz".to_string(), "a".to_string()])
                .await
                .unwrap();
            let indexed = by_key(fetched);
            assert_eq!(indexed.len(), 2);
            assert_eq!(indexed["a"].created_at, at(1));

            table.remove("a").await;
            assert_eq!(table.count(&TodoFilter::default()).await.unwrap(), 3);
        });
    }
}
