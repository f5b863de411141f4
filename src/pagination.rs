//! Relay-style cursor pagination

use std::borrow::Cow;

use async_graphql::{Object, OutputType, TypeName, ID};
use tracing::debug;

use crate::args::PageRequest;
use crate::id::GlobalId;
use crate::model::Entity;
use crate::order::OrderSpec;
use crate::storage::{ScanDirection, ScanRequest, Storage, StorageError};
use crate::Error;

/// Page information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<GlobalId>,
    pub end_cursor: Option<GlobalId>,
}

#[Object]
impl PageInfo {
    async fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    async fn has_previous_page(&self) -> bool {
        self.has_previous_page
    }

    async fn start_cursor(&self) -> Option<ID> {
        self.start_cursor.as_ref().map(ID::from)
    }

    async fn end_cursor(&self) -> Option<ID> {
        self.end_cursor.as_ref().map(ID::from)
    }
}

/// Edge in a connection
#[derive(Debug, Clone)]
pub struct Edge<T> {
    pub cursor: GlobalId,
    pub node: T,
}

impl<T: OutputType> TypeName for Edge<T> {
    fn type_name() -> Cow<'static, str> {
        format!("{}Edge", <T as OutputType>::type_name()).into()
    }
}

#[Object(name_type)]
impl<T: OutputType> Edge<T> {
    async fn cursor(&self) -> ID {
        ID::from(&self.cursor)
    }

    async fn node(&self) -> &T {
        &self.node
    }
}

/// Connection (paginated result)
#[derive(Debug, Clone)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
    pub total_count: u64,
}

impl<T: OutputType> TypeName for Connection<T> {
    fn type_name() -> Cow<'static, str> {
        format!("{}Connection", <T as OutputType>::type_name()).into()
    }
}

#[Object(name_type)]
impl<T: OutputType> Connection<T> {
    async fn edges(&self) -> &[Edge<T>] {
        &self.edges
    }

    async fn page_info(&self) -> &PageInfo {
        &self.page_info
    }

    /// Rows matching the query, regardless of the page window.
    async fn total_count(&self) -> u64 {
        self.total_count
    }
}

impl<T> Connection<T> {
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }
}

/// Fetch one page of `E` rows.
///
/// Issues a single range scan of `limit + 1` rows (the extra row only tells
/// whether the scan direction has more) and a count over the same filter,
/// concurrently. Backward pages are scanned in reverse and flipped back, so
/// edges always follow `order`.
///
/// The flag facing away from the scan direction is set whenever a cursor
/// was supplied; storage is not asked whether rows still exist there.
///
/// A cursor whose row is gone is the client's mistake and comes back as
/// [`Error::InvalidInput`]; every other storage failure is
/// [`Error::Internal`].
pub async fn paginate<E, S>(
    storage: &S,
    filter: &E::Filter,
    request: &PageRequest,
    order: &OrderSpec<E::Field>,
) -> crate::Result<Connection<E>>
where
    E: Entity,
    S: Storage<E> + ?Sized,
{
    let limit = request.limit();
    let direction = if request.is_forward() {
        ScanDirection::Forward
    } else {
        ScanDirection::Backward
    };

    let scan = ScanRequest {
        filter,
        order,
        direction,
        bound: request.cursor().map(GlobalId::local_key),
        limit: limit + 1,
    };

    let (mut rows, total_count) = tokio::try_join!(storage.scan(&scan), storage.count(filter))
        .map_err(|err| match err {
            StorageError::UnknownBound(key) => Error::InvalidInput(format!(
                "cursor `{}` does not refer to an existing {}",
                GlobalId::encode(E::KIND, &key),
                E::KIND
            )),
            other => other.into(),
        })?;

    let has_more = rows.len() > limit;
    rows.truncate(limit);
    if direction == ScanDirection::Backward {
        rows.reverse();
    }

    let has_cursor = request.cursor().is_some();
    let (has_next_page, has_previous_page) = match direction {
        ScanDirection::Forward => (has_more, has_cursor),
        ScanDirection::Backward => (has_cursor, has_more),
    };

    let edges: Vec<Edge<E>> = rows
        .into_iter()
        .map(|node| Edge {
            cursor: node.global_id(),
            node,
        })
        .collect();

    debug!(
        kind = %E::KIND,
        ?direction,
        limit,
        returned = edges.len(),
        total_count,
        "paginated"
    );

    let start_cursor = edges.first().map(|e| e.cursor.clone());
    let end_cursor = edges.last().map(|e| e.cursor.clone());

    Ok(Connection {
        edges,
        page_info: PageInfo {
            has_next_page,
            has_previous_page,
            start_cursor,
            end_cursor,
        },
        total_count,
    })
}
