//! HTTP entry point for the GraphQL schema
//!
//! Provides:
//! - Request-scoped data injection (the per-request [`UserLoader`](crate::loader::UserLoader))
//! - A standard Axum handler for `POST /graphql`
//! - A router and a `serve` loop for standalone use

use std::sync::Arc;

use async_graphql::{Request, Response};
use axum::{extract::Extension, routing::post, Json, Router};
use tokio::net::TcpListener;
use tracing::info;

use crate::loader::user_loader;
use crate::schema::TodoSchema;
use crate::storage::Repositories;

/// Attach the data every request needs that must not outlive it.
pub fn with_request_data(request: Request, repos: Arc<dyn Repositories>) -> Request {
    request.data(user_loader(repos))
}

/// Standard GraphQL handler
///
/// # Example
///
/// ```rust,no_run
/// use axum::{Extension, Router, routing::post};
/// use relay_connections::server::graphql_handler;
/// # use std::sync::Arc;
/// # use relay_connections::{build_schema, MemoryStore, Repositories, SchemaConfig};
///
/// # fn example() -> relay_connections::Result<()> {
/// let repos: Arc<dyn Repositories> = Arc::new(MemoryStore::new());
/// let schema = build_schema(repos.clone(), SchemaConfig::default())?;
/// let app: Router = Router::new()
///     .route("/graphql", post(graphql_handler))
///     .layer(Extension(schema))
///     .layer(Extension(repos));
/// # Ok(())
/// # }
/// ```
pub async fn graphql_handler(
    Extension(schema): Extension<TodoSchema>,
    Extension(repos): Extension<Arc<dyn Repositories>>,
    req: Json<Request>,
) -> Json<Response> {
    let request = with_request_data(req.0, repos);
    let response = schema.execute(request).await;
    Json(response)
}

pub fn router(schema: TodoSchema, repos: Arc<dyn Repositories>) -> Router {
    Router::new()
        .route("/graphql", post(graphql_handler))
        .layer(Extension(schema))
        .layer(Extension(repos))
}

/// Serve the schema on an already bound listener until the process stops.
pub async fn serve(
    listener: TcpListener,
    schema: TodoSchema,
    repos: Arc<dyn Repositories>,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "GraphQL server listening");
    axum::serve(listener, router(schema, repos)).await
}
