//! GraphQL schema for users and todos.

use std::sync::Arc;

use async_graphql::extensions::Tracing;
use async_graphql::{
    Context, EmptyMutation, EmptySubscription, ErrorExtensions, Interface, Object, Result,
    Schema, ID,
};
use tracing::error;

use crate::args::ConnectionArgs;
use crate::config::{PageConfig, SchemaConfig};
use crate::id::{EntityKind, GlobalId};
use crate::loader::UserLoader;
use crate::model::{Entity, Todo, TodoFilter, TodoOrder, User, UserFilter, UserOrder};
use crate::order::{OrderBy, OrderSpec};
use crate::pagination::{paginate, Connection};
use crate::storage::{Repositories, Storage};
use crate::types::Timestamp;
use crate::Error;

pub type TodoSchema = Schema<Query, EmptyMutation, EmptySubscription>;

/// Build the schema over `repos`, applying the limits in `config`.
///
/// Fails with [`Error::Config`] when a page-size policy is invalid. Requests
/// must carry a [`UserLoader`]; see [`crate::server::with_request_data`].
pub fn build_schema(
    repos: Arc<dyn Repositories>,
    config: SchemaConfig,
) -> crate::Result<TodoSchema> {
    config.validate()?;
    Ok(Schema::build(Query, EmptyMutation, EmptySubscription)
        .extension(Tracing)
        .limit_depth(config.max_depth)
        .limit_complexity(config.max_complexity)
        .data(repos)
        .data(config)
        .finish())
}

impl ErrorExtensions for Error {
    fn extend(&self) -> async_graphql::Error {
        if self.is_user_facing() {
            async_graphql::Error::new(self.to_string())
                .extend_with(|_, e| e.set("code", "BAD_USER_INPUT"))
        } else {
            error!(error = %self, "resolver failed");
            async_graphql::Error::new("Internal server error")
                .extend_with(|_, e| e.set("code", "INTERNAL_SERVER_ERROR"))
        }
    }
}

fn gql(err: impl Into<Error>) -> async_graphql::Error {
    let err: Error = err.into();
    err.extend()
}

/// Relay node interface, resolved by global identifier.
#[derive(Interface)]
#[graphql(field(name = "id", ty = "ID"))]
pub enum Node {
    User(User),
    Todo(Todo),
}

async fn fetch_one<E: Entity>(storage: &dyn Storage<E>, key: &str) -> crate::Result<Option<E>> {
    let rows = storage.fetch(&[key.to_string()]).await?;
    Ok(rows.into_iter().next())
}

async fn list<E: Entity>(
    storage: &dyn Storage<E>,
    filter: &E::Filter,
    args: ConnectionArgs,
    order_by: Option<OrderBy<E::Field>>,
    config: &PageConfig,
) -> crate::Result<Connection<E>> {
    let request = args.parse(E::KIND, config)?;
    let order = OrderSpec::resolve(order_by, E::DEFAULT_ORDER);
    paginate(storage, filter, &request, &order).await
}

#[derive(Default)]
pub struct Query;

#[Object]
impl Query {
    /// Fetch any object by its global ID.
    async fn node(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Node>> {
        let id = GlobalId::decode(&id).map_err(gql)?;
        let repos = ctx.data::<Arc<dyn Repositories>>()?;

        let node = match id.kind() {
            EntityKind::User => fetch_one(repos.users(), id.local_key())
                .await
                .map_err(gql)?
                .map(Node::User),
            EntityKind::Todo => fetch_one(repos.todos(), id.local_key())
                .await
                .map_err(gql)?
                .map(Node::Todo),
        };
        Ok(node)
    }

    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<Option<User>> {
        let key = GlobalId::decode_expecting(&id, EntityKind::User).map_err(gql)?;
        let repos = ctx.data::<Arc<dyn Repositories>>()?;
        fetch_one(repos.users(), &key).await.map_err(gql)
    }

    async fn todo(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Todo>> {
        let key = GlobalId::decode_expecting(&id, EntityKind::Todo).map_err(gql)?;
        let repos = ctx.data::<Arc<dyn Repositories>>()?;
        fetch_one(repos.todos(), &key).await.map_err(gql)
    }

    /// Users, newest first unless `orderBy` says otherwise.
    async fn users(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        order_by: Option<UserOrder>,
    ) -> Result<Connection<User>> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;
        let config = ctx.data::<SchemaConfig>()?;
        let args = ConnectionArgs {
            first,
            after,
            last,
            before,
        };
        list(repos.users(), &UserFilter, args, order_by.map(Into::into), &config.users)
            .await
            .map_err(gql)
    }

    /// Todos, most recently updated first unless `orderBy` says otherwise.
    #[allow(clippy::too_many_arguments)]
    async fn todos(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        order_by: Option<TodoOrder>,
        owner: Option<ID>,
    ) -> Result<Connection<Todo>> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;
        let config = ctx.data::<SchemaConfig>()?;
        let filter = TodoFilter {
            owner_key: owner
                .map(|id| GlobalId::decode_expecting(&id, EntityKind::User))
                .transpose()
                .map_err(gql)?,
        };
        let args = ConnectionArgs {
            first,
            after,
            last,
            before,
        };
        list(repos.todos(), &filter, args, order_by.map(Into::into), &config.todos)
            .await
            .map_err(gql)
    }
}

#[Object]
impl User {
    async fn id(&self) -> ID {
        ID::from(&self.global_id())
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn email(&self) -> &str {
        &self.email
    }

    async fn created_at(&self) -> Timestamp {
        self.created_at.into()
    }

    async fn updated_at(&self) -> Timestamp {
        self.updated_at.into()
    }

    /// Todos owned by this user.
    async fn todos(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        order_by: Option<TodoOrder>,
    ) -> Result<Connection<Todo>> {
        let repos = ctx.data::<Arc<dyn Repositories>>()?;
        let config = ctx.data::<SchemaConfig>()?;
        let filter = TodoFilter {
            owner_key: Some(self.key.clone()),
        };
        let args = ConnectionArgs {
            first,
            after,
            last,
            before,
        };
        let connection = list(repos.todos(), &filter, args, order_by.map(Into::into), &config.todos)
            .await
            .map_err(gql)?;

        // every edge's owner is this user
        if let Ok(loader) = ctx.data::<UserLoader>() {
            loader.feed_one(self.key.clone(), self.clone()).await;
        }
        Ok(connection)
    }
}

#[Object]
impl Todo {
    async fn id(&self) -> ID {
        ID::from(&self.global_id())
    }

    async fn title(&self) -> &str {
        &self.title
    }

    async fn completed(&self) -> bool {
        self.completed
    }

    async fn created_at(&self) -> Timestamp {
        self.created_at.into()
    }

    async fn updated_at(&self) -> Timestamp {
        self.updated_at.into()
    }

    async fn owner(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let loader = ctx.data::<UserLoader>()?;
        loader.load_one(self.owner_key.clone()).await.map_err(gql)
    }
}
