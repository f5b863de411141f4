//! Users and the todos they own

use async_graphql::{Enum, InputObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::{EntityKind, GlobalId};
use crate::order::{Direction, OrderBy, OrderTerm, SortField, SortValue, Sortable};

/// A row that can be listed through a connection and addressed by a
/// global identifier.
pub trait Entity: Sortable + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Order used when the client does not ask for one.
    const DEFAULT_ORDER: OrderTerm<Self::Field>;

    /// Row predicate for list queries.
    type Filter: std::fmt::Debug + Default + Send + Sync;

    /// Storage-local primary key.
    fn key(&self) -> &str;

    fn matches(&self, filter: &Self::Filter) -> bool;

    fn global_id(&self) -> GlobalId {
        GlobalId::encode(Self::KIND, self.key())
    }
}

fn new_key() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub key: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            key: new_key(),
            name: name.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOrderField {
    CreatedAt,
    UpdatedAt,
    Name,
    Id,
}

impl SortField for UserOrderField {
    const PRIMARY_KEY: Self = UserOrderField::Id;
}

/// Ordering argument of `users`
#[derive(InputObject, Debug, Clone, Copy, Default)]
pub struct UserOrder {
    pub field: Option<UserOrderField>,
    pub direction: Option<Direction>,
}

impl From<UserOrder> for OrderBy<UserOrderField> {
    fn from(order: UserOrder) -> Self {
        OrderBy {
            field: order.field,
            direction: order.direction,
        }
    }
}

/// Users are listed unfiltered.
#[derive(Debug, Clone, Default)]
pub struct UserFilter;

impl Sortable for User {
    type Field = UserOrderField;

    fn sort_value(&self, field: UserOrderField) -> SortValue<'_> {
        match field {
            UserOrderField::CreatedAt => SortValue::Time(self.created_at),
            UserOrderField::UpdatedAt => SortValue::Time(self.updated_at),
            UserOrderField::Name => SortValue::Text(&self.name),
            UserOrderField::Id => SortValue::Text(&self.key),
        }
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    const DEFAULT_ORDER: OrderTerm<UserOrderField> =
        OrderTerm::new(UserOrderField::CreatedAt, Direction::Desc);

    type Filter = UserFilter;

    fn key(&self) -> &str {
        &self.key
    }

    fn matches(&self, _filter: &UserFilter) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub key: String,
    pub owner_key: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(owner: &User, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            key: new_key(),
            owner_key: owner.key.clone(),
            title: title.into(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoOrderField {
    CreatedAt,
    UpdatedAt,
    Title,
    Completed,
    Id,
}

impl SortField for TodoOrderField {
    const PRIMARY_KEY: Self = TodoOrderField::Id;
}

/// Ordering argument of `todos`
#[derive(InputObject, Debug, Clone, Copy, Default)]
pub struct TodoOrder {
    pub field: Option<TodoOrderField>,
    pub direction: Option<Direction>,
}

impl From<TodoOrder> for OrderBy<TodoOrderField> {
    fn from(order: TodoOrder) -> Self {
        OrderBy {
            field: order.field,
            direction: order.direction,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    /// Only todos owned by this user key.
    pub owner_key: Option<String>,
}

impl Sortable for Todo {
    type Field = TodoOrderField;

    fn sort_value(&self, field: TodoOrderField) -> SortValue<'_> {
        match field {
            TodoOrderField::CreatedAt => SortValue::Time(self.created_at),
            TodoOrderField::UpdatedAt => SortValue::Time(self.updated_at),
            TodoOrderField::Title => SortValue::Text(&self.title),
            TodoOrderField::Completed => SortValue::Flag(self.completed),
            TodoOrderField::Id => SortValue::Text(&self.key),
        }
    }
}

impl Entity for Todo {
    const KIND: EntityKind = EntityKind::Todo;
    const DEFAULT_ORDER: OrderTerm<TodoOrderField> =
        OrderTerm::new(TodoOrderField::UpdatedAt, Direction::Desc);

    type Filter = TodoFilter;

    fn key(&self) -> &str {
        &self.key
    }

    fn matches(&self, filter: &TodoFilter) -> bool {
        filter
            .owner_key
            .as_deref()
            .map_or(true, |owner| owner == self.owner_key)
    }
}
