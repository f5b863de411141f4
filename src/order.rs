//! Deterministic ordering for paginated queries
//!
//! A client picks one sort field and a direction. The resolved [`OrderSpec`]
//! always appends the entity's primary key, in the same direction, so that
//! rows sharing a sort value still have a strict total order across pages.

use std::cmp::Ordering;
use std::fmt::Debug;

use async_graphql::Enum;
use chrono::{DateTime, Utc};

/// Sort direction
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
#[graphql(name = "OrderDirection")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// A field an entity can be sorted by.
pub trait SortField: Copy + Eq + Debug + Send + Sync + 'static {
    /// Unique field appended as the final tie-break.
    const PRIMARY_KEY: Self;
}

/// Comparable value of one sort field for one row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue<'a> {
    Flag(bool),
    Time(DateTime<Utc>),
    Text(&'a str),
}

/// Rows that expose their sort values.
pub trait Sortable {
    type Field: SortField;

    fn sort_value(&self, field: Self::Field) -> SortValue<'_>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm<F> {
    pub field: F,
    pub direction: Direction,
}

impl<F> OrderTerm<F> {
    pub const fn new(field: F, direction: Direction) -> Self {
        Self { field, direction }
    }
}

/// Client-requested ordering; either half may be left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy<F> {
    pub field: Option<F>,
    pub direction: Option<Direction>,
}

/// Resolved multi-key ordering, ending in the primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec<F> {
    terms: Vec<OrderTerm<F>>,
}

impl<F: SortField> OrderSpec<F> {
    /// Resolve a client request against the entity's default order.
    ///
    /// A missing field falls back to the default field, a missing direction
    /// to the default direction. Sorting by the primary key itself needs no
    /// tie-break and yields a single term.
    pub fn resolve(requested: Option<OrderBy<F>>, default: OrderTerm<F>) -> Self {
        let primary = match requested {
            Some(OrderBy { field, direction }) => OrderTerm {
                field: field.unwrap_or(default.field),
                direction: direction.unwrap_or(default.direction),
            },
            None => default,
        };

        let mut terms = vec![primary];
        if primary.field != F::PRIMARY_KEY {
            terms.push(OrderTerm::new(F::PRIMARY_KEY, primary.direction));
        }
        Self { terms }
    }

    pub fn terms(&self) -> &[OrderTerm<F>] {
        &self.terms
    }

    /// The client-visible sort term.
    pub fn primary(&self) -> OrderTerm<F> {
        self.terms[0]
    }

    /// Same keys, every direction flipped.
    pub fn reversed(&self) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|term| OrderTerm::new(term.field, term.direction.reverse()))
                .collect(),
        }
    }

    /// Compare two rows by the full key tuple.
    pub fn compare<T: Sortable<Field = F>>(&self, a: &T, b: &T) -> Ordering {
        self.terms
            .iter()
            .map(|term| {
                term.direction
                    .apply(a.sort_value(term.field).cmp(&b.sort_value(term.field)))
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Field {
        Rank,
        Id,
    }

    impl SortField for Field {
        const PRIMARY_KEY: Self = Field::Id;
    }

    struct Row {
        id: &'static str,
        rank: bool,
    }

    impl Sortable for Row {
        type Field = Field;

        fn sort_value(&self, field: Field) -> SortValue<'_> {
            match field {
                Field::Rank => SortValue::Flag(self.rank),
                Field::Id => SortValue::Text(self.id),
            }
        }
    }

    const DEFAULT: OrderTerm<Field> = OrderTerm::new(Field::Rank, Direction::Desc);

    #[test]
    fn test_default_order_gets_tie_break() {
        let spec = OrderSpec::resolve(None, DEFAULT);
        assert_eq!(
            spec.terms(),
            &[
                OrderTerm::new(Field::Rank, Direction::Desc),
                OrderTerm::new(Field::Id, Direction::Desc),
            ]
        );
    }

    #[test]
    fn test_tie_break_follows_requested_direction() {
        let spec = OrderSpec::resolve(
            Some(OrderBy {
                field: Some(Field::Rank),
                direction: Some(Direction::Asc),
            }),
            DEFAULT,
        );
        assert!(spec.terms().iter().all(|t| t.direction == Direction::Asc));
        assert_eq!(spec.terms().last().unwrap().field, Field::Id);
    }

    #[test]
    fn test_partial_request_uses_defaults() {
        let spec = OrderSpec::resolve(
            Some(OrderBy {
                field: None,
                direction: Some(Direction::Asc),
            }),
            DEFAULT,
        );
        assert_eq!(spec.primary(), OrderTerm::new(Field::Rank, Direction::Asc));
    }

    #[test]
    fn test_primary_key_order_is_not_duplicated() {
        let spec = OrderSpec::resolve(
            Some(OrderBy {
                field: Some(Field::Id),
                direction: None,
            }),
            DEFAULT,
        );
        assert_eq!(spec.terms(), &[OrderTerm::new(Field::Id, Direction::Desc)]);
    }

    #[test]
    fn test_compare_breaks_ties_on_primary_key() {
        let spec = OrderSpec::resolve(None, DEFAULT);
        let a = Row { id: "a", rank: true };
        let b = Row { id: "b", rank: true };
        let c = Row { id: "c", rank: false };

        assert_eq!(spec.compare(&a, &c), Ordering::Less);
        assert_eq!(spec.compare(&b, &a), Ordering::Less);
        assert_eq!(spec.reversed().compare(&b, &a), Ordering::Greater);
        assert_eq!(spec.compare(&a, &a), Ordering::Equal);
    }
}
