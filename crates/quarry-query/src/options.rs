//! Document-wide query configuration.

use strum::VariantNames as _;
use strum_macros::{Display, EnumString, VariantNames};

/// How `add` orders the union of two node sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, VariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum UnionOrder {
    /// Current nodes first, then new ones in the order they were resolved.
    #[default]
    Append,
    /// The union is re-sorted into document order.
    Document,
}

impl UnionOrder {
    /// Accepted spellings, for help text.
    #[must_use]
    pub const fn names() -> &'static [&'static str] {
        Self::VARIANTS
    }
}

/// Options carried by a [`Document`](crate::Document) and shared by every
/// selection derived from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Ordering of `add` results
    pub union_order: UnionOrder,
}

impl QueryOptions {
    /// Options with the given union order.
    #[must_use]
    pub const fn with_union_order(mut self, union_order: UnionOrder) -> Self {
        self.union_order = union_order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_order_round_trips_through_strings() {
        assert_eq!(UnionOrder::Append.to_string(), "append");
        assert_eq!("document".parse::<UnionOrder>(), Ok(UnionOrder::Document));
        assert!("sorted".parse::<UnionOrder>().is_err());
        assert_eq!(UnionOrder::names(), &["append", "document"]);
    }

    #[test]
    fn test_default_is_append() {
        assert_eq!(QueryOptions::default().union_order, UnionOrder::Append);
    }
}
