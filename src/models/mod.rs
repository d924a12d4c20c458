// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod athlete;
pub mod career;
pub mod financial;
pub mod injury;
pub mod performance;
pub mod user;

pub use athlete::{Achievement, Athlete, AthleteDocument};
pub use career::Career;
pub use financial::FinancialProfile;
pub use injury::Injury;
pub use performance::Performance;
pub use user::{Role, User, UserProfile};

use chrono::{DateTime, Utc};

/// An embedded list element that is authorized on its own.
///
/// Every line item remembers who created it so item-level updates and
/// deletes can grant access to the creator.
pub trait LineItem {
    fn id(&self) -> &str;
    fn created_by(&self) -> &str;
}

/// Request body that builds a new line item or overwrites an existing one.
pub trait ItemInput<T: LineItem> {
    /// Build a new item stamped with the acting user and time.
    fn build(self, actor_id: &str, now: DateTime<Utc>) -> T;
    /// Overwrite the editable fields of `item`, keeping id and creator.
    fn apply(self, item: &mut T, now: DateTime<Utc>);
}

/// Index of the item with `id`, if present.
pub fn position_of<T: LineItem>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Fresh document/item identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note {
        id: String,
        by: String,
    }

    impl LineItem for Note {
        fn id(&self) -> &str {
            &self.id
        }
        fn created_by(&self) -> &str {
            &self.by
        }
    }

    #[test]
    fn test_position_of() {
        let items = vec![
            Note {
                id: "a".into(),
                by: "u1".into(),
            },
            Note {
                id: "b".into(),
                by: "u2".into(),
            },
        ];
        assert_eq!(position_of(&items, "b"), Some(1));
        assert_eq!(position_of(&items, "c"), None);
        assert_eq!(items[1].created_by(), "u2");
    }
}
