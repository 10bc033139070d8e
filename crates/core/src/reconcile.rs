//! Keyed set-difference between a stored collection and a desired one.
//!
//! Updating a person replaces each child collection wholesale: whatever the
//! client sends is the new state. Rather than deleting and re-inserting every
//! row, [`reconcile`] works out the minimal change set so untouched rows keep
//! their surrogate IDs and timestamps.
//!
//! ```
//! use people_core::reconcile::reconcile;
//!
//! let current = ["a@x.com".to_string(), "b@x.com".to_string()];
//! let desired = ["a@x.com".to_string(), "c@x.com".to_string()];
//!
//! let plan = reconcile(&current, &desired, |c| c.as_str(), |d| d.as_str());
//! assert_eq!(plan.remove, [&current[1]]);
//! assert_eq!(plan.insert, [&desired[1]]);
//! ```

use std::collections::HashSet;
use std::hash::Hash;

/// The rows to delete and the rows to insert to reach the desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<'a, C, D> {
    /// Current rows whose key is absent from the desired collection.
    pub remove: Vec<&'a C>,
    /// Desired entries whose key is absent from the current collection.
    ///
    /// A key repeated in the desired collection appears here once, at the
    /// position of its first occurrence.
    pub insert: Vec<&'a D>,
}

impl<C, D> Reconciliation<'_, C, D> {
    /// Whether applying this plan would change nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.remove.is_empty() && self.insert.is_empty()
    }
}

/// Compute the changes that turn `current` into `desired`.
///
/// Rows are matched on the key returned by `current_key` / `desired_key`;
/// any other field is ignored. Current rows whose key is still wanted are left
/// alone, even if the stored collection holds that key more than once.
pub fn reconcile<'a, C, D, K, FC, FD>(
    current: &'a [C],
    desired: &'a [D],
    current_key: FC,
    desired_key: FD,
) -> Reconciliation<'a, C, D>
where
    K: Eq + Hash,
    FC: Fn(&'a C) -> K,
    FD: Fn(&'a D) -> K,
{
    let wanted: HashSet<K> = desired.iter().map(&desired_key).collect();
    let remove = current
        .iter()
        .filter(|row| !wanted.contains(&current_key(*row)))
        .collect();

    let mut seen: HashSet<K> = current.iter().map(&current_key).collect();
    let insert = desired
        .iter()
        .filter(|entry| seen.insert(desired_key(*entry)))
        .collect();

    Reconciliation { remove, insert }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct StoredPhone {
        number: &'static str,
        type_id: i32,
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Card {
        id: i32,
        number: &'static str,
    }

    fn emails<'a>(
        current: &'a [&'static str],
        desired: &'a [&'static str],
    ) -> Reconciliation<'a, &'static str, &'static str> {
        reconcile(current, desired, |c| *c, |d| *d)
    }

    #[test]
    fn test_removes_missing_and_keeps_existing() {
        let current = ["a@x.com", "b@x.com"];
        let desired = ["a@x.com"];

        let plan = emails(&current, &desired);

        assert_eq!(plan.remove, [&"b@x.com"]);
        assert!(plan.insert.is_empty());
    }

    #[test]
    fn test_inserts_new_entries_only() {
        let current = ["a@x.com"];
        let desired = ["a@x.com", "c@x.com"];

        let plan = emails(&current, &desired);

        assert!(plan.remove.is_empty());
        assert_eq!(plan.insert, [&"c@x.com"]);
    }

    #[test]
    fn test_empty_desired_removes_everything() {
        let current = ["a@x.com", "b@x.com"];
        let plan = emails(&current, &[]);

        assert_eq!(plan.remove.len(), 2);
        assert!(plan.insert.is_empty());
    }

    #[test]
    fn test_empty_current_inserts_everything() {
        let desired = ["a@x.com", "b@x.com"];
        let plan = emails(&[], &desired);

        assert!(plan.remove.is_empty());
        assert_eq!(plan.insert, [&"a@x.com", &"b@x.com"]);
    }

    #[test]
    fn test_identical_collections_are_noop() {
        let current = ["a@x.com", "b@x.com"];
        let desired = ["b@x.com", "a@x.com"];

        assert!(emails(&current, &desired).is_noop());
    }

    #[test]
    fn test_keys_compare_exactly() {
        let current = ["A@x.com"];
        let desired = ["a@x.com"];

        let plan = emails(&current, &desired);

        assert_eq!(plan.remove, [&"A@x.com"]);
        assert_eq!(plan.insert, [&"a@x.com"]);
    }

    #[test]
    fn test_repeated_desired_key_inserted_once() {
        let desired = ["a@x.com", "b@x.com", "a@x.com"];
        let plan = emails(&[], &desired);

        assert_eq!(plan.insert, [&"a@x.com", &"b@x.com"]);
    }

    #[test]
    fn test_repeated_current_key_is_kept_when_wanted() {
        let current = ["a@x.com", "a@x.com"];
        let desired = ["a@x.com"];

        assert!(emails(&current, &desired).is_noop());
    }

    #[test]
    fn test_phone_key_ignores_type() {
        let current = [StoredPhone {
            number: "555-0100",
            type_id: 1,
        }];
        let desired = [
            StoredPhone {
                number: "555-0100",
                type_id: 2,
            },
            StoredPhone {
                number: "555-0199",
                type_id: 3,
            },
            StoredPhone {
                number: "555-0199",
                type_id: 1,
            },
        ];

        let plan = reconcile(&current, &desired, |c| c.number, |d| d.number);

        assert!(plan.remove.is_empty());
        assert_eq!(plan.insert.len(), 1);
        assert_eq!(plan.insert[0].type_id, 3);
    }

    #[test]
    fn test_different_current_and_desired_types() {
        let current = [
            Card {
                id: 10,
                number: "1111",
            },
            Card {
                id: 11,
                number: "2222",
            },
        ];
        let desired = [11, 12];

        let plan = reconcile(&current, &desired, |c| c.id, |d| *d);

        assert_eq!(plan.remove, [&current[0]]);
        assert_eq!(plan.insert, [&12]);
    }
}
