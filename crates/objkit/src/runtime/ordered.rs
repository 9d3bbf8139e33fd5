//! Insertion-ordered, name-deduplicated collection used by the class builder.

use fxhash::FxHashSet;

/// Anything identified by a name: methods, ivars, properties and protocols.
pub trait Named {
    /// The identifying name.
    fn name(&self) -> &str;
}

/// A set keyed by [`Named::name`] that remembers insertion order.
///
/// The first value inserted under a name wins; later values with the same
/// name are dropped.
///
/// # Example
///
/// ```
/// use objkit::runtime::{IvarStub, OrderedSet, Type};
///
/// let mut set = OrderedSet::new();
/// assert!(set.insert(IvarStub::new("_age", Type::Integer)));
/// assert!(!set.insert(IvarStub::new("_age", Type::Text)));
///
/// assert_eq!(set.len(), 1);
/// assert_eq!(set.iter().next().unwrap().ty, Type::Integer);
/// ```
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    names: FxHashSet<String>,
    items: Vec<T>,
}

impl<T: Named> OrderedSet<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        OrderedSet {
            names: FxHashSet::default(),
            items: Vec::new(),
        }
    }

    /// Inserts `value` unless an item with the same name is present.
    ///
    /// Returns `true` if the value was inserted.
    pub fn insert(&mut self, value: T) -> bool {
        if self.names.contains(value.name()) {
            return false;
        }
        self.names.insert(value.name().to_string());
        self.items.push(value);
        true
    }

    /// Inserts every value in order; returns how many were new.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) -> usize {
        let mut added = 0;
        for value in values {
            if self.insert(value) {
                added += 1;
            }
        }
        added
    }

    /// Returns `true` if an item with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the set has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Consumes the set, returning the items in insertion order.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Named> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Named> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = OrderedSet::new();
        set.extend(iter);
        set
    }
}

impl<'a, T: Named> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Entry(&'static str, u32);

    impl Named for Entry {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_first_insert_wins() {
        let mut set = OrderedSet::new();

        assert!(set.insert(Entry("init", 1)));
        assert!(!set.insert(Entry("init", 2)));

        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next(), Some(&Entry("init", 1)));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let set: OrderedSet<Entry> = [
            Entry("c", 0),
            Entry("a", 0),
            Entry("c", 9),
            Entry("b", 0),
        ]
        .into_iter()
        .collect();

        let names: Vec<&str> = set.iter().map(|e| e.0).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn test_extend_counts_new_items() {
        let mut set = OrderedSet::new();
        set.insert(Entry("x", 0));

        let added = set.extend([Entry("x", 1), Entry("y", 1), Entry("y", 2)]);

        assert_eq!(added, 1);
        assert!(set.contains("y"));
        assert_eq!(set.into_vec(), vec![Entry("x", 0), Entry("y", 1)]);
    }

    #[test]
    fn test_empty() {
        let set: OrderedSet<Entry> = OrderedSet::default();
        assert!(set.is_empty());
        assert!(!set.contains("anything"));
    }
}
