//! Specialized collection types

/// Insertion-ordered set backed by a vector
///
/// Holds the small id sets of the scene graph (the selective update set of a
/// node, the pending queue of the update scheduler) where membership must be
/// idempotent but iteration order should stay deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedSet<T> {
    items: Vec<T>,
}

impl<T: PartialEq> OrderedSet<T> {
    /// Create a new empty set
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Insert an item, returning `false` if it was already present
    pub fn insert(&mut self, item: T) -> bool {
        if self.items.contains(&item) {
            false
        } else {
            self.items.push(item);
            true
        }
    }

    /// Remove an item, returning whether it was present
    pub fn remove(&mut self, item: &T) -> bool {
        if let Some(index) = self.items.iter().position(|existing| existing == item) {
            self.items.remove(index);
            true
        } else {
            false
        }
    }

    /// Check whether an item is present
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every item
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Take every item out of the set in insertion order
    pub fn take(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }

    /// Take the items matching `predicate`, keeping the rest in order
    pub fn take_where<F: FnMut(&T) -> bool>(&mut self, mut predicate: F) -> Vec<T> {
        let (taken, kept) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| predicate(item));
        self.items = kept;
        taken
    }

    /// Drain every item in insertion order
    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.items.drain(..)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T: PartialEq> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent_and_ordered() {
        let mut set = OrderedSet::new();
        assert!(set.insert(3));
        assert!(set.insert(1));
        assert!(!set.insert(3));
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![3, 1]);
    }

    #[test]
    fn test_remove_and_take() {
        let mut set = OrderedSet::new();
        set.insert("a");
        set.insert("b");
        assert!(set.remove(&"a"));
        assert!(!set.remove(&"a"));
        assert_eq!(set.take(), vec!["b"]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_take_where_keeps_remaining_order() {
        let mut set = OrderedSet::new();
        for value in [5, 2, 8, 3, 6] {
            set.insert(value);
        }
        assert_eq!(set.take_where(|v| v % 2 == 0), vec![2, 8, 6]);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![5, 3]);
    }
}
