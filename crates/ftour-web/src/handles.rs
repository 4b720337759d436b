#![forbid(unsafe_code)]

//! Integer handles for host objects that only compare by identity.
//!
//! DOM element references cannot be hashed, so [`HandleTable::intern`] scans.
//! Dead entries are dropped by [`HandleTable::prune`] and whenever the table
//! reaches its soft cap, which keeps the scan bounded by the live objects the
//! engine has touched.

use std::collections::HashMap;

/// Entries kept before an insert first sheds dead ones.
pub const DEFAULT_SOFT_CAP: usize = 64;

#[derive(Debug)]
pub struct HandleTable<T> {
    by_id: HashMap<u64, T>,
    next: u64,
    soft_cap: usize,
    /// Size that triggers the next prune; grows past `soft_cap` while every
    /// entry is live.
    threshold: usize,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new(DEFAULT_SOFT_CAP)
    }
}

impl<T> HandleTable<T> {
    pub fn new(soft_cap: usize) -> Self {
        let soft_cap = soft_cap.max(1);
        Self {
            by_id: HashMap::new(),
            next: 0,
            soft_cap,
            threshold: soft_cap,
        }
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Drop entries for which `is_live` is false. Returns how many went.
    pub fn prune(&mut self, is_live: impl Fn(&T) -> bool) -> usize {
        let before = self.by_id.len();
        self.by_id.retain(|_, value| is_live(value));
        self.threshold = self.soft_cap.max(self.by_id.len() * 2);
        before - self.by_id.len()
    }
}

impl<T: PartialEq> HandleTable<T> {
    /// Handle for `value`, reusing an existing one when already present.
    ///
    /// Handles are never reissued, so a pruned handle stays unresolvable.
    pub fn intern(&mut self, value: T, is_live: impl Fn(&T) -> bool) -> u64 {
        if let Some((&id, _)) = self.by_id.iter().find(|(_, v)| **v == value) {
            return id;
        }
        if self.by_id.len() >= self.threshold {
            let dropped = self.prune(is_live);
            tracing::trace!(dropped, kept = self.by_id.len(), "handle table pruned");
        }
        self.next += 1;
        self.by_id.insert(self.next, value);
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    #[test]
    fn same_value_keeps_its_handle() {
        let mut table = HandleTable::new(8);
        let a = table.intern("a", |_| true);
        let b = table.intern("b", |_| true);
        assert_ne!(a, b);
        assert_eq!(table.intern("a", |_| true), a);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(b), Some(&"b"));
    }

    #[test]
    fn prune_drops_dead_entries_and_their_handles() {
        let mut table = HandleTable::new(8);
        let a = table.intern("a", |_| true);
        let b = table.intern("b", |_| true);
        assert_eq!(table.prune(|v| *v != "a"), 1);
        assert_eq!(table.get(a), None);
        assert_eq!(table.get(b), Some(&"b"));
        let again = table.intern("a", |_| true);
        assert_ne!(again, a);
    }

    #[test]
    fn reaching_the_cap_sheds_detached_entries() {
        let dead: RefCell<HashSet<u32>> = RefCell::default();
        let live = |v: &u32| !dead.borrow().contains(v);
        let mut table = HandleTable::new(4);
        for n in 0..4 {
            table.intern(n, live);
        }
        dead.borrow_mut().extend([0, 1, 2]);
        table.intern(10, live);
        assert_eq!(table.len(), 2);

        // A long run of short-lived elements stays bounded.
        for n in 100..1000 {
            table.intern(n, live);
            dead.borrow_mut().insert(n);
        }
        assert!(table.len() <= 5, "table grew to {}", table.len());
    }

    #[test]
    fn live_entries_are_never_evicted() {
        let mut table = HandleTable::new(2);
        let ids: Vec<u64> = (0..10usize).map(|n| table.intern(n, |_| true)).collect();
        assert_eq!(table.len(), 10);
        for (n, id) in ids.into_iter().enumerate() {
            assert_eq!(table.get(id), Some(&n));
        }
    }
}
