// Id Generator - sequential ids owned by one store instance
// Ids are handed out once and never reused, even after the entity is deleted.

use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicI64,
}

impl IdGenerator {
    /// Create a generator whose first id is `first`
    pub fn new(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }

    /// Hand out the next id
    pub fn next_id(&self) -> i64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Make sure `id` is never handed out, e.g. after seeding fixed rows
    pub fn advance_past(&self, id: i64) {
        self.next.fetch_max(id + 1, Ordering::Relaxed);
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}
