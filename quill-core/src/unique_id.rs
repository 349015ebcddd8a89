use std::sync::atomic::{AtomicU64, Ordering};

/// Source of identifiers that are never handed out twice by the same instance.
pub trait UniqueId: Send + Sync {
    fn next_id(&self) -> u64;
}

/// Monotonically increasing counter starting at the given value.
#[derive(Debug, Default)]
pub struct MonotonicIds {
    next: AtomicU64,
}

impl MonotonicIds {
    pub const fn new() -> Self {
        Self::starting_at(1)
    }
    pub const fn starting_at(value: u64) -> Self {
        Self {
            next: AtomicU64::new(value),
        }
    }
}

impl UniqueId for MonotonicIds {
    fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}
