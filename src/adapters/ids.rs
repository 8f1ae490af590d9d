//! Identifier generators.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::domain::IdGenerator;

/// Random v4 UUIDs. The default for interactive sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// `{prefix}-{n}` with `n` counting up from 1.
///
/// Deterministic, which makes scripted sessions and tests reproducible.
#[derive(Debug)]
pub struct SequentialGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialGenerator {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialGenerator {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}
