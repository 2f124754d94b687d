//! Reference number allocation.
//!
//! The posting engine never reaches for ambient entropy or the wall clock;
//! identifier formats are an injected collaborator so the engine stays
//! deterministic under test.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Allocates the identifiers carried by entry rows.
pub trait ReferenceAllocator: Send + Sync {
    /// Returns a fresh reference number, shared by all legs of one posting.
    fn reference_number(&self) -> String;

    /// Returns a fresh transaction code, unique per leg.
    fn transaction_code(&self) -> String;
}

/// Production allocator backed by UUID v7 (time-ordered).
#[derive(Debug, Default, Clone)]
pub struct UuidAllocator;

impl ReferenceAllocator for UuidAllocator {
    fn reference_number(&self) -> String {
        format!("REF-{}", Uuid::now_v7().simple())
    }

    fn transaction_code(&self) -> String {
        format!("TXN-{}", Uuid::now_v7().simple())
    }
}

/// Deterministic allocator for tests and seed data.
#[derive(Debug)]
pub struct SequenceAllocator {
    prefix: String,
    counter: AtomicU64,
}

impl SequenceAllocator {
    /// Creates an allocator producing `{prefix}-REF-{n}` / `{prefix}-TXN-{n}`.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            counter: AtomicU64::new(0),
        }
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl ReferenceAllocator for SequenceAllocator {
    fn reference_number(&self) -> String {
        format!("{}-REF-{:06}", self.prefix, self.next())
    }

    fn transaction_code(&self) -> String {
        format!("{}-TXN-{:06}", self.prefix, self.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_allocator_is_unique() {
        let alloc = UuidAllocator;
        assert_ne!(alloc.reference_number(), alloc.reference_number());
        assert_ne!(alloc.transaction_code(), alloc.transaction_code());
    }

    #[test]
    fn test_uuid_allocator_prefixes() {
        let alloc = UuidAllocator;
        assert!(alloc.reference_number().starts_with("REF-"));
        assert!(alloc.transaction_code().starts_with("TXN-"));
    }

    #[test]
    fn test_sequence_allocator_is_deterministic() {
        let alloc = SequenceAllocator::new("test");
        assert_eq!(alloc.reference_number(), "test-REF-000001");
        assert_eq!(alloc.transaction_code(), "test-TXN-000002");
        assert_eq!(alloc.reference_number(), "test-REF-000003");
    }
}
