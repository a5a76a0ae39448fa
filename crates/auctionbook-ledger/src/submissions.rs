//! Submission guard: a transaction lands on the ledger at most once.
//!
//! Resubmitting the same signed bytes returns the handle of the first
//! submission instead of executing again. The guard is bounded; once
//! `max_size` transactions are tracked the oldest is forgotten.

use std::collections::{HashMap, VecDeque};

use auctionbook_types::ConfirmationHandle;
use sha2::{Digest, Sha256};

pub struct SubmissionGuard {
    /// Transaction digest → handle it confirmed with.
    seen: HashMap<String, ConfirmationHandle>,
    /// Insertion order for eviction (front = oldest).
    order: VecDeque<String>,
    max_size: usize,
}

impl SubmissionGuard {
    /// # Panics
    /// Panics if `max_size` is zero.
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "SubmissionGuard max_size must be > 0");
        Self {
            seen: HashMap::with_capacity(max_size),
            order: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Hex SHA-256 of the signed transaction bytes.
    #[must_use]
    pub fn digest(signed_tx: &[u8]) -> String {
        hex::encode(Sha256::digest(signed_tx))
    }

    /// The handle a previous submission of `digest` confirmed with.
    #[must_use]
    pub fn lookup(&self, digest: &str) -> Option<&ConfirmationHandle> {
        self.seen.get(digest)
    }

    pub fn record(&mut self, digest: String, handle: ConfirmationHandle) {
        if self.seen.contains_key(&digest) {
            return;
        }
        if self.seen.len() >= self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.order.push_back(digest.clone());
        self.seen.insert(digest, handle);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resubmission_returns_first_handle() {
        let mut guard = SubmissionGuard::new(10);
        let digest = SubmissionGuard::digest(b"tx");
        guard.record(digest.clone(), ConfirmationHandle::new("h1"));
        guard.record(digest.clone(), ConfirmationHandle::new("h2"));
        assert_eq!(guard.lookup(&digest), Some(&ConfirmationHandle::new("h1")));
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn eviction_at_capacity() {
        let mut guard = SubmissionGuard::new(2);
        for tx in [b"a", b"b", b"c"] {
            guard.record(SubmissionGuard::digest(tx), ConfirmationHandle::new("h"));
        }
        assert_eq!(guard.len(), 2);
        assert!(guard.lookup(&SubmissionGuard::digest(b"a")).is_none());
        assert!(guard.lookup(&SubmissionGuard::digest(b"c")).is_some());
    }

    #[test]
    fn digest_is_hex_sha256() {
        let d = SubmissionGuard::digest(b"");
        assert_eq!(
            d,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    #[should_panic(expected = "max_size must be > 0")]
    fn zero_capacity_panics() {
        let _ = SubmissionGuard::new(0);
    }
}
