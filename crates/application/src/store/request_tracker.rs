//! Latest-wins request sequencing.
//!
//! Each logical slot of the store (the list, the statistics, ...) owns one
//! tracker. A request takes a token when it is issued and may only commit
//! while that token is still the newest one for the slot. Responses that
//! resolve after a newer request was issued are dropped at commit time;
//! the transport call itself is never aborted.

use std::sync::atomic::{AtomicU64, Ordering};

/// Sequence number carried by one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Returns the raw sequence number.
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

/// Issues tokens for one slot and answers whether a token is still current.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    /// Creates a tracker that has issued nothing yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Issues a new token, superseding every earlier one.
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Returns true if no newer token has been issued since `token`.
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }
}
