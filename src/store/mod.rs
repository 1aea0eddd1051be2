//! Graph store access.
//!
//! Everything that talks to a backend goes through [`GraphStore`]: compiled
//! queries go in as DQL text, the `data` object of the response comes back.
//! [`DgraphClient`] is the HTTP implementation; tests substitute canned
//! stores.

mod dgraph;

use std::time::Duration;

use serde_json::Value;

use crate::error::Result;

pub use dgraph::DgraphClient;

/// Read-only query access to a graph store.
pub trait GraphStore {
    /// Run one DQL query and return the response's `data` object.
    fn query(&self, query: &str) -> Result<Value>;
}

impl<T: GraphStore + ?Sized> GraphStore for &T {
    fn query(&self, query: &str) -> Result<Value> {
        (**self).query(query)
    }
}

/// Bounded exponential backoff for transient store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (starting at 1).
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << exp)
            .min(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        let policy = RetryPolicy {
            max_retries: 6,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(1_000),
        };
        let delays: Vec<u64> = (1..=6).map(|a| policy.delay(a).as_millis() as u64).collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1_000, 1_000]);
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let policy = RetryPolicy {
            max_retries: u32::MAX,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        };
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(30));
        assert_eq!(RetryPolicy::none().delay(3), Duration::ZERO);
    }
}
