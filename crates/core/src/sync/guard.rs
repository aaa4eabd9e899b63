//! Per-account single-flight guard

use std::sync::Arc;

use dashmap::DashSet;

/// Set of account ids with a sync in flight.
///
/// Cloning shares the underlying set.
#[derive(Debug, Default, Clone)]
pub struct SyncGuard {
    in_flight: Arc<DashSet<String>>,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `account_id`. Returns `None` if another sync already holds it.
    ///
    /// The claim is released when the returned lease drops.
    pub fn try_acquire(&self, account_id: &str) -> Option<SyncLease> {
        if self.in_flight.insert(account_id.to_string()) {
            let in_flight = Arc::clone(&self.in_flight);
            Some(SyncLease { in_flight, account_id: account_id.to_string() })
        } else {
            None
        }
    }

    pub fn is_held(&self, account_id: &str) -> bool {
        self.in_flight.contains(account_id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

/// Held claim on one account id.
#[derive(Debug)]
pub struct SyncLease {
    in_flight: Arc<DashSet<String>>,
    account_id: String,
}

impl SyncLease {
    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

impl Drop for SyncLease {
    fn drop(&mut self) {
        self.in_flight.remove(&self.account_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_rejected_until_release() {
        let guard = SyncGuard::new();

        let lease = guard.try_acquire("acct-1").unwrap();
        assert_eq!(lease.account_id(), "acct-1");
        assert!(guard.try_acquire("acct-1").is_none());
        assert!(guard.try_acquire("acct-2").is_some());

        drop(lease);
        assert!(!guard.is_held("acct-1"));
        assert!(guard.try_acquire("acct-1").is_some());
    }

    #[test]
    fn release_happens_on_unwind() {
        let guard = SyncGuard::new();
        let shared = guard.clone();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _lease = shared.try_acquire("acct-1");
            panic!("worker blew up");
        }));

        assert!(outcome.is_err());
        assert_eq!(guard.in_flight_count(), 0);
    }
}
