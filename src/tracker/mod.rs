//! 在途请求跟踪：拒绝重复的并发请求，并保证请求结束后清理。
//!
//! In-flight request tracking.
//!
//! A [`RequestTracker`] holds the fingerprints of every request that has been
//! dispatched but has not completed yet. A fingerprint moves through exactly
//! one cycle per network round trip:
//!
//! ```text
//! absent --begin()--> in-flight --guard dropped--> absent
//! ```
//!
//! [`RequestTracker::begin`] fails fast with [`Error::DuplicateRequest`] when
//! the fingerprint is already in flight; the rejected request never enters the
//! set. Removal is tied to the [`InflightGuard`] returned by `begin`, so it
//! runs on success, on failure, and when the dispatching future is dropped.
//!
//! ```rust
//! use sst_request::tracker::{Fingerprint, RequestTracker};
//!
//! let tracker = RequestTracker::shared();
//! let fp = Fingerprint::from("get//status/undefined/undefined");
//!
//! let guard = tracker.begin(fp.clone()).unwrap();
//! assert!(tracker.begin(fp.clone()).unwrap_err().is_duplicate());
//! drop(guard);
//! assert!(tracker.begin(fp).is_ok());
//! ```

mod fingerprint;

pub use fingerprint::Fingerprint;

use crate::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

static GLOBAL_TRACKER: once_cell::sync::Lazy<Arc<RequestTracker>> =
    once_cell::sync::Lazy::new(RequestTracker::shared);

/// Ordered set of in-flight fingerprints.
#[derive(Debug, Default)]
pub struct RequestTracker {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    // (fingerprint, ticket); the ticket ties an entry to the guard that owns it.
    entries: Vec<(Fingerprint, u64)>,
    next_ticket: u64,
}

/// Point-in-time view of the tracker, oldest request first.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct TrackerSnapshot {
    pub inflight: Vec<String>,
}

impl TrackerSnapshot {
    pub fn len(&self) -> usize {
        self.inflight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inflight.is_empty()
    }
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh tracker behind an `Arc`, ready for [`begin`](Self::begin).
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Process-wide tracker used by clients that were not given one.
    pub fn global() -> Arc<Self> {
        GLOBAL_TRACKER.clone()
    }

    // Every mutation is a single Vec call, so a poisoned lock still guards a
    // consistent set.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mark `fingerprint` as in flight.
    ///
    /// Check and insert happen under one lock, so two concurrent callers with
    /// the same fingerprint can never both succeed.
    pub fn begin(self: &Arc<Self>, fingerprint: Fingerprint) -> Result<InflightGuard> {
        let ticket = {
            let mut st = self.state();
            if st.entries.iter().any(|(f, _)| *f == fingerprint) {
                debug!(fingerprint = %fingerprint.digest(), "duplicate request rejected");
                return Err(Error::duplicate(fingerprint.as_str()));
            }
            let ticket = st.next_ticket;
            st.next_ticket = st.next_ticket.wrapping_add(1);
            st.entries.push((fingerprint.clone(), ticket));
            ticket
        };
        debug!(fingerprint = %fingerprint.digest(), "request in flight");
        Ok(InflightGuard {
            tracker: Arc::clone(self),
            fingerprint,
            ticket,
        })
    }

    /// Remove `fingerprint`. Returns `false` when it was not in flight.
    pub fn release(&self, fingerprint: &Fingerprint) -> bool {
        self.remove_where(|(f, _)| f == fingerprint)
    }

    fn release_ticket(&self, ticket: u64) -> bool {
        self.remove_where(|(_, t)| *t == ticket)
    }

    fn remove_where(&self, pred: impl Fn(&(Fingerprint, u64)) -> bool) -> bool {
        let mut st = self.state();
        match st.entries.iter().position(pred) {
            Some(idx) => {
                st.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.state().entries.iter().any(|(f, _)| f == fingerprint)
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            inflight: self
                .state()
                .entries
                .iter()
                .map(|(f, _)| f.as_str().to_string())
                .collect(),
        }
    }
}

/// Keeps a fingerprint in flight; releases it on drop.
///
/// A guard only removes its own entry. If the fingerprint was already released
/// and dispatched again, dropping the stale guard leaves the new entry alone.
#[derive(Debug)]
pub struct InflightGuard {
    tracker: Arc<RequestTracker>,
    fingerprint: Fingerprint,
    ticket: u64,
}

impl InflightGuard {
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        if self.tracker.release_ticket(self.ticket) {
            debug!(fingerprint = %self.fingerprint.digest(), "request completed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(s: &str) -> Fingerprint {
        Fingerprint::from(s)
    }

    #[test]
    fn second_begin_with_same_fingerprint_is_rejected() {
        let tracker = RequestTracker::shared();
        let _first = tracker.begin(fp("post//login/a/undefined")).unwrap();

        let err = tracker.begin(fp("post//login/a/undefined")).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(err.status(), Some(crate::error::DUPLICATE_STATUS));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn dropping_guard_makes_fingerprint_available_again() {
        let tracker = RequestTracker::shared();
        let guard = tracker.begin(fp("get//status/undefined/undefined")).unwrap();
        assert!(tracker.contains(guard.fingerprint()));
        drop(guard);

        assert!(tracker.is_empty());
        assert!(tracker.begin(fp("get//status/undefined/undefined")).is_ok());
    }

    #[test]
    fn rejected_duplicate_does_not_release_original() {
        let tracker = RequestTracker::shared();
        let _first = tracker.begin(fp("k")).unwrap();
        let _ = tracker.begin(fp("k"));
        assert!(tracker.contains(&fp("k")));
    }

    #[test]
    fn release_is_idempotent() {
        let tracker = RequestTracker::shared();
        let guard = tracker.begin(fp("k")).unwrap();
        assert!(tracker.release(&fp("k")));
        assert!(!tracker.release(&fp("k")));
        // Guard drop after an explicit release is a no-op too.
        drop(guard);
        assert!(tracker.is_empty());
    }

    #[test]
    fn stale_guard_leaves_redispatched_entry_alone() {
        let tracker = RequestTracker::shared();
        let stale = tracker.begin(fp("k")).unwrap();
        tracker.release(&fp("k"));
        let _fresh = tracker.begin(fp("k")).unwrap();

        drop(stale);
        assert!(tracker.contains(&fp("k")));
    }

    #[test]
    fn snapshot_preserves_dispatch_order() {
        let tracker = RequestTracker::shared();
        let _a = tracker.begin(fp("a")).unwrap();
        let b = tracker.begin(fp("b")).unwrap();
        let _c = tracker.begin(fp("c")).unwrap();
        drop(b);

        assert_eq!(
            tracker.snapshot().inflight,
            vec!["a".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn concurrent_begin_admits_exactly_one() {
        let tracker = RequestTracker::shared();
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || tracker.begin(fp("same")).map(std::mem::forget).is_ok())
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(admitted, 1);
        assert_eq!(tracker.len(), 1);
    }
}
