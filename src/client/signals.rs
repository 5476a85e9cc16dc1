use crate::tracker::TrackerSnapshot;

/// Facts about a client's current state, for diagnostics and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SignalsSnapshot {
    pub base_url: String,
    pub timeout_ms: u64,
    pub inflight: TrackerSnapshot,
}
