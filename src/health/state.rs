//! Per-target health records.
//!
//! # States
//! - Up: last probe through the router returned 200
//! - Down: last probe returned any other status
//! - Unknown: not observed, or not the target currently routed to
//!
//! # Design Decisions
//! - Only the active target is ever observed; its counterpart is forced to Unknown
//! - The whole board is swapped at once so readers see both records from the same tick

use arc_swap::ArcSwap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::resilience::latency_ms;
use crate::routing::TargetRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthState {
    Up,
    Down,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthRecord {
    pub state: HealthState,
    pub last_status_code: Option<u16>,
    pub last_latency_ms: Option<u64>,
}

impl HealthRecord {
    pub const UNKNOWN: HealthRecord = HealthRecord {
        state: HealthState::Unknown,
        last_status_code: None,
        last_latency_ms: None,
    };

    pub fn observed(status: u16, latency: Duration) -> Self {
        Self {
            state: if status == 200 {
                HealthState::Up
            } else {
                HealthState::Down
            },
            last_status_code: Some(status),
            last_latency_ms: Some(latency_ms(latency)),
        }
    }
}

impl Default for HealthRecord {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// Health of both targets plus the global reachability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    pub primary: HealthRecord,
    pub spare: HealthRecord,
    /// Set when the last probe got no response at all.
    pub offline: bool,
}

impl Default for HealthSnapshot {
    fn default() -> Self {
        Self {
            primary: HealthRecord::UNKNOWN,
            spare: HealthRecord::UNKNOWN,
            offline: false,
        }
    }
}

/// Shared health board. Clones refer to the same board.
#[derive(Debug, Clone, Default)]
pub struct HealthBoard {
    inner: Arc<ArcSwap<HealthSnapshot>>,
}

impl HealthBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        **self.inner.load()
    }

    /// Record an observation for `role` and force its counterpart to Unknown.
    pub fn observe(&self, role: TargetRole, record: HealthRecord) {
        let mut next = HealthSnapshot::default();
        match role {
            TargetRole::Primary => next.primary = record,
            TargetRole::Spare => next.spare = record,
            TargetRole::Unknown => {}
        }
        self.inner.store(Arc::new(next));
    }

    /// The router now sends traffic to `role`: forget whatever was known about the other target.
    ///
    /// `role`'s own record and the offline flag are kept until the next probe.
    pub fn retarget(&self, role: TargetRole) {
        self.inner.rcu(|current| {
            let mut next = **current;
            match role {
                TargetRole::Primary => next.spare = HealthRecord::UNKNOWN,
                TargetRole::Spare => next.primary = HealthRecord::UNKNOWN,
                TargetRole::Unknown => {
                    next.primary = HealthRecord::UNKNOWN;
                    next.spare = HealthRecord::UNKNOWN;
                }
            }
            next
        });
    }

    /// Both records Unknown; `offline` marks a probe that got no response.
    pub fn reset(&self, offline: bool) {
        self.inner.store(Arc::new(HealthSnapshot {
            offline,
            ..HealthSnapshot::default()
        }));
    }
}
