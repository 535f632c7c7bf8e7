use std::collections::BTreeMap;

use serde::Serialize;

pub const COMMITS: &str = "commits";
pub const LIVE_UPDATES: &str = "live_updates";
pub const REJECTED: &str = "rejected";
pub const RECOMPUTES: &str = "recomputes";
pub const TICKS: &str = "ticks";
pub const STALE_TICKS: &str = "stale_ticks";
pub const VISIBLE_RECORDS: &str = "visible_records";

/// Reaction counters and gauges for an explorer session.
///
/// Keys are sorted so snapshots are stable across runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<&'static str, u64>,
    gauges: BTreeMap<&'static str, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<&'static str, u64>,
    pub gauges: BTreeMap<&'static str, i64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn inc(&mut self, name: &'static str) {
        *self.counters.entry(name).or_insert(0) += 1;
    }

    pub fn set_gauge(&mut self, name: &'static str, value: i64) {
        self.gauges.insert(name, value);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.clone(),
            gauges: self.gauges.clone(),
        }
    }
}
