use std::collections::vec_deque::{self, VecDeque};

/// How many trace entries an explorer session keeps by default.
pub const DEFAULT_TRACE_CAPACITY: usize = 1024;

/// Trace entry for one step of a reaction.
///
/// Sequence numbers are assigned in emission order, so the trace shows exactly
/// what ran before what (e.g. a playback stop ahead of a commit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub seq: u64,
    pub kind: &'static str,
    pub message: String,
}

/// Ring buffer of the most recent [`Event`]s.
///
/// Once `capacity` entries are held, each emit evicts the oldest one.
/// Sequence numbers keep counting across evictions.
#[derive(Debug)]
pub struct EventBus {
    next_seq: u64,
    capacity: usize,
    events: VecDeque<Event>,
}

impl EventBus {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            next_seq: 0,
            capacity,
            events: VecDeque::with_capacity(capacity),
        }
    }

    pub fn emit(&mut self, kind: &'static str, message: impl Into<String>) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push_back(Event {
            seq,
            kind,
            message: message.into(),
        });
    }

    /// Retained events, oldest first.
    pub fn events(&self) -> vec_deque::Iter<'_, Event> {
        self.events.iter()
    }

    /// Event kinds in emission order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.iter().map(|e| e.kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_events_in_order() {
        let mut bus = EventBus::with_capacity(8);
        bus.emit("playback.stop", "manual commit");
        bus.emit("commit", "range 2000");
        assert_eq!(bus.kinds(), vec!["playback.stop", "commit"]);
        assert_eq!(bus.events().nth(1).map(|e| e.seq), Some(1));
    }

    #[test]
    fn full_trace_drops_the_oldest_entries() {
        let mut bus = EventBus::with_capacity(3);
        for n in 0..10 {
            bus.emit("tick", format!("tick {n}"));
        }
        let seqs: Vec<u64> = bus.events().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![7, 8, 9]);
        assert_eq!(bus.events().len(), 3);
    }

    #[test]
    fn zero_capacity_still_keeps_the_latest_event() {
        let mut bus = EventBus::with_capacity(0);
        bus.emit("a", "");
        bus.emit("b", "");
        assert_eq!(bus.kinds(), vec!["b"]);
    }
}
