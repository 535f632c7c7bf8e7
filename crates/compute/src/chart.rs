use serde::Serialize;

/// One bar of a chart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub key: i32,
    pub count: u32,
    pub highlighted: bool,
}

/// A chart renderer. Receives the full bucket sequence on every redraw.
pub trait ChartSurface {
    fn redraw(&mut self, buckets: &[Bucket]);
}

/// Headless chart that keeps the last frame and counts redraws.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingChart {
    last: Vec<Bucket>,
    redraws: u64,
}

impl RecordingChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> &[Bucket] {
        &self.last
    }

    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}

impl ChartSurface for RecordingChart {
    fn redraw(&mut self, buckets: &[Bucket]) {
        self.last.clear();
        self.last.extend_from_slice(buckets);
        self.redraws += 1;
    }
}
