use serde::Serialize;

/// One validated OHLC(V) record. `time` is epoch seconds (UTC), never negative,
/// and the four prices are always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// Bars ordered non-decreasing by time. Same-time bars are kept, in the
/// order they arrived.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    /// First bar stamped exactly `time`.
    pub fn bar_at(&self, time: i64) -> Option<&Bar> {
        let idx = self.bars.partition_point(|b| b.time < time);
        self.bars.get(idx).filter(|b| b.time == time)
    }
}

/// Order bars chronologically. The sort is stable and does not deduplicate.
pub fn assemble(mut bars: Vec<Bar>) -> Series {
    bars.sort_by_key(|b| b.time);
    Series { bars }
}
