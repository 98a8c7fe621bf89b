use data_engine::{Bar, CsvRecord};
use serde::Serialize;
use tracing::debug;

use crate::rolling_window::RollingWindow;

/// One indicator value, aligned to the bar it closes on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub time: i64,
    pub value: f64,
}

impl CsvRecord for IndicatorPoint {
    fn headers() -> &'static [&'static str] {
        &["time", "value"]
    }

    fn record(&self) -> Vec<String> {
        vec![self.time.to_string(), format!("{:.6}", self.value)]
    }
}

/// Simple moving average of closes over `period` bars.
///
/// `bars` must already be in chronological order. Yields one point per bar
/// from index `period - 1` onward, so `max(0, n - period + 1)` points. A
/// zero period yields nothing.
pub fn compute_sma(bars: &[Bar], period: usize) -> Vec<IndicatorPoint> {
    if period == 0 || bars.len() < period {
        return Vec::new();
    }

    let mut window = RollingWindow::new(period);
    let mut out = Vec::with_capacity(bars.len() - period + 1);
    for bar in bars {
        window.push(bar.close);
        if let Some(value) = window.mean() {
            out.push(IndicatorPoint { time: bar.time, value });
        }
    }
    debug!(bars = bars.len(), period, points = out.len(), "computed sma");
    out
}

/// First point stamped exactly `time`. `points` must be sorted by time.
pub fn point_at(points: &[IndicatorPoint], time: i64) -> Option<&IndicatorPoint> {
    let idx = points.partition_point(|p| p.time < time);
    points.get(idx).filter(|p| p.time == time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                time: 86_400 * i as i64,
                open: c,
                high: c,
                low: c,
                close: c,
                volume: None,
            })
            .collect()
    }

    #[test]
    fn two_bar_average() {
        let series = bars(&[11.0, 12.0]);
        let sma = compute_sma(&series, 2);
        assert_eq!(sma, vec![IndicatorPoint { time: 86_400, value: 11.5 }]);
    }

    #[test]
    fn rolling_values() {
        let sma = compute_sma(&bars(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3);
        let values: Vec<f64> = sma.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
        assert_eq!(sma[0].time, 2 * 86_400);
    }

    #[test]
    fn short_or_empty_series() {
        assert!(compute_sma(&[], 3).is_empty());
        assert!(compute_sma(&bars(&[1.0, 2.0]), 3).is_empty());
        assert!(compute_sma(&bars(&[1.0, 2.0]), 0).is_empty());
    }

    #[test]
    fn period_one_echoes_closes() {
        let sma = compute_sma(&bars(&[3.0, 1.0, 2.0]), 1);
        let values: Vec<f64> = sma.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn csv_record_layout() {
        let p = IndicatorPoint { time: 60, value: 1.25 };
        assert_eq!(IndicatorPoint::headers(), &["time", "value"]);
        assert_eq!(p.record(), vec!["60".to_string(), "1.250000".to_string()]);
    }

    #[test]
    fn lookup_by_time() {
        let sma = compute_sma(&bars(&[1.0, 2.0, 3.0]), 2);
        assert_eq!(point_at(&sma, 86_400).map(|p| p.value), Some(1.5));
        assert_eq!(point_at(&sma, 0), None);
    }

    proptest! {
        #[test]
        fn point_count_matches_window(n in 0usize..80, period in 1usize..20) {
            let series = bars(&vec![1.0; n]);
            prop_assert_eq!(compute_sma(&series, period).len(), (n + 1).saturating_sub(period));
        }

        #[test]
        fn constant_series_averages_to_constant(v in -1.0e6f64..1.0e6, n in 1usize..60, period in 1usize..10) {
            let series = bars(&vec![v; n]);
            for p in compute_sma(&series, period) {
                prop_assert!((p.value - v).abs() <= 1e-9 * v.abs().max(1.0));
            }
        }
    }
}
