use data_engine::Series;
use indicator_engine::{compute_sma, legend_at, IndicatorPoint, Legend};

/// What a chart currently shows: one series and its SMA overlay.
///
/// Both are replaced wholesale. The SMA is recomputed whenever the series
/// or the period changes, never patched.
#[derive(Debug, Clone)]
pub struct ChartSession {
    series: Series,
    sma_period: usize,
    sma: Vec<IndicatorPoint>,
}

impl ChartSession {
    /// A period of 0 is treated as 1.
    pub fn new(sma_period: usize) -> Self {
        Self {
            series: Series::default(),
            sma_period: sma_period.max(1),
            sma: Vec::new(),
        }
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn sma(&self) -> &[IndicatorPoint] {
        &self.sma
    }

    pub fn sma_period(&self) -> usize {
        self.sma_period
    }

    /// Swap in a newly ingested series. Whatever was shown before is dropped.
    pub fn replace_series(&mut self, series: Series) {
        self.series = series;
        self.recompute();
    }

    /// Set the SMA window; anything below 1 is treated as 1.
    pub fn set_sma_period(&mut self, period: i64) {
        let period = clamp_period(period);
        if period != self.sma_period {
            self.sma_period = period;
            self.recompute();
        }
    }

    pub fn clear(&mut self) {
        self.series = Series::default();
        self.sma.clear();
    }

    pub fn legend_at(&self, time: i64) -> Option<Legend> {
        legend_at(&self.series, &self.sma, time)
    }

    fn recompute(&mut self) {
        self.sma = compute_sma(self.series.bars(), self.sma_period);
    }
}

fn clamp_period(period: i64) -> usize {
    usize::try_from(period.max(1)).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_engine::{assemble, Bar};

    fn series(closes: &[f64]) -> Series {
        assemble(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| Bar { time: 60 * i as i64, open: c, high: c, low: c, close: c, volume: None })
                .collect(),
        )
    }

    #[test]
    fn replacing_series_recomputes_sma() {
        let mut s = ChartSession::new(2);
        s.replace_series(series(&[1.0, 2.0, 3.0]));
        assert_eq!(s.sma().len(), 2);

        s.replace_series(series(&[5.0]));
        assert_eq!(s.series().len(), 1);
        assert!(s.sma().is_empty());
    }

    #[test]
    fn period_is_clamped_and_recomputed() {
        let mut s = ChartSession::new(0);
        assert_eq!(s.sma_period(), 1);
        s.replace_series(series(&[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(s.sma().len(), 4);

        s.set_sma_period(3);
        assert_eq!(s.sma().len(), 2);
        assert_eq!(s.sma()[0].value, 2.0);

        s.set_sma_period(-5);
        assert_eq!(s.sma_period(), 1);
    }

    #[test]
    fn configured_period_is_taken_as_is() {
        let config = data_engine::IngestConfig::default();
        let s = ChartSession::new(config.sma_period);
        assert_eq!(s.sma_period(), 20);

        let s = ChartSession::new(usize::MAX);
        assert_eq!(s.sma_period(), usize::MAX);
    }

    #[test]
    fn clear_drops_everything() {
        let mut s = ChartSession::new(1);
        s.replace_series(series(&[1.0]));
        s.clear();
        assert!(s.series().is_empty());
        assert!(s.sma().is_empty());
        assert_eq!(s.legend_at(0), None);
    }

    #[test]
    fn legend_reads_current_data() {
        let mut s = ChartSession::new(2);
        s.replace_series(series(&[11.0, 12.0]));
        let legend = s.legend_at(60).unwrap();
        assert_eq!(legend.close, 12.0);
        assert_eq!(legend.sma, Some(11.5));
    }
}
