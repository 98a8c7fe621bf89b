//! Crosshair readout: the bar and SMA value under a given time.

use std::fmt;

use data_engine::{Bar, Series};

use crate::sma::{point_at, IndicatorPoint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Legend {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub sma: Option<f64>,
}

impl Legend {
    pub fn from_bar(bar: &Bar, sma: Option<f64>) -> Self {
        Self {
            time: bar.time,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            sma,
        }
    }
}

impl fmt::Display for Legend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "O {:.2} H {:.2} L {:.2} C {:.2}",
            self.open, self.high, self.low, self.close
        )?;
        match self.sma {
            Some(v) => write!(f, " SMA {:.2}", v),
            None => f.write_str(" SMA —"),
        }
    }
}

/// Read-only lookup into already computed data. `None` when no bar sits at `time`.
pub fn legend_at(series: &Series, sma: &[IndicatorPoint], time: i64) -> Option<Legend> {
    let bar = series.bar_at(time)?;
    let value = point_at(sma, time).map(|p| p.value);
    Some(Legend::from_bar(bar, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sma::compute_sma;
    use data_engine::assemble;

    fn series() -> Series {
        assemble(
            [(120, 12.0), (60, 11.0), (0, 10.0)]
                .into_iter()
                .map(|(time, close)| Bar { time, open: 10.5, high: 13.0, low: 9.0, close, volume: None })
                .collect(),
        )
    }

    #[test]
    fn legend_with_and_without_sma() {
        let s = series();
        let sma = compute_sma(s.bars(), 2);

        let first = legend_at(&s, &sma, 0).unwrap();
        assert_eq!(first.sma, None);
        assert_eq!(first.to_string(), "O 10.50 H 13.00 L 9.00 C 10.00 SMA —");

        let last = legend_at(&s, &sma, 120).unwrap();
        assert_eq!(last.sma, Some(11.5));
        assert_eq!(last.to_string(), "O 10.50 H 13.00 L 9.00 C 12.00 SMA 11.50");
    }

    #[test]
    fn no_bar_no_legend() {
        let s = series();
        assert_eq!(legend_at(&s, &[], 30), None);
    }
}
