pub mod legend;
pub mod rolling_window;
pub mod sma;

pub use crate::legend::{legend_at, Legend};
pub use crate::rolling_window::RollingWindow;
pub use crate::sma::{compute_sma, point_at, IndicatorPoint};
