pub mod session;

pub use crate::session::ChartSession;
