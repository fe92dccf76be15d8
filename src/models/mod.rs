pub mod alert;
pub mod dashboard;
pub mod reading;

pub use alert::{AlertPair, AlertState};
pub use dashboard::{Bin, DashboardSnapshot, Distribution, Gauge, TrendPoint, TrendSeries};
pub use reading::{Metric, Reading, ReadingHistory};
