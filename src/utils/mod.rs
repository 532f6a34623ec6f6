//! Session bookkeeping: metrics, CSV export, SVG charts.

pub mod metrics;
pub mod export;
pub mod charts;
