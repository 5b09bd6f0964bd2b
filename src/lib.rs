//! chart-core: tick selection, series reduction and normalized layout for
//! interactive time-series charts.
//!
//! `core` holds the pure pieces (tickers, data handlers, layout) and `api`
//! the engine that runs them against chart options and raw rows. Rendering
//! is left to the host: every position this crate produces is normalized
//! to `[0, 1]`.

pub mod api;
pub mod core;
pub mod error;
pub mod telemetry;

pub use api::{ChartEngine, ChartFrame, ChartOptions, HandlerRegistry};
pub use error::{ChartError, ChartResult};
