//! Chart engine: wires options, the handler registry, tickers and layout
//! into one recompute.

mod axes;
mod chart_options;
mod engine;
mod handler_registry;

pub use axes::{AxisAssignment, RangePadding, compute_value_range, forced_tick_values};
pub use chart_options::{AxisRef, ChartOptions, SeriesOptions, StackedNanFill, XAxisKind};
pub use engine::{ChartEngine, ChartFrame};
pub use handler_registry::{HandlerFactory, HandlerRegistry};
