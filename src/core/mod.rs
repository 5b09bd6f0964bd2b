pub mod data_handler;
pub mod date_ticker;
pub mod granularity;
pub mod label_format;
pub mod layout;
pub mod numeric_ticker;
pub mod options;
pub mod scale;
pub mod timezone;
pub mod types;

pub use data_handler::{DataHandler, HandlerConfig, RebaseBase};
pub use date_ticker::{date_ticks, date_ticks_in_zone, pick_granularity};
pub use granularity::Granularity;
pub use layout::{ChartLayout, LayoutOutput, LayoutStage, PlacedTick, PlacedYTick, YAxisLayout};
pub use numeric_ticker::{numeric_linear_ticks, numeric_ticks};
pub use options::{AxisOptions, LabelFormatter, OptionValue};
pub use scale::{AxisMapping, AxisRange};
pub use timezone::{OffsetFn, UtcOffsetSource};
pub use types::{Annotation, RawRow, RawValue, Sample, SampleExtras, SeriesPoint, Tick};
