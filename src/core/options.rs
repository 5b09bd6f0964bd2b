use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::granularity::Granularity;

/// Custom tick label callback.
///
/// Receives the tick value and the date granularity in use. Numeric ticks
/// pass `None`.
#[derive(Clone)]
pub struct LabelFormatter(Arc<dyn Fn(f64, Option<Granularity>, &AxisOptions) -> String + Send + Sync>);

impl LabelFormatter {
    pub fn new<F>(format: F) -> Self
    where
        F: Fn(f64, Option<Granularity>, &AxisOptions) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(format))
    }

    #[must_use]
    pub fn format(&self, value: f64, granularity: Option<Granularity>, options: &AxisOptions) -> String {
        (self.0)(value, granularity, options)
    }
}

impl fmt::Debug for LabelFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LabelFormatter(..)")
    }
}

impl PartialEq for LabelFormatter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Per-axis options read by tickers, label formatters and range computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisOptions {
    #[serde(default = "default_pixels_per_label")]
    pub pixels_per_label: f64,
    #[serde(default)]
    pub logscale: bool,
    #[serde(default)]
    pub labels_kmb: bool,
    #[serde(default)]
    pub labels_kmg2: bool,
    #[serde(default = "default_digits_after_decimal")]
    pub digits_after_decimal: u32,
    #[serde(default = "default_max_number_width")]
    pub max_number_width: i32,
    #[serde(default)]
    pub sig_figs: Option<u32>,
    #[serde(default)]
    pub labels_utc: bool,
    /// First day of a week for weekly date ticks, `0` = Sunday.
    #[serde(default)]
    pub week_start: u32,
    #[serde(default)]
    pub include_zero: bool,
    /// Explicit `[min, max]`; a missing bound keeps the computed one.
    #[serde(default)]
    pub value_range: Option<[Option<f64>; 2]>,
    /// Secondary axes tick on their own instead of mirroring the primary axis.
    #[serde(default)]
    pub independent_ticks: bool,
    #[serde(skip)]
    pub axis_label_formatter: Option<LabelFormatter>,
}

/// Value returned by [`AxisOptions::option`].
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Number(f64),
    Bool(bool),
    Formatter(LabelFormatter),
}

impl OptionValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self {
            pixels_per_label: default_pixels_per_label(),
            logscale: false,
            labels_kmb: false,
            labels_kmg2: false,
            digits_after_decimal: default_digits_after_decimal(),
            max_number_width: default_max_number_width(),
            sig_figs: None,
            labels_utc: false,
            week_start: 0,
            include_zero: false,
            value_range: None,
            independent_ticks: false,
            axis_label_formatter: None,
        }
    }
}

impl AxisOptions {
    /// Defaults for an x axis, which labels less densely than y axes.
    #[must_use]
    pub fn x_axis() -> Self {
        Self {
            pixels_per_label: DEFAULT_X_PIXELS_PER_LABEL,
            ..Self::default()
        }
    }

    /// Looks an option up by its camel-case name.
    ///
    /// Returns `None` for unknown names and for unset optional values.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<OptionValue> {
        match name {
            "pixelsPerLabel" => Some(OptionValue::Number(self.pixels_per_label)),
            "logscale" => Some(OptionValue::Bool(self.logscale)),
            "labelsKMB" => Some(OptionValue::Bool(self.labels_kmb)),
            "labelsKMG2" => Some(OptionValue::Bool(self.labels_kmg2)),
            "labelsUTC" => Some(OptionValue::Bool(self.labels_utc)),
            "digitsAfterDecimal" => {
                Some(OptionValue::Number(f64::from(self.digits_after_decimal)))
            }
            "maxNumberWidth" => Some(OptionValue::Number(f64::from(self.max_number_width))),
            "sigFigs" => self.sig_figs.map(|sig| OptionValue::Number(f64::from(sig))),
            "includeZero" => Some(OptionValue::Bool(self.include_zero)),
            "independentTicks" => Some(OptionValue::Bool(self.independent_ticks)),
            "axisLabelFormatter" => self.axis_label_formatter.clone().map(OptionValue::Formatter),
            _ => None,
        }
    }

    #[must_use]
    pub fn with_pixels_per_label(mut self, pixels_per_label: f64) -> Self {
        self.pixels_per_label = pixels_per_label;
        self
    }

    #[must_use]
    pub fn with_logscale(mut self, logscale: bool) -> Self {
        self.logscale = logscale;
        self
    }

    #[must_use]
    pub fn with_labels_kmb(mut self, enabled: bool) -> Self {
        self.labels_kmb = enabled;
        self
    }

    #[must_use]
    pub fn with_labels_kmg2(mut self, enabled: bool) -> Self {
        self.labels_kmg2 = enabled;
        self
    }

    #[must_use]
    pub fn with_digits_after_decimal(mut self, digits: u32) -> Self {
        self.digits_after_decimal = digits;
        self
    }

    #[must_use]
    pub fn with_sig_figs(mut self, sig_figs: Option<u32>) -> Self {
        self.sig_figs = sig_figs;
        self
    }

    #[must_use]
    pub fn with_labels_utc(mut self, utc: bool) -> Self {
        self.labels_utc = utc;
        self
    }

    #[must_use]
    pub fn with_include_zero(mut self, include_zero: bool) -> Self {
        self.include_zero = include_zero;
        self
    }

    #[must_use]
    pub fn with_value_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.value_range = Some([min, max]);
        self
    }

    #[must_use]
    pub fn with_independent_ticks(mut self, independent: bool) -> Self {
        self.independent_ticks = independent;
        self
    }

    #[must_use]
    pub fn with_label_formatter(mut self, formatter: LabelFormatter) -> Self {
        self.axis_label_formatter = Some(formatter);
        self
    }
}

pub const DEFAULT_X_PIXELS_PER_LABEL: f64 = 70.0;
pub const DEFAULT_Y_PIXELS_PER_LABEL: f64 = 30.0;

fn default_pixels_per_label() -> f64 {
    DEFAULT_Y_PIXELS_PER_LABEL
}

fn default_digits_after_decimal() -> u32 {
    2
}

fn default_max_number_width() -> i32 {
    6
}
