use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::options::AxisOptions;
use crate::core::types::Annotation;
use crate::core::{HandlerConfig, RebaseBase};
use crate::error::{ChartError, ChartResult};

/// How the x values of the data are interpreted for ticking and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxisKind {
    #[default]
    Numeric,
    /// Epoch milliseconds.
    Date,
}

/// How gaps are filled when stacking series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackedNanFill {
    /// Interpolate between neighbours, extend at both ends.
    #[default]
    All,
    /// Interpolate between neighbours only.
    Inside,
    /// Gaps contribute zero.
    None,
}

/// Which y axis a series is drawn against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisRef {
    /// Share the axis defined by another series.
    SameAs(String),
    /// Define a new secondary axis.
    Own(Box<AxisOptions>),
}

/// Per-series options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesOptions {
    #[serde(default)]
    pub axis: Option<AxisRef>,
}

impl SeriesOptions {
    #[must_use]
    pub fn on_own_axis(axis: AxisOptions) -> Self {
        Self {
            axis: Some(AxisRef::Own(Box::new(axis))),
        }
    }

    #[must_use]
    pub fn sharing_axis_of(series: impl Into<String>) -> Self {
        Self {
            axis: Some(AxisRef::SameAs(series.into())),
        }
    }
}

/// Chart-level options consumed by [`super::ChartEngine`].
///
/// `labels` names every column of the data, x first. Series without an
/// entry in `series` use the primary y axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub x_axis_kind: XAxisKind,
    #[serde(default = "default_x_axis")]
    pub x_axis: AxisOptions,
    #[serde(default)]
    pub y_axis: AxisOptions,
    #[serde(default)]
    pub series: IndexMap<String, SeriesOptions>,
    #[serde(default)]
    pub error_bars: bool,
    #[serde(default)]
    pub custom_bars: bool,
    #[serde(default)]
    pub fractions: bool,
    /// Explicit handler name; overrides the shape flags.
    #[serde(default)]
    pub data_handler: Option<String>,
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    #[serde(default = "default_wilson_interval")]
    pub wilson_interval: bool,
    #[serde(default = "default_roll_period")]
    pub roll_period: usize,
    #[serde(default)]
    pub date_window: Option<[f64; 2]>,
    #[serde(default)]
    pub stacked_graph: bool,
    #[serde(default)]
    pub stacked_graph_nan_fill: StackedNanFill,
    #[serde(default)]
    pub step_plot: bool,
    /// Y padding in pixels. When unset, automatic ranges get 10% padding.
    #[serde(default)]
    pub y_range_pad: Option<f64>,
    #[serde(default)]
    pub avoid_min_zero: bool,
    #[serde(default)]
    pub rebase: RebaseBase,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            x_axis_kind: XAxisKind::default(),
            x_axis: default_x_axis(),
            y_axis: AxisOptions::default(),
            series: IndexMap::new(),
            error_bars: false,
            custom_bars: false,
            fractions: false,
            data_handler: None,
            sigma: default_sigma(),
            wilson_interval: default_wilson_interval(),
            roll_period: default_roll_period(),
            date_window: None,
            stacked_graph: false,
            stacked_graph_nan_fill: StackedNanFill::default(),
            step_plot: false,
            y_range_pad: None,
            avoid_min_zero: false,
            rebase: RebaseBase::default(),
            annotations: Vec::new(),
        }
    }
}

impl ChartOptions {
    /// Creates options for columns named `labels`, x first.
    #[must_use]
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Series names, in declaration order.
    #[must_use]
    pub fn series_names(&self) -> &[String] {
        self.labels.get(1..).unwrap_or_default()
    }

    /// Name of the data handler these options select.
    #[must_use]
    pub fn handler_name(&self) -> &str {
        if let Some(name) = &self.data_handler {
            return name;
        }
        match (self.error_bars, self.custom_bars, self.fractions) {
            (true, _, true) => "bars-fractions",
            (true, _, false) => "bars-error",
            (false, true, _) => "bars-custom",
            (false, false, true) => "default-fractions",
            (false, false, false) => "default",
        }
    }

    #[must_use]
    pub fn handler_config(&self) -> HandlerConfig {
        HandlerConfig {
            sigma: self.sigma,
            wilson_interval: self.wilson_interval,
            rebase: self.rebase,
        }
    }

    #[must_use]
    pub fn with_x_axis_kind(mut self, kind: XAxisKind) -> Self {
        self.x_axis_kind = kind;
        self
    }

    #[must_use]
    pub fn with_x_axis(mut self, axis: AxisOptions) -> Self {
        self.x_axis = axis;
        self
    }

    #[must_use]
    pub fn with_y_axis(mut self, axis: AxisOptions) -> Self {
        self.y_axis = axis;
        self
    }

    #[must_use]
    pub fn with_series(mut self, name: impl Into<String>, options: SeriesOptions) -> Self {
        self.series.insert(name.into(), options);
        self
    }

    #[must_use]
    pub fn with_error_bars(mut self, enabled: bool) -> Self {
        self.error_bars = enabled;
        self
    }

    #[must_use]
    pub fn with_custom_bars(mut self, enabled: bool) -> Self {
        self.custom_bars = enabled;
        self
    }

    #[must_use]
    pub fn with_fractions(mut self, enabled: bool) -> Self {
        self.fractions = enabled;
        self
    }

    #[must_use]
    pub fn with_data_handler(mut self, name: impl Into<String>) -> Self {
        self.data_handler = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_roll_period(mut self, roll_period: usize) -> Self {
        self.roll_period = roll_period;
        self
    }

    #[must_use]
    pub fn with_date_window(mut self, window: Option<[f64; 2]>) -> Self {
        self.date_window = window;
        self
    }

    #[must_use]
    pub fn with_stacked_graph(mut self, stacked: bool) -> Self {
        self.stacked_graph = stacked;
        self
    }

    #[must_use]
    pub fn with_step_plot(mut self, step_plot: bool) -> Self {
        self.step_plot = step_plot;
        self
    }

    #[must_use]
    pub fn with_y_range_pad(mut self, pad: Option<f64>) -> Self {
        self.y_range_pad = pad;
        self
    }

    #[must_use]
    pub fn with_avoid_min_zero(mut self, avoid: bool) -> Self {
        self.avoid_min_zero = avoid;
        self
    }

    #[must_use]
    pub fn with_rebase(mut self, rebase: RebaseBase) -> Self {
        self.rebase = rebase;
        self
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Serializes options to pretty JSON. Label formatter callbacks are skipped.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidOptions(format!("failed to serialize options: {e}")))
    }

    /// Deserializes options from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidOptions(format!("failed to parse options: {e}")))
    }
}

fn default_x_axis() -> AxisOptions {
    AxisOptions::x_axis()
}

fn default_sigma() -> f64 {
    2.0
}

fn default_wilson_interval() -> bool {
    true
}

fn default_roll_period() -> usize {
    1
}
