use serde::{Deserialize, Serialize};

/// One axis tick.
///
/// `label_only` ticks are drawn as text without a gridline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub label_only: bool,
}

impl Tick {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            value,
            label: None,
            label_only: false,
        }
    }

    #[must_use]
    pub fn labeled(value: f64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: Some(label.into()),
            label_only: false,
        }
    }

    /// Returns `true` when the tick carries a non-empty label.
    #[must_use]
    pub fn has_visible_label(&self) -> bool {
        self.label.as_deref().is_some_and(|label| !label.is_empty())
    }
}

/// One cell of a raw data row.
///
/// Which shape is meaningful depends on the active data handler: plain
/// numbers for the default handler, `[value, deviation]` for error bars,
/// `[numerator, denominator]` for fractions and `[low, mid, high]` for
/// custom bars or compressed data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Missing,
    Number(f64),
    Pair([f64; 2]),
    Triple([f64; 3]),
}

impl RawValue {
    #[must_use]
    pub fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Plain numeric view of the cell. Compound cells yield their first component.
    #[must_use]
    pub fn as_number(self) -> Option<f64> {
        match self {
            Self::Missing => None,
            Self::Number(value) => Some(value),
            Self::Pair([first, _]) => Some(first),
            Self::Triple([first, _, _]) => Some(first),
        }
    }

    #[must_use]
    pub fn as_pair(self) -> Option<[f64; 2]> {
        match self {
            Self::Pair(pair) => Some(pair),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_triple(self) -> Option<[f64; 3]> {
        match self {
            Self::Triple(triple) => Some(triple),
            _ => None,
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Option<f64>> for RawValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }
}

impl From<[f64; 2]> for RawValue {
    fn from(value: [f64; 2]) -> Self {
        Self::Pair(value)
    }
}

impl From<[f64; 3]> for RawValue {
    fn from(value: [f64; 3]) -> Self {
        Self::Triple(value)
    }
}

/// Raw input row: an x value followed by one cell per series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub x: f64,
    pub values: Vec<RawValue>,
}

impl RawRow {
    #[must_use]
    pub fn new(x: f64, values: Vec<RawValue>) -> Self {
        Self { x, values }
    }

    /// Cell for series `column` (0-based, not counting the x column).
    #[must_use]
    pub fn value(&self, column: usize) -> RawValue {
        self.values.get(column).copied().unwrap_or_default()
    }
}

/// Handler-specific payload carried next to a sample's y value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SampleExtras {
    #[default]
    None,
    /// Band edges around y (custom bars, compressed data, smoothed error bars).
    Band { low: Option<f64>, high: Option<f64> },
    /// Error bar band plus the raw deviation it was built from.
    Deviation {
        low: Option<f64>,
        high: Option<f64>,
        dev: Option<f64>,
    },
    /// Fraction counts, with the band when the handler draws one.
    Fraction {
        low: Option<f64>,
        high: Option<f64>,
        num: Option<f64>,
        den: Option<f64>,
    },
}

impl SampleExtras {
    /// Lower and upper band edges, when the shape has a band.
    #[must_use]
    pub fn band(self) -> (Option<f64>, Option<f64>) {
        match self {
            Self::None => (None, None),
            Self::Band { low, high }
            | Self::Deviation { low, high, .. }
            | Self::Fraction { low, high, .. } => (low, high),
        }
    }
}

/// One sample of an extracted series in the handler-internal form.
///
/// `y` is `None` for a gap. `Some(NaN)` is kept distinct from `None` so the
/// unsmoothed path can pass an input NaN through untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: Option<f64>,
    pub extras: SampleExtras,
}

impl Sample {
    #[must_use]
    pub fn new(x: f64, y: Option<f64>) -> Self {
        Self {
            x,
            y,
            extras: SampleExtras::None,
        }
    }

    #[must_use]
    pub fn with_extras(x: f64, y: Option<f64>, extras: SampleExtras) -> Self {
        Self { x, y, extras }
    }

    /// The y value when it is present and not NaN.
    #[must_use]
    pub fn valid_y(&self) -> Option<f64> {
        self.y.filter(|y| !y.is_nan())
    }
}

/// Uniform `[x, y, low, high]` form consumed by layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormattedSample {
    pub x: f64,
    pub y: Option<f64>,
    pub low: Option<f64>,
    pub high: Option<f64>,
}

/// Free-form note attached to one point of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub series: String,
    pub xval: f64,
    #[serde(default)]
    pub short_text: String,
    #[serde(default)]
    pub text: String,
}

/// One renderable sample of one series, in normalized plot coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
    pub xval: f64,
    pub yval: Option<f64>,
    pub name: String,
    pub idx: usize,
    pub yval_minus: Option<f64>,
    pub yval_plus: Option<f64>,
    pub y_top: Option<f64>,
    pub y_bottom: Option<f64>,
    pub annotation: Option<Annotation>,
}

impl SeriesPoint {
    /// Point whose normalized coordinates are still unset.
    #[must_use]
    pub fn unplaced(name: &str, idx: usize, sample: &FormattedSample) -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
            xval: sample.x,
            yval: sample.y,
            name: name.to_owned(),
            idx,
            yval_minus: sample.low,
            yval_plus: sample.high,
            y_top: None,
            y_bottom: None,
            annotation: None,
        }
    }
}
