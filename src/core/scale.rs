use serde::{Deserialize, Serialize};

/// Inclusive value range of one axis.
///
/// The range may be inverted (`low > high`) for a reversed axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub low: f64,
    pub high: f64,
}

impl AxisRange {
    #[must_use]
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.high - self.low
    }

    /// `1 / span`, or `1.0` for a degenerate range.
    #[must_use]
    pub fn scale(self) -> f64 {
        let span = self.span();
        if span != 0.0 { 1.0 / span } else { 1.0 }
    }

    /// Maps `value` into `[0, 1]` running left to right.
    #[must_use]
    pub fn normalize(self, value: f64) -> f64 {
        (value - self.low) * self.scale()
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        let (min, max) = if self.low <= self.high {
            (self.low, self.high)
        } else {
            (self.high, self.low)
        };
        value >= min && value <= max
    }
}

/// Value to normalized-coordinate mapping of one y axis.
///
/// Normalized y runs top to bottom, so the range maximum maps to `0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisMapping {
    range: AxisRange,
    logscale: bool,
}

impl AxisMapping {
    #[must_use]
    pub fn new(range: AxisRange, logscale: bool) -> Self {
        Self { range, logscale }
    }

    #[must_use]
    pub fn range(self) -> AxisRange {
        self.range
    }

    #[must_use]
    pub fn is_logscale(self) -> bool {
        self.logscale
    }

    /// `log10(max) - log10(min)`. Non-finite when the range has a non-positive bound.
    #[must_use]
    pub fn log_range(self) -> f64 {
        self.range.high.log10() - self.range.low.log10()
    }

    #[must_use]
    pub fn has_valid_log_range(self) -> bool {
        self.log_range().is_finite()
    }

    fn log_scale(self) -> f64 {
        let log_range = self.log_range();
        if log_range != 0.0 { 1.0 / log_range } else { 1.0 }
    }

    #[must_use]
    pub fn normalize(self, value: f64) -> f64 {
        if self.logscale {
            1.0 - (value.log10() - self.range.low.log10()) * self.log_scale()
        } else {
            1.0 - (value - self.range.low) * self.range.scale()
        }
    }

    /// Normalizes an optional value; gaps map to NaN.
    #[must_use]
    pub fn normalize_opt(self, value: Option<f64>) -> f64 {
        value.map_or(f64::NAN, |value| self.normalize(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisMapping, AxisRange};
    use approx::assert_relative_eq;

    #[test]
    fn degenerate_range_uses_unit_scale() {
        let range = AxisRange::new(5.0, 5.0);
        assert_relative_eq!(range.scale(), 1.0);
        assert_relative_eq!(range.normalize(6.0), 1.0);
    }

    #[test]
    fn linear_mapping_is_inverted() {
        let mapping = AxisMapping::new(AxisRange::new(0.0, 10.0), false);
        assert_relative_eq!(mapping.normalize(10.0), 0.0);
        assert_relative_eq!(mapping.normalize(0.0), 1.0);
        assert_relative_eq!(mapping.normalize(2.5), 0.75);
    }

    #[test]
    fn log_mapping_uses_decades() {
        let mapping = AxisMapping::new(AxisRange::new(1.0, 100.0), true);
        assert_relative_eq!(mapping.normalize(10.0), 0.5);
        assert!(mapping.has_valid_log_range());
        assert!(!AxisMapping::new(AxisRange::new(0.0, 100.0), true).has_valid_log_range());
    }
}
