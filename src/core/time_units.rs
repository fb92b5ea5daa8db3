use serde::{Deserialize, Serialize};

use crate::error::{ViewError, ViewResult};

/// Spans at or below this many seconds are displayed in nanoseconds.
pub const NANOSECOND_THRESHOLD_S: f64 = 0.5e-6;

/// Display unit for relative time axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
}

impl TimeUnit {
    #[must_use]
    pub fn for_span(span_seconds: f64) -> Self {
        if span_seconds <= NANOSECOND_THRESHOLD_S {
            Self::Nanoseconds
        } else {
            Self::Microseconds
        }
    }

    /// Multiplier from seconds to this unit.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Nanoseconds => 1e9,
            Self::Microseconds => 1e6,
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "µs",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nanoseconds => "Relative Time [ns]",
            Self::Microseconds => "Relative Time [µs]",
        }
    }

    #[must_use]
    pub fn scale(self, seconds: f64) -> f64 {
        seconds * self.factor()
    }

    /// Formats a duration rounded to whole units, e.g. `250ns`.
    #[must_use]
    pub fn format_duration(self, seconds: f64) -> String {
        format!("{:.0}{}", self.scale(seconds), self.symbol())
    }
}

/// SI prefixes for seconds, smallest first.
const SI_TIME_UNITS: [&str; 6] = ["fs", "ps", "ns", "µs", "ms", "s"];

/// Formats seconds with the SI prefix that keeps the mantissa in `[1, 1000)`,
/// rounded to `precision` significant digits: `0.5e-6` is `"500 ns"`.
#[must_use]
pub fn format_time(seconds: f64, precision: usize) -> String {
    if !seconds.is_finite() {
        return format!("{seconds} s");
    }
    if seconds == 0.0 {
        return "0 s".to_owned();
    }

    let precision = precision.max(1) as i32;
    let rounded = round_significant(seconds, precision);
    let exponent = (rounded.abs().log10() + 1e-9).floor() as i32;
    // fs is index 0 (1e-15), s is index 5 (1e0).
    let unit_index = (exponent.div_euclid(3) + 5).clamp(0, 5);
    let mantissa = rounded * 10f64.powi((5 - unit_index) * 3);

    let magnitude = (mantissa.abs().log10() + 1e-9).floor() as i32;
    let decimals = (precision - 1 - magnitude).max(0) as usize;
    let mut text = format!("{mantissa:.decimals$}");
    if text.contains('.') {
        text = text.trim_end_matches('0').trim_end_matches('.').to_owned();
    }
    format!("{text} {}", SI_TIME_UNITS[unit_index as usize])
}

fn round_significant(value: f64, digits: i32) -> f64 {
    let magnitude = value.abs().log10().floor() as i32;
    let shift = digits - 1 - magnitude;
    if shift >= 0 {
        let scale = 10f64.powi(shift);
        (value * scale).round() / scale
    } else {
        let scale = 10f64.powi(-shift);
        (value / scale).round() * scale
    }
}

/// One selectable zoom span with its display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomLevel {
    /// Span in seconds.
    pub value: f64,
    pub label: String,
}

/// Zoom spans of the form `{1, 2, 5} x 10^n` lying strictly between
/// `lower_limit` and `upper_limit`, capped at half of `upper_limit`.
///
/// Typically `lower_limit` is the sample interval and `upper_limit` the
/// duration of the series. Results are sorted ascending.
pub fn generate_zoom_levels(lower_limit: f64, upper_limit: f64) -> ViewResult<Vec<f64>> {
    if !(lower_limit.is_finite() && upper_limit.is_finite())
        || lower_limit <= 0.0
        || upper_limit <= 0.0
    {
        return Err(ViewError::InvalidData(format!(
            "zoom limits must be finite and positive, got [{lower_limit}, {upper_limit}]"
        )));
    }
    if lower_limit >= upper_limit {
        return Err(ViewError::InvalidData(format!(
            "zoom lower limit {lower_limit} must be smaller than upper limit {upper_limit}"
        )));
    }

    let max_allowed = upper_limit / 2.0 + upper_limit * 1e-12;
    let mut levels = Vec::new();
    // One decade of slack below the lower limit absorbs log10 rounding.
    let mut exponent = lower_limit.log10().floor() as i32 - 1;
    while decade(1.0, exponent) < upper_limit {
        for factor in [1.0, 2.0, 5.0] {
            let value = decade(factor, exponent);
            if value > lower_limit && value < upper_limit && value <= max_allowed {
                levels.push(value);
            }
        }
        exponent += 1;
    }
    Ok(levels)
}

/// [`generate_zoom_levels`] with each span labelled by [`format_time`] at
/// three significant digits.
pub fn generate_zoom_levels_with_labels(
    lower_limit: f64,
    upper_limit: f64,
) -> ViewResult<Vec<ZoomLevel>> {
    Ok(generate_zoom_levels(lower_limit, upper_limit)?
        .into_iter()
        .map(|value| ZoomLevel {
            value,
            label: format_time(value, 3),
        })
        .collect())
}

// Exact for the decades involved: one multiply or divide by an exact power.
fn decade(factor: f64, exponent: i32) -> f64 {
    if exponent >= 0 {
        factor * 10f64.powi(exponent)
    } else {
        factor / 10f64.powi(-exponent)
    }
}
