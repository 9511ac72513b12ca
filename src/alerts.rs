//! Status tags for KPI values.
//!
//! [`classify`] is a pure function of the value and its thresholds; it does
//! not know which KPI it is looking at.

use crate::metrics::MetricValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-KPI alert bounds. Either side may be left open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
}

impl Thresholds {
    pub fn new(low: Option<f64>, high: Option<f64>) -> Self {
        Self { low, high }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Up,
    Down,
    Flat,
    BelowLow,
    AboveHigh,
    Normal,
    /// The classified quantity had no defined value.
    Undefined,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Up => "up",
            Status::Down => "down",
            Status::Flat => "flat",
            Status::BelowLow => "below-low",
            Status::AboveHigh => "above-high",
            Status::Normal => "normal",
            Status::Undefined => "undefined",
        }
    }

    /// Whether the status should draw attention on a dashboard.
    pub fn is_alert(self) -> bool {
        matches!(self, Status::Down | Status::BelowLow | Status::AboveHigh)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Without thresholds the sign decides (`up`/`down`/`flat`). With thresholds
/// the value is checked against `low` (open means -inf) and `high` (open
/// means +inf).
pub fn classify(value: f64, thresholds: Option<&Thresholds>) -> Status {
    match thresholds {
        None => {
            if value > 0.0 {
                Status::Up
            } else if value < 0.0 {
                Status::Down
            } else {
                Status::Flat
            }
        }
        Some(t) => {
            let low = t.low.unwrap_or(f64::NEG_INFINITY);
            let high = t.high.unwrap_or(f64::INFINITY);
            if value < low {
                Status::BelowLow
            } else if value > high {
                Status::AboveHigh
            } else {
                Status::Normal
            }
        }
    }
}

pub fn classify_metric(value: MetricValue, thresholds: Option<&Thresholds>) -> Status {
    match value {
        MetricValue::Defined(v) => classify(v, thresholds),
        MetricValue::Undefined => Status::Undefined,
    }
}
