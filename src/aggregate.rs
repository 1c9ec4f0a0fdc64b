//! Sequence → scalar reductions
//!
//! Per-timestep sequences are reduced through trueno vectors
//! (AVX-512/AVX2/SSE2/NEON auto-detected). Sums use Kahan compensation
//! unless the data contains non-finite values.
//!
//! trueno vectors hold `f32`, so samples are narrowed before reducing:
//! results carry roughly seven significant digits, and finite samples beyond
//! the `f32` range saturate at `±f32::MAX` instead of becoming infinite.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use trueno::Vector;

use crate::Error;

/// Named reduction applied to one episode's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregator {
    /// Largest sample
    Max,
    /// Smallest sample
    Min,
    /// Sum of samples
    Sum,
    /// Arithmetic mean
    Mean,
}

impl Aggregator {
    /// Every accepted aggregator.
    pub const ALL: &'static [Self] = &[Self::Max, Self::Min, Self::Sum, Self::Mean];

    /// Aggregator name as used in declarations and axis labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Sum => "sum",
            Self::Mean => "mean",
        }
    }

    /// Reduce a sequence to one value.
    ///
    /// Returns `None` for an empty sequence. Samples are reduced in `f32`
    /// precision; see the module docs.
    ///
    /// # Example
    ///
    /// ```rust
    /// use run_plotter::aggregate::Aggregator;
    ///
    /// let data = [1.0, 2.0, 3.0, 4.0];
    /// assert_eq!(Aggregator::Sum.apply(&data), Some(10.0));
    /// assert_eq!(Aggregator::Mean.apply(&data), Some(2.5));
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(self, data: &[f64]) -> Option<f64> {
        if data.is_empty() {
            return None;
        }

        let lanes: Vec<f32> = data.iter().copied().map(narrow).collect();
        let vector = Vector::from_slice(&lanes);

        match self {
            Self::Max => vector.max().ok().map(f64::from),
            Self::Min => vector.min().ok().map(f64::from),
            Self::Sum => Some(f64::from(simd_sum(&vector, &lanes))),
            #[allow(clippy::cast_precision_loss)]
            Self::Mean => Some(f64::from(simd_sum(&vector, &lanes)) / data.len() as f64),
        }
    }
}

/// Narrow to `f32`, saturating finite values that do not fit.
#[allow(clippy::cast_possible_truncation)]
fn narrow(value: f64) -> f32 {
    if value.is_finite() {
        value.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32
    } else {
        value as f32
    }
}

/// trueno's Kahan sum misbehaves on infinities, fall back to the plain sum.
fn simd_sum(vector: &Vector<f32>, lanes: &[f32]) -> f32 {
    if lanes.iter().any(|x| !x.is_finite()) {
        return vector.sum().unwrap_or(0.0);
    }
    vector.sum_kahan().unwrap_or(0.0)
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|agg| agg.as_str() == s)
            .ok_or_else(|| Error::invalid_key("aggregator", s))
    }
}
