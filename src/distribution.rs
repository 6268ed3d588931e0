//! Dimension distribution types.
//!
//! Every distribution is uniform over its support. A distribution maps a raw
//! coordinate `x` in `[0, 1)` to a concrete [`ParamValue`]; discrete
//! distributions split the unit interval into equally wide cells, one per
//! admissible value.

use crate::error::{Error, Result};
use crate::param::ParamValue;

/// Distribution for floating-point dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatDistribution {
    /// Lower bound (inclusive).
    pub low: f64,
    /// Upper bound.
    pub high: f64,
    /// Whether to sample in log space.
    pub log_scale: bool,
    /// Optional step size for discretization. Overrides `log_scale`.
    pub step: Option<f64>,
}

/// Distribution for integer dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct IntDistribution {
    /// Lower bound (inclusive).
    pub low: i64,
    /// Upper bound (inclusive).
    pub high: i64,
    /// Optional step size; defaults to 1.
    pub step: Option<i64>,
}

/// Distribution for categorical dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoricalDistribution {
    /// Number of choices available.
    pub n_choices: usize,
}

/// Enum wrapping all dimension distribution types.
#[derive(Clone, Debug, PartialEq)]
pub enum Distribution {
    /// A floating-point distribution.
    Float(FloatDistribution),
    /// An integer distribution.
    Int(IntDistribution),
    /// A categorical distribution.
    Categorical(CategoricalDistribution),
}

impl Distribution {
    /// Uniform distribution over `[low, high)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `low > high`.
    pub fn uniform(low: f64, high: f64) -> Result<Self> {
        Self::checked(Self::Float(FloatDistribution {
            low,
            high,
            log_scale: false,
            step: None,
        }))
    }

    /// Log-uniform distribution over `[low, high)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `low > high` and
    /// [`Error::InvalidLogBounds`] if `low` is not positive.
    pub fn log_uniform(low: f64, high: f64) -> Result<Self> {
        Self::checked(Self::Float(FloatDistribution {
            low,
            high,
            log_scale: true,
            step: None,
        }))
    }

    /// Float values `low, low + step, ...` up to `high`. This distribution
    /// is discrete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `low > high` and
    /// [`Error::InvalidStep`] if `step` is not positive.
    pub fn quantized(low: f64, high: f64, step: f64) -> Result<Self> {
        Self::checked(Self::Float(FloatDistribution {
            low,
            high,
            log_scale: false,
            step: Some(step),
        }))
    }

    /// Every integer in `[low, high]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `low > high`.
    pub fn int(low: i64, high: i64) -> Result<Self> {
        Self::checked(Self::Int(IntDistribution {
            low,
            high,
            step: None,
        }))
    }

    /// Integers `low, low + step, ...` up to `high`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `low > high` and
    /// [`Error::InvalidStep`] if `step` is not positive.
    pub fn int_step(low: i64, high: i64, step: i64) -> Result<Self> {
        Self::checked(Self::Int(IntDistribution {
            low,
            high,
            step: Some(step),
        }))
    }

    /// `n_choices` unordered choices, represented by their index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyChoices`] if `n_choices` is zero.
    pub fn categorical(n_choices: usize) -> Result<Self> {
        Self::checked(Self::Categorical(CategoricalDistribution { n_choices }))
    }

    fn checked(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Checks bounds, steps and choices.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::Float(d) => {
                if d.low.is_nan() || d.high.is_nan() || d.low > d.high {
                    return Err(Error::InvalidBounds {
                        low: d.low,
                        high: d.high,
                    });
                }
                if let Some(step) = d.step {
                    // NaN and infinite steps are not finite.
                    if !step.is_finite() || step <= 0.0 {
                        return Err(Error::InvalidStep);
                    }
                } else if d.log_scale && d.low <= 0.0 {
                    return Err(Error::InvalidLogBounds);
                }
                Ok(())
            }
            Self::Int(d) => {
                if d.low > d.high {
                    return Err(Error::InvalidBounds {
                        low: d.low as f64,
                        high: d.high as f64,
                    });
                }
                if d.step.is_some_and(|s| s <= 0) {
                    return Err(Error::InvalidStep);
                }
                Ok(())
            }
            Self::Categorical(d) => {
                if d.n_choices == 0 {
                    return Err(Error::EmptyChoices);
                }
                Ok(())
            }
        }
    }

    /// Whether this distribution has a finite number of values.
    #[must_use]
    pub fn is_discrete(&self) -> bool {
        match self {
            Self::Float(d) => d.step.is_some(),
            Self::Int(_) | Self::Categorical(_) => true,
        }
    }

    /// Number of distinct values, or `None` for continuous distributions
    /// and for integer ranges too wide to count in a `u64`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cardinality(&self) -> Option<u64> {
        match self {
            Self::Float(d) => d.step.map(|_| self.cell_count() as u64),
            Self::Int(d) => {
                let step = i128::from(d.step.unwrap_or(1));
                let span = i128::from(d.high) - i128::from(d.low);
                u64::try_from(span / step + 1).ok()
            }
            Self::Categorical(d) => Some(d.n_choices as u64),
        }
    }

    /// Maps a raw coordinate in `[0, 1)` to a concrete value.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn map_unit(&self, x: f64) -> ParamValue {
        match self {
            Self::Float(d) => {
                let value = if let Some(step) = d.step {
                    (d.low + self.cell(x) * step).min(d.high)
                } else if d.log_scale {
                    let log_low = d.low.ln();
                    let log_high = d.high.ln();
                    (log_low + x * (log_high - log_low)).exp()
                } else {
                    d.low + x * (d.high - d.low)
                };
                ParamValue::Float(value.clamp(d.low, d.high))
            }
            Self::Int(d) => {
                let step = i128::from(d.step.unwrap_or(1));
                let value = i128::from(d.low) + self.cell(x) as i128 * step;
                let value = value.min(i128::from(d.high));
                ParamValue::Int(i64::try_from(value).unwrap_or(d.high))
            }
            Self::Categorical(_) => ParamValue::Categorical(self.cell(x) as usize),
        }
    }

    /// Number of cells the unit interval is split into. Continuous
    /// distributions count as a single cell.
    #[allow(clippy::cast_precision_loss)]
    fn cell_count(&self) -> f64 {
        match self {
            Self::Float(d) => d.step.map_or(1.0, |step| {
                // Tolerate representation error so `high` itself stays reachable.
                ((d.high - d.low) / step + 1e-9).floor() + 1.0
            }),
            Self::Int(d) => {
                let step = i128::from(d.step.unwrap_or(1));
                ((i128::from(d.high) - i128::from(d.low)) / step + 1) as f64
            }
            Self::Categorical(d) => d.n_choices as f64,
        }
    }

    /// Index of the cell containing `x`, as a float.
    fn cell(&self, x: f64) -> f64 {
        if x.is_nan() {
            return 0.0;
        }
        let n = self.cell_count();
        (x * n).floor().clamp(0.0, n - 1.0)
    }
}
