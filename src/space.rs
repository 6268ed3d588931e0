//! Search spaces and the points drawn from them.
//!
//! A [`SearchSpace`] is an ordered list of named dimensions. Samplers never
//! produce concrete values directly: they draw a raw coordinate vector in the
//! unit cube `[0, 1)^n` and let the space map it with
//! [`SearchSpace::map_unit`].
//!
//! # Example
//!
//! ```
//! use lockstep::SearchSpace;
//!
//! let space = SearchSpace::builder()
//!     .log_uniform("learning_rate", 1e-5, 1e-1)
//!     .int("layers", 1, 4)
//!     .categorical("activation", 3)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(space.len(), 3);
//! assert!(!space.is_discrete());
//!
//! let point = space.map_unit(&[0.0, 0.5, 0.9]).unwrap();
//! assert_eq!(point.get("layers").and_then(|v| v.as_i64()), Some(3));
//! ```

use std::collections::HashSet;

use crate::distribution::{
    CategoricalDistribution, Distribution, FloatDistribution, IntDistribution,
};
use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::record::{ID_FIELD, LOSS_FIELD};

/// An ordered collection of named dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchSpace {
    names: Vec<String>,
    distributions: Vec<Distribution>,
}

impl SearchSpace {
    /// Creates a builder for a new search space.
    #[must_use]
    pub fn builder() -> SearchSpaceBuilder {
        SearchSpaceBuilder::default()
    }

    /// Dimension names, in dimension order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Dimension distributions, in dimension order.
    #[must_use]
    pub fn distributions(&self) -> &[Distribution] {
        &self.distributions
    }

    /// Number of dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always `false`: a built space has at least one dimension.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether every dimension is discrete, in which case the space can be
    /// enumerated by a [`ParameterGrid`](crate::ParameterGrid).
    #[must_use]
    pub fn is_discrete(&self) -> bool {
        self.distributions.iter().all(Distribution::is_discrete)
    }

    /// Maps a raw coordinate vector in `[0, 1)^n` to concrete values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `raw` does not have one value
    /// per dimension.
    pub fn map_unit(&self, raw: &[f64]) -> Result<Point> {
        if raw.len() != self.len() {
            return Err(Error::DimensionMismatch {
                expected: self.len(),
                got: raw.len(),
            });
        }
        let entries = self
            .names
            .iter()
            .zip(&self.distributions)
            .zip(raw)
            .map(|((name, dist), &x)| (name.clone(), dist.map_unit(x)))
            .collect();
        Ok(Point { entries })
    }
}

/// Fluent builder for [`SearchSpace`].
///
/// Dimensions keep the order in which they are added. Validation happens in
/// [`build`](Self::build).
#[derive(Clone, Debug, Default)]
pub struct SearchSpaceBuilder {
    names: Vec<String>,
    distributions: Vec<Distribution>,
}

impl SearchSpaceBuilder {
    /// Adds a dimension with an explicit distribution.
    #[must_use]
    pub fn dimension(mut self, name: impl Into<String>, distribution: Distribution) -> Self {
        self.names.push(name.into());
        self.distributions.push(distribution);
        self
    }

    /// Adds a uniform float dimension over `[low, high)`.
    #[must_use]
    pub fn uniform(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.float(name, low, high, false, None)
    }

    /// Adds a log-uniform float dimension over `[low, high)`.
    #[must_use]
    pub fn log_uniform(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.float(name, low, high, true, None)
    }

    /// Adds a discrete float dimension `low, low + step, ...` up to `high`.
    #[must_use]
    pub fn quantized(self, name: impl Into<String>, low: f64, high: f64, step: f64) -> Self {
        self.float(name, low, high, false, Some(step))
    }

    /// Adds an integer dimension over `[low, high]`.
    #[must_use]
    pub fn int(self, name: impl Into<String>, low: i64, high: i64) -> Self {
        self.dimension(
            name,
            Distribution::Int(IntDistribution {
                low,
                high,
                step: None,
            }),
        )
    }

    /// Adds an integer dimension `low, low + step, ...` up to `high`.
    #[must_use]
    pub fn int_step(self, name: impl Into<String>, low: i64, high: i64, step: i64) -> Self {
        self.dimension(
            name,
            Distribution::Int(IntDistribution {
                low,
                high,
                step: Some(step),
            }),
        )
    }

    /// Adds a categorical dimension with `n_choices` choices.
    #[must_use]
    pub fn categorical(self, name: impl Into<String>, n_choices: usize) -> Self {
        self.dimension(
            name,
            Distribution::Categorical(CategoricalDistribution { n_choices }),
        )
    }

    fn float(
        self,
        name: impl Into<String>,
        low: f64,
        high: f64,
        log_scale: bool,
        step: Option<f64>,
    ) -> Self {
        self.dimension(
            name,
            Distribution::Float(FloatDistribution {
                low,
                high,
                log_scale,
                step,
            }),
        )
    }

    /// Validates the dimensions and builds the space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroDimensions`] for an empty space,
    /// [`Error::EmptyName`], [`Error::DuplicateDimension`] or
    /// [`Error::ReservedName`] for invalid names, and the distribution's
    /// own validation error for invalid bounds, steps or choices.
    pub fn build(self) -> Result<SearchSpace> {
        if self.names.is_empty() {
            return Err(Error::ZeroDimensions);
        }

        let mut seen = HashSet::with_capacity(self.names.len());
        for (name, dist) in self.names.iter().zip(&self.distributions) {
            if name.is_empty() {
                return Err(Error::EmptyName);
            }
            if name == ID_FIELD || name == LOSS_FIELD {
                return Err(Error::ReservedName(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::DuplicateDimension(name.clone()));
            }
            dist.validate()?;
        }

        Ok(SearchSpace {
            names: self.names,
            distributions: self.distributions,
        })
    }
}

/// Concrete values for every dimension of a space, in dimension order.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    entries: Vec<(String, ParamValue)>,
}

impl Point {
    /// Returns the value of the named dimension.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterates over `(name, value)` pairs in dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the point has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the point, returning its `(name, value)` pairs.
    #[must_use]
    pub fn into_vec(self) -> Vec<(String, ParamValue)> {
        self.entries
    }
}
