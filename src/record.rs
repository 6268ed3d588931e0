//! Tokens and the records persisted for every draw.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Serialized name of the token id field.
pub(crate) const ID_FIELD: &str = "_id";

/// Serialized name of the loss field.
pub(crate) const LOSS_FIELD: &str = "_loss";

/// Identifies one draw.
///
/// For a fully discrete space the id is the chosen grid index; otherwise it
/// is the step index (store size) at the time of the draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    /// The unique identifier of the draw.
    #[cfg_attr(feature = "serde", serde(rename = "_id"))]
    pub id: u64,
}

impl Token {
    /// Creates a token with the given id.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// The persisted unit of a store: a token merged with the raw unit-cube
/// value of every dimension.
///
/// Only plain `u64` and `f64` scalars are kept so that any backend can
/// store them without loss. When serialized, the raw values sit next to
/// `_id` (and `_loss` once a result has been reported), one field per
/// dimension name.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    /// The token fields.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub token: Token,
    /// Loss reported for this draw, if any.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "_loss", default, skip_serializing_if = "Option::is_none")
    )]
    pub loss: Option<f64>,
    /// Raw value in `[0, 1)` per dimension name.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub values: BTreeMap<String, f64>,
}

impl Record {
    /// Pairs dimension names with raw values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `names` and `raw` differ in
    /// length.
    pub fn new(token: Token, names: &[String], raw: &[f64]) -> Result<Self> {
        if names.len() != raw.len() {
            return Err(Error::DimensionMismatch {
                expected: names.len(),
                got: raw.len(),
            });
        }
        let values = names.iter().cloned().zip(raw.iter().copied()).collect();
        Ok(Self {
            token,
            loss: None,
            values,
        })
    }

    /// The record id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.token.id
    }

    /// Raw values in the order of `names`, or `None` if one is missing.
    #[must_use]
    pub fn raw(&self, names: &[String]) -> Option<Vec<f64>> {
        names.iter().map(|n| self.values.get(n).copied()).collect()
    }
}
