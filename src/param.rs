//! Parameter value storage types.

/// A concrete value of one dimension of a [`SearchSpace`](crate::SearchSpace).
///
/// For categorical dimensions, the `Categorical` variant stores the index
/// into the choices.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamValue {
    /// A floating-point value.
    Float(f64),
    /// An integer value.
    Int(i64),
    /// A categorical value, stored as an index into the choices.
    Categorical(usize),
}

impl ParamValue {
    /// Returns the value as an `f64` if it is a `Float`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an `i64` if it is an `Int`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the choice index if the value is `Categorical`.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Categorical(i) => Some(*i),
            _ => None,
        }
    }
}

impl core::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Categorical(i) => write!(f, "choice[{i}]"),
        }
    }
}
