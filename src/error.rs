/// Errors produced while building search spaces, talking to a record store,
/// or drawing samples.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when every grid point of a fully discrete space has already
    /// been recorded.
    ///
    /// This is the expected termination signal of an exploration loop, not a
    /// defect.
    #[error("search space exhausted: all {size} grid points have been drawn")]
    Exhausted {
        /// The number of grid points in the space.
        size: u64,
    },

    /// Returned when a search space is built without any dimension.
    #[error("search space must have at least one dimension")]
    ZeroDimensions,

    /// Returned when a dimension name is empty.
    #[error("dimension names cannot be empty")]
    EmptyName,

    /// Returned when two dimensions share the same name.
    #[error("duplicate dimension name '{0}'")]
    DuplicateDimension(String),

    /// Returned when a dimension uses a name reserved for record bookkeeping.
    #[error("dimension name '{0}' is reserved")]
    ReservedName(String),

    /// Returned when the lower bound is greater than the upper bound.
    #[error("invalid bounds: low ({low}) must be less than or equal to high ({high})")]
    InvalidBounds {
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when log scale is used with non-positive bounds.
    #[error("invalid log bounds: low must be positive for log scale")]
    InvalidLogBounds,

    /// Returned when step size is not positive.
    #[error("invalid step: step must be positive")]
    InvalidStep,

    /// Returned when categorical choices are empty.
    #[error("categorical choices cannot be empty")]
    EmptyChoices,

    /// Returned when a grid is requested over a space with a continuous dimension.
    #[error("grid enumeration requires every dimension to be discrete")]
    NotDiscrete,

    /// Returned when the number of grid points exceeds [`MAX_GRID_SIZE`](crate::MAX_GRID_SIZE).
    #[error("grid is too large to enumerate")]
    GridTooLarge,

    /// Returned when a coordinate vector does not match the dimension count.
    #[error("dimension mismatch: expected {expected} values, got {got}")]
    DimensionMismatch {
        /// The number of dimensions in the space.
        expected: usize,
        /// The number of values provided.
        got: usize,
    },

    /// Returned when updating a token that has no record in the store.
    #[error("no record with id {0}")]
    UnknownToken(u64),

    /// Returned when an async task fails.
    #[cfg(feature = "async")]
    #[error("async task error: {0}")]
    TaskError(String),

    /// Returned when a storage operation fails.
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = core::result::Result<T, Error>;
