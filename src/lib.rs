#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Store-synchronized random and grid search. Any number of samplers, in one
//! process or many, draw candidates from the same search space through a
//! shared record store and together produce the sequence a single sampler
//! would have produced alone.
//!
//! # Getting Started
//!
//! ```
//! use std::sync::Arc;
//!
//! use lockstep::prelude::*;
//!
//! let space = SearchSpace::builder()
//!     .uniform("lr", 0.0, 1.0)
//!     .categorical("optimizer", 3)
//!     .build()
//!     .unwrap();
//! let sampler = RandomSampler::new(Arc::new(MemoryStore::new()), space, 42).unwrap();
//!
//! let (token, point) = sampler.next().unwrap();
//! let lr = point.get("lr").and_then(ParamValue::as_f64).unwrap();
//! sampler.update(&token, (lr - 0.3).powi(2)).unwrap();
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`SearchSpace`] | Named dimensions, each with a [`Distribution`]. |
//! | [`RecordStore`](storage::RecordStore) | Shared list of records with an exclusive lock scope. |
//! | [`Sampler`](sampler::Sampler) | Draws the next candidate and records it inside one lock scope. |
//! | [`Token`] | Identifies a draw; pass it back to [`update`](sampler::StoreAndSpace::update) with the loss. |
//! | [`ParameterGrid`] | Random-access enumeration of a fully discrete space. |
//!
//! # Synchronization
//!
//! A sampler treats the number of records in the store as its step index.
//! Before drawing it fast-forwards its generator past the draws other
//! samplers made for the steps it did not see, so two samplers seeded alike
//! and alternating on one store emit exactly the records one sampler would.
//! Discrete spaces are drawn without replacement and end with
//! [`Error::Exhausted`].
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `async` | [`next_async`](sampler::next_async), running draws on tokio's blocking pool | off |
//! | `serde` | `Serialize`/`Deserialize` on records and values | off |
//! | `journal` | [`JournalStore`](storage::JournalStore), a JSONL file with an advisory file lock (enables `serde`) | on |
//! | `sqlite` | [`SqliteStore`](storage::SqliteStore), a SQLite table behind `BEGIN IMMEDIATE` (enables `serde`) | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) on every draw | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod distribution;
mod error;
mod grid;
mod param;
mod record;
mod rng;
pub mod sampler;
mod space;
pub mod storage;

pub use distribution::{
    CategoricalDistribution, Distribution, FloatDistribution, IntDistribution,
};
pub use error::{Error, Result};
pub use grid::{MAX_GRID_SIZE, ParameterGrid};
pub use param::ParamValue;
pub use record::{Record, Token};
pub use rng::{SeedSource, SharedRng};
pub use space::{Point, SearchSpace, SearchSpaceBuilder};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use lockstep::prelude::*;
/// ```
pub mod prelude {
    pub use crate::distribution::Distribution;
    pub use crate::error::{Error, Result};
    pub use crate::grid::ParameterGrid;
    pub use crate::param::ParamValue;
    pub use crate::record::{Record, Token};
    pub use crate::rng::{SeedSource, SharedRng};
    #[cfg(feature = "async")]
    pub use crate::sampler::next_async;
    pub use crate::sampler::{
        GridSampler, RandomSampler, RandomSamplerBuilder, Sampler, StoreAndSpace,
    };
    pub use crate::space::{Point, SearchSpace, SearchSpaceBuilder};
    #[cfg(feature = "journal")]
    pub use crate::storage::JournalStore;
    #[cfg(feature = "sqlite")]
    pub use crate::storage::SqliteStore;
    pub use crate::storage::{MemoryStore, RecordStore, StoreScope};
}
