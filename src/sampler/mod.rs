//! Sampler trait and implementations.
//!
//! Every sampler owns a handle to a shared [`RecordStore`] and a
//! [`SearchSpace`]. A call to [`Sampler::next`] runs entirely inside one
//! exclusive store scope and inserts exactly one record, so any number of
//! samplers (in one process or many) can explore the same space through the
//! same store.

#[cfg(feature = "async")]
mod async_impl;
pub mod grid;
pub mod random;

use std::sync::Arc;

#[cfg(feature = "async")]
pub use async_impl::next_async;
pub use grid::GridSampler;
pub use random::{RandomSampler, RandomSamplerBuilder};

use crate::error::{Error, Result};
use crate::record::Token;
use crate::space::{Point, SearchSpace};
use crate::storage::RecordStore;

/// Bookkeeping shared by every sampler: the store it records draws in and
/// the space it draws from.
///
/// Samplers implement this by holding both directly.
pub trait StoreAndSpace {
    /// The record store draws are written to.
    fn store(&self) -> &Arc<dyn RecordStore>;

    /// The search space draws are taken from.
    fn space(&self) -> &SearchSpace;

    /// Records `loss` as the result of the draw identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownToken`] if the store has no record for the
    /// token, and propagates store errors.
    fn update(&self, token: &Token, loss: f64) -> Result<()> {
        let mut scope = self.store().lock()?;
        if !scope.set_loss(token.id, loss)? {
            return Err(Error::UnknownToken(token.id));
        }
        scope.release()?;
        trace_debug!(id = token.id, loss, "loss recorded");
        Ok(())
    }
}

/// A strategy for drawing the next candidate of a search space.
///
/// Implementations must be `Send + Sync` so a sampler can be shared between
/// threads, e.g. behind an `Arc`.
pub trait Sampler: StoreAndSpace + Send + Sync {
    /// Draws the next candidate, records it in the store and returns its
    /// token together with the concrete point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`] when a discrete space has no unrecorded
    /// grid point left, and propagates store errors.
    fn next(&self) -> Result<(Token, Point)>;
}
