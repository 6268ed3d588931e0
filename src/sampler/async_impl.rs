use std::sync::Arc;

use crate::error::{Error, Result};
use crate::record::Token;
use crate::sampler::Sampler;
use crate::space::Point;

/// Draws the next candidate without blocking the async runtime.
///
/// A call to [`Sampler::next`] may wait on a store lock held by another
/// process, so it runs inside [`spawn_blocking`](tokio::task::spawn_blocking).
///
/// # Errors
///
/// Returns `Error::TaskError` if the blocking task panics, and otherwise
/// whatever [`Sampler::next`] returns.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use lockstep::prelude::*;
///
/// # #[cfg(feature = "async")]
/// # async fn example() -> lockstep::Result<()> {
/// let space = SearchSpace::builder().uniform("x", 0.0, 1.0).build()?;
/// let sampler = Arc::new(RandomSampler::new(Arc::new(MemoryStore::new()), space, 42)?);
///
/// let (token, point) = lockstep::sampler::next_async(Arc::clone(&sampler)).await?;
/// assert_eq!(token.id, 0);
/// assert_eq!(point.len(), 1);
/// # Ok(())
/// # }
/// ```
pub async fn next_async<S>(sampler: Arc<S>) -> Result<(Token, Point)>
where
    S: Sampler + ?Sized + 'static,
{
    trace_debug!("dispatching draw to blocking pool");
    tokio::task::spawn_blocking(move || sampler.next())
        .await
        .map_err(|e| Error::TaskError(e.to_string()))?
}
