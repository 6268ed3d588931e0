//! Generator handles and the entropy-unit primitives the samplers rely on.
//!
//! One *entropy unit* is one 64-bit output of the generator. Every primitive
//! here consumes exactly one unit per scalar it produces, which is what lets
//! a sampler fast-forward its generator by counting steps instead of
//! replaying them.

use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, MutexGuard};

/// A cloneable handle to a generator that can be shared between samplers.
///
/// Clones refer to the same underlying generator.
#[derive(Clone, Debug)]
pub struct SharedRng(Arc<Mutex<fastrand::Rng>>);

impl SharedRng {
    /// Wraps a generator.
    #[must_use]
    pub fn new(rng: fastrand::Rng) -> Self {
        Self(Arc::new(Mutex::new(rng)))
    }

    /// Creates a handle to a new generator seeded with `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::new(fastrand::Rng::with_seed(seed))
    }

    /// The process-wide default generator, seeded from system entropy on
    /// first use.
    ///
    /// Every sampler built with [`SeedSource::Ambient`] draws from this
    /// handle, so their draws interleave in scheduling order and none of
    /// them is reproducible.
    #[must_use]
    pub fn global() -> Self {
        static GLOBAL: OnceLock<SharedRng> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Self::new(fastrand::Rng::new()))
            .clone()
    }

    /// Whether both handles refer to the same generator.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Locks the generator for exclusive use.
    pub(crate) fn lock(&self) -> MutexGuard<'_, fastrand::Rng> {
        self.0.lock()
    }
}

/// How a sampler obtains its generator.
///
/// Any value other than an existing handle or the absence marker is a
/// deterministic seed; seed resolution never fails.
///
/// # Examples
///
/// ```
/// use lockstep::{SeedSource, SharedRng};
///
/// assert!(matches!(SeedSource::from(42), SeedSource::Seed(42)));
/// assert!(matches!(SeedSource::from(None::<u64>), SeedSource::Ambient));
///
/// let rng = SharedRng::with_seed(7);
/// assert!(matches!(SeedSource::from(rng), SeedSource::Shared(_)));
/// ```
#[derive(Clone, Debug, Default)]
pub enum SeedSource {
    /// Use this handle as-is. Samplers sharing a handle race on it and lose
    /// reproducibility.
    Shared(SharedRng),
    /// Use the process-wide [`SharedRng::global`] handle. Not reproducible.
    #[default]
    Ambient,
    /// Build a private generator from this seed.
    Seed(u64),
}

impl SeedSource {
    /// Resolves the source into a generator handle.
    #[must_use]
    pub fn into_rng(self) -> SharedRng {
        match self {
            Self::Shared(rng) => rng,
            Self::Ambient => SharedRng::global(),
            Self::Seed(seed) => SharedRng::with_seed(seed),
        }
    }
}

impl From<u64> for SeedSource {
    fn from(seed: u64) -> Self {
        Self::Seed(seed)
    }
}

macro_rules! seed_from_int {
    ($($t:ty),*) => {$(
        impl From<$t> for SeedSource {
            #[allow(clippy::cast_sign_loss, clippy::cast_lossless)]
            fn from(seed: $t) -> Self {
                // Negative seeds keep their two's complement bit pattern.
                Self::Seed(seed as u64)
            }
        }
    )*};
}

seed_from_int!(u32, i32, i64, usize);

impl From<Option<u64>> for SeedSource {
    fn from(seed: Option<u64>) -> Self {
        seed.map_or(Self::Ambient, Self::Seed)
    }
}

impl From<SharedRng> for SeedSource {
    fn from(rng: SharedRng) -> Self {
        Self::Shared(rng)
    }
}

impl From<fastrand::Rng> for SeedSource {
    fn from(rng: fastrand::Rng) -> Self {
        Self::Shared(SharedRng::new(rng))
    }
}

/// Discards `count` scalar draws.
#[inline]
pub(crate) fn burn(rng: &mut fastrand::Rng, count: u64) {
    for _ in 0..count {
        rng.f64();
    }
}

/// Draws `n` independent uniforms in `[0, 1)`.
#[inline]
pub(crate) fn unit_vector(rng: &mut fastrand::Rng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.f64()).collect()
}

/// Draws an index in `0..len` from a single uniform.
///
/// Unlike rejection-based range sampling this always consumes exactly one
/// entropy unit. `len` must be non-zero.
#[inline]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub(crate) fn choose_index(rng: &mut fastrand::Rng, len: u64) -> u64 {
    debug_assert!(len > 0, "cannot choose from an empty set");
    let k = (rng.f64() * len as f64) as u64;
    k.min(len.saturating_sub(1))
}
