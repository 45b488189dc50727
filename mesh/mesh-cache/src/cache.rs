//! Build-once cache slot with explicit invalidation.

use std::any::type_name;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tracing::debug;

/// A value derived from a shared source object.
///
/// The artifact is bound to its source through a [`Weak`] handle and pulls
/// whatever it needs from the source inside [`compute`](Self::compute). It
/// never owns the source.
pub trait CacheArtifact: Sized {
    /// The object the artifact is derived from.
    type Source: ?Sized;

    /// Create an empty artifact bound to `source`.
    fn bind(source: Weak<Self::Source>) -> Self;

    /// (Re)compute the artifact from the current state of its source.
    ///
    /// Any previously computed state is discarded.
    fn compute(&mut self);
}

/// Holds at most one artifact, building it on first access.
///
/// Construction is double-checked under a [`RwLock`]: the hot path takes a
/// read lock only, and a miss takes the write lock and re-checks before
/// building. Concurrent first use therefore builds exactly once, and no
/// reader ever sees a partially computed artifact.
///
/// Handles returned by [`get_or_build`](Self::get_or_build) are snapshots.
/// After [`invalidate`](Self::invalidate) a caller still holding an old
/// handle keeps using the old artifact until it drops it.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Weak};
/// use mesh_cache::{CacheArtifact, LazyCache};
///
/// struct Doubled {
///     source: Weak<Vec<u32>>,
///     values: Vec<u32>,
/// }
///
/// impl CacheArtifact for Doubled {
///     type Source = Vec<u32>;
///
///     fn bind(source: Weak<Vec<u32>>) -> Self {
///         Self { source, values: Vec::new() }
///     }
///
///     fn compute(&mut self) {
///         self.values.clear();
///         if let Some(source) = self.source.upgrade() {
///             self.values.extend(source.iter().map(|v| v * 2));
///         }
///     }
/// }
///
/// let source = Arc::new(vec![1, 2, 3]);
/// let cache = LazyCache::<Doubled>::new();
///
/// assert!(!cache.is_valid());
/// assert_eq!(cache.get_or_build(&source).values, vec![2, 4, 6]);
/// assert!(cache.is_valid());
/// assert_eq!(cache.build_count(), 1);
/// ```
#[derive(Debug)]
pub struct LazyCache<A> {
    slot: RwLock<Option<Arc<A>>>,
    builds: AtomicUsize,
}

impl<A> Default for LazyCache<A> {
    fn default() -> Self {
        Self {
            slot: RwLock::new(None),
            builds: AtomicUsize::new(0),
        }
    }
}

impl<A: CacheArtifact> LazyCache<A> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached artifact, building it from `source` if absent.
    pub fn get_or_build(&self, source: &Arc<A::Source>) -> Arc<A> {
        if let Some(artifact) = self.read_slot() {
            return artifact;
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(artifact) = slot.as_ref() {
            return Arc::clone(artifact);
        }

        let mut artifact = A::bind(Arc::downgrade(source));
        artifact.compute();
        let artifact = Arc::new(artifact);
        *slot = Some(Arc::clone(&artifact));

        let builds = self.builds.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Built {} (build #{})", type_name::<A>(), builds);

        artifact
    }

    /// Return the cached artifact without building it.
    #[must_use]
    pub fn get(&self) -> Option<Arc<A>> {
        self.read_slot()
    }

    /// Drop the cached artifact so the next access rebuilds it.
    pub fn invalidate(&self) {
        let previous = self
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            debug!("Invalidated {}", type_name::<A>());
        }
    }

    /// Whether an artifact is currently held.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of times an artifact has been built by this cache.
    #[must_use]
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    fn read_slot(&self) -> Option<Arc<A>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Arc::clone)
    }
}
