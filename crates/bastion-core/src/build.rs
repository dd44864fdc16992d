//! Build-once guard for expensive security builders.
//!
//! A [`SecurityBuilder`] describes how to construct something (a filter
//! chain, a dispatch engine). Wrapping it in a [`BuildGuard`] guarantees the
//! construction runs at most once for the lifetime of the guard, no matter
//! how many threads race on [`BuildGuard::build`].
//!
//! ```text
//!            build() wins CAS                do_build() Ok
//!  Unbuilt ───────────────────► Building ─────────────────► Built
//!                                   │
//!                                   │ do_build() Err
//!                                   ▼
//!                                 Failed
//! ```
//!
//! Every `build()` call that loses the compare-and-set, or arrives after it,
//! fails with [`SecurityError::AlreadyBuilt`]. [`BuildGuard::get_result`]
//! only succeeds in the `Built` state.

use crate::error::{SecurityError, SecurityResult};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

const UNBUILT: u8 = 0;
const BUILDING: u8 = 1;
const BUILT: u8 = 2;
const FAILED: u8 = 3;

/// Something that can construct a security object.
///
/// Implementations perform the construction in [`do_build`](Self::do_build)
/// and never call it themselves; callers go through a [`BuildGuard`].
///
/// # Example
///
/// ```
/// use bastion_core::{BuildGuard, SecurityBuilder, SecurityResult};
///
/// struct Greeting(&'static str);
///
/// impl SecurityBuilder for Greeting {
///     type Output = String;
///
///     fn do_build(&self) -> SecurityResult<String> {
///         Ok(format!("hello {}", self.0))
///     }
/// }
///
/// let guard = BuildGuard::new(Greeting("world"));
/// assert_eq!(guard.build().unwrap().as_str(), "hello world");
/// assert!(guard.build().is_err());
/// ```
pub trait SecurityBuilder: Send + Sync {
    /// The built object.
    type Output: Send + Sync;

    /// Name used in errors and logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Performs the construction.
    fn do_build(&self) -> SecurityResult<Self::Output>;
}

/// Wraps a [`SecurityBuilder`] so that its construction runs at most once.
///
/// The built object is shared behind an [`Arc`]: the winning `build()` call
/// and every later `get_result()` call observe the same allocation.
pub struct BuildGuard<B: SecurityBuilder> {
    builder: B,
    state: AtomicU8,
    result: OnceLock<Arc<B::Output>>,
}

impl<B: SecurityBuilder> BuildGuard<B> {
    /// Wraps a builder that has not been built yet.
    #[must_use]
    pub fn new(builder: B) -> Self {
        Self {
            builder,
            state: AtomicU8::new(UNBUILT),
            result: OnceLock::new(),
        }
    }

    /// Runs the wrapped construction if no other call has claimed it.
    ///
    /// # Errors
    ///
    /// - [`SecurityError::AlreadyBuilt`] if another call (concurrent or
    ///   earlier) already claimed the construction
    /// - whatever error the builder's `do_build` returns; the attempt is
    ///   still consumed
    pub fn build(&self) -> SecurityResult<Arc<B::Output>> {
        if self
            .state
            .compare_exchange(UNBUILT, BUILDING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(builder = self.builder.name(), "Rejected repeated build");
            return Err(SecurityError::already_built(self.builder.name()));
        }

        match self.builder.do_build() {
            Ok(output) => {
                let output = self.result.get_or_init(|| Arc::new(output)).clone();
                self.state.store(BUILT, Ordering::Release);
                tracing::debug!(builder = self.builder.name(), "Built");
                Ok(output)
            }
            Err(err) => {
                self.state.store(FAILED, Ordering::Release);
                tracing::warn!(builder = self.builder.name(), error = %err, "Build failed");
                Err(err)
            }
        }
    }

    /// Returns the object produced by the successful `build()` call.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::InvalidState`] if no build has completed
    /// successfully yet.
    pub fn get_result(&self) -> SecurityResult<Arc<B::Output>> {
        if self.state.load(Ordering::Acquire) != BUILT {
            return Err(SecurityError::invalid_state(format!(
                "{} has not been built",
                self.builder.name()
            )));
        }

        self.result.get().cloned().ok_or_else(|| {
            SecurityError::invalid_state(format!("{} has no built result", self.builder.name()))
        })
    }

    /// Returns `true` once a build has completed successfully.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.state.load(Ordering::Acquire) == BUILT
    }

    /// Returns the wrapped builder.
    #[must_use]
    pub fn builder(&self) -> &B {
        &self.builder
    }
}

impl<B: SecurityBuilder> std::fmt::Debug for BuildGuard<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state.load(Ordering::Acquire) {
            UNBUILT => "unbuilt",
            BUILDING => "building",
            BUILT => "built",
            _ => "failed",
        };
        f.debug_struct("BuildGuard")
            .field("builder", &self.builder.name())
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;
    use std::time::Duration;

    struct CountingBuilder {
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl CountingBuilder {
        fn new(delay: Duration) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: calls.clone(),
                    delay,
                },
                calls,
            )
        }
    }

    impl SecurityBuilder for CountingBuilder {
        type Output = Vec<u32>;

        fn name(&self) -> &str {
            "counting"
        }

        fn do_build(&self) -> SecurityResult<Vec<u32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            Ok(vec![1, 2, 3])
        }
    }

    struct FailingBuilder;

    impl SecurityBuilder for FailingBuilder {
        type Output = ();

        fn do_build(&self) -> SecurityResult<()> {
            Err(SecurityError::invalid_configuration("no chains"))
        }
    }

    #[test]
    fn test_build_once() {
        let (builder, calls) = CountingBuilder::new(Duration::ZERO);
        let guard = BuildGuard::new(builder);

        let built = guard.build().unwrap();
        assert_eq!(*built, vec![1, 2, 3]);
        assert!(guard.is_built());

        let second = guard.build();
        assert!(matches!(second, Err(SecurityError::AlreadyBuilt { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_get_result_before_build_is_invalid_state() {
        let (builder, _) = CountingBuilder::new(Duration::ZERO);
        let guard = BuildGuard::new(builder);

        assert!(matches!(
            guard.get_result(),
            Err(SecurityError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_get_result_returns_same_object() {
        let (builder, _) = CountingBuilder::new(Duration::ZERO);
        let guard = BuildGuard::new(builder);

        let built = guard.build().unwrap();
        let first = guard.get_result().unwrap();
        let second = guard.get_result().unwrap();
        assert!(Arc::ptr_eq(&built, &first));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_build_consumes_attempt() {
        let guard = BuildGuard::new(FailingBuilder);

        assert!(matches!(
            guard.build(),
            Err(SecurityError::InvalidConfiguration { .. })
        ));
        assert!(!guard.is_built());
        assert!(matches!(guard.build(), Err(SecurityError::AlreadyBuilt { .. })));
        assert!(matches!(
            guard.get_result(),
            Err(SecurityError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_concurrent_builds_have_exactly_one_winner() {
        const THREADS: usize = 16;

        let (builder, calls) = CountingBuilder::new(Duration::from_millis(20));
        let guard = Arc::new(BuildGuard::new(builder));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let guard = guard.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    guard.build()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let already_built = results
            .iter()
            .filter(|r| matches!(r, Err(SecurityError::AlreadyBuilt { .. })))
            .count();

        assert_eq!(winners.len(), 1);
        assert_eq!(already_built, THREADS - 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(winners[0], &guard.get_result().unwrap()));
    }

    #[test]
    fn test_result_not_observable_while_building() {
        let (builder, _) = CountingBuilder::new(Duration::from_millis(100));
        let guard = Arc::new(BuildGuard::new(builder));

        let building = {
            let guard = guard.clone();
            std::thread::spawn(move || guard.build())
        };

        // Wait until the builder thread has claimed the construction.
        while guard.state.load(Ordering::Acquire) == UNBUILT {
            std::thread::yield_now();
        }
        if !guard.is_built() {
            assert!(matches!(
                guard.get_result(),
                Err(SecurityError::InvalidState { .. })
            ));
        }

        assert!(building.join().unwrap().is_ok());
        assert!(guard.get_result().is_ok());
    }

    #[test]
    fn test_debug_reports_state() {
        let (builder, _) = CountingBuilder::new(Duration::ZERO);
        let guard = BuildGuard::new(builder);
        assert!(format!("{guard:?}").contains("unbuilt"));
        guard.build().unwrap();
        assert!(format!("{guard:?}").contains("built"));
    }
}
