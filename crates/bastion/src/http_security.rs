//! Builder for a single [`SecurityFilterChain`].

use bastion_core::{SecurityBuilder, SecurityError, SecurityResult};
use bastion_matcher::{AnyRequestMatcher, BoxedMatcher, RequestMatcher};
use bastion_middleware::{BoxedMiddleware, Middleware, SecurityFilterChain};
use std::sync::Arc;

/// Collects the matcher and middleware of one security chain.
///
/// Without a [`security_matcher`](Self::security_matcher) the chain applies
/// to every request. Middleware run in the order they are added, unless
/// positioned relative to another unit with [`add_before`](Self::add_before)
/// or [`add_after`](Self::add_after).
///
/// `HttpSecurity` is a [`SecurityBuilder`]: wrap it in a
/// [`BuildGuard`](bastion_core::BuildGuard) to build the chain exactly once.
///
/// # Example
///
/// ```
/// use bastion::prelude::*;
///
/// let noop = |name| {
///     FnMiddleware::new(name, |ctx, request, next| Box::pin(next.run(ctx, request)))
/// };
///
/// let mut http = HttpSecurity::new();
/// http.security_matcher(PatternMatcher::new("/api/**"))
///     .add(noop("authenticate"))
///     .add(noop("authorize"));
/// http.add_before("authorize", noop("rate_limit")).unwrap();
///
/// let chain = BuildGuard::new(http).build().unwrap();
/// assert_eq!(chain.middleware_names(), vec!["authenticate", "rate_limit", "authorize"]);
/// ```
#[derive(Default)]
pub struct HttpSecurity {
    matcher: Option<BoxedMatcher>,
    middleware: Vec<BoxedMiddleware>,
}

impl HttpSecurity {
    /// Creates an empty builder matching every request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the chain to requests accepted by `matcher`.
    pub fn security_matcher(&mut self, matcher: impl RequestMatcher) -> &mut Self {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// Appends a middleware.
    pub fn add(&mut self, middleware: impl Middleware) -> &mut Self {
        self.add_shared(Arc::new(middleware))
    }

    /// Appends an already shared middleware.
    pub fn add_shared(&mut self, middleware: BoxedMiddleware) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Inserts a middleware right before the unit named `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::InvalidConfiguration`] if no unit is named
    /// `anchor`.
    pub fn add_before(
        &mut self,
        anchor: &str,
        middleware: impl Middleware,
    ) -> SecurityResult<&mut Self> {
        let index = self.position_of(anchor)?;
        self.middleware.insert(index, Arc::new(middleware));
        Ok(self)
    }

    /// Inserts a middleware right after the unit named `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::InvalidConfiguration`] if no unit is named
    /// `anchor`.
    pub fn add_after(
        &mut self,
        anchor: &str,
        middleware: impl Middleware,
    ) -> SecurityResult<&mut Self> {
        let index = self.position_of(anchor)?;
        self.middleware.insert(index + 1, Arc::new(middleware));
        Ok(self)
    }

    /// Returns the names of the middleware added so far, in order.
    #[must_use]
    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    fn position_of(&self, anchor: &str) -> SecurityResult<usize> {
        self.middleware
            .iter()
            .position(|m| m.name() == anchor)
            .ok_or_else(|| {
                SecurityError::invalid_configuration(format!(
                    "no middleware named '{anchor}' to position against; registered: [{}]",
                    self.middleware_names().join(", ")
                ))
            })
    }
}

impl SecurityBuilder for HttpSecurity {
    type Output = SecurityFilterChain;

    fn name(&self) -> &str {
        "HttpSecurity"
    }

    fn do_build(&self) -> SecurityResult<SecurityFilterChain> {
        let matcher = self
            .matcher
            .clone()
            .unwrap_or_else(|| Arc::new(AnyRequestMatcher));
        Ok(SecurityFilterChain::from_shared(
            matcher,
            self.middleware.clone(),
        ))
    }
}
