//! Security filter chains.

use crate::middleware::BoxedMiddleware;
use bastion_core::Request;
use bastion_matcher::{BoxedMatcher, RequestMatcher};
use std::fmt;
use std::sync::Arc;

/// A request matcher bound to an ordered list of middleware.
///
/// A chain is immutable once constructed. The dispatch engine runs the
/// middleware of the first chain whose matcher accepts the request; a chain
/// with no middleware lets matching requests bypass security entirely.
///
/// # Example
///
/// ```
/// use bastion_matcher::PatternMatcher;
/// use bastion_middleware::{BoxedMiddleware, FnMiddleware, SecurityFilterChain};
/// use std::sync::Arc;
///
/// let audit: BoxedMiddleware = Arc::new(FnMiddleware::new("audit", |ctx, request, next| {
///     Box::pin(async move { next.run(ctx, request).await })
/// }));
///
/// let chain = SecurityFilterChain::new(PatternMatcher::new("/admin/**"), vec![audit]);
/// assert_eq!(chain.middleware_names(), vec!["audit"]);
/// ```
pub struct SecurityFilterChain {
    matcher: BoxedMatcher,
    middleware: Vec<BoxedMiddleware>,
}

impl SecurityFilterChain {
    /// Creates a chain from a matcher and its middleware, in execution order.
    pub fn new(matcher: impl RequestMatcher, middleware: Vec<BoxedMiddleware>) -> Self {
        Self::from_shared(Arc::new(matcher), middleware)
    }

    /// Creates a chain from an already shared matcher.
    #[must_use]
    pub fn from_shared(matcher: BoxedMatcher, middleware: Vec<BoxedMiddleware>) -> Self {
        Self {
            matcher,
            middleware,
        }
    }

    /// Creates a chain with no middleware, for requests that bypass
    /// security.
    pub fn ignoring(matcher: impl RequestMatcher) -> Self {
        Self::new(matcher, Vec::new())
    }

    /// Returns `true` if this chain applies to the request.
    #[must_use]
    pub fn matches(&self, request: &Request) -> bool {
        self.matcher.matches(request.method(), request.uri().path())
    }

    /// Returns the matcher.
    #[must_use]
    pub fn matcher(&self) -> &dyn RequestMatcher {
        self.matcher.as_ref()
    }

    /// Returns the middleware in execution order.
    #[must_use]
    pub fn middleware(&self) -> &[BoxedMiddleware] {
        &self.middleware
    }

    /// Returns the middleware names in execution order.
    #[must_use]
    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    /// Returns `true` if the chain has no middleware.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }
}

impl fmt::Display for SecurityFilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SecurityFilterChain [matcher={}, middleware=[{}]]",
            self.matcher,
            self.middleware_names().join(", ")
        )
    }
}

impl fmt::Debug for SecurityFilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityFilterChain")
            .field("matcher", &self.matcher.to_string())
            .field("middleware", &self.middleware_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MiddlewareContext;
    use crate::middleware::{BoxFuture, Middleware, Next};
    use bastion_core::{Response, SecurityResult};
    use bastion_matcher::{AnyRequestMatcher, PatternMatcher};
    use bytes::Bytes;
    use http::Method;
    use http_body_util::Full;

    struct Named(&'static str);

    impl Middleware for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, SecurityResult<Response>> {
            Box::pin(next.run(ctx, request))
        }
    }

    fn request(method: Method, path: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_matches_delegates_to_matcher() {
        let chain = SecurityFilterChain::new(
            PatternMatcher::new("/api/**").with_method(Method::POST),
            vec![Arc::new(Named("csrf"))],
        );

        assert!(chain.matches(&request(Method::POST, "/api/orders")));
        assert!(!chain.matches(&request(Method::GET, "/api/orders")));
        assert!(!chain.matches(&request(Method::POST, "/static/app.js")));
    }

    #[test]
    fn test_middleware_order_is_stable() {
        let chain = SecurityFilterChain::new(
            AnyRequestMatcher,
            vec![
                Arc::new(Named("headers")),
                Arc::new(Named("authentication")),
                Arc::new(Named("authorization")),
            ],
        );

        let first = chain.middleware_names();
        let second = chain.middleware_names();
        assert_eq!(first, vec!["headers", "authentication", "authorization"]);
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&chain.middleware()[1], &chain.middleware()[1]));
    }

    #[test]
    fn test_ignoring_chain_is_empty() {
        let chain = SecurityFilterChain::ignoring(PatternMatcher::new("/health"));
        assert!(chain.is_empty());
        assert!(chain.matches(&request(Method::GET, "/health")));
    }

    #[test]
    fn test_display() {
        let chain = SecurityFilterChain::new(
            PatternMatcher::new("/admin/**"),
            vec![Arc::new(Named("a")), Arc::new(Named("b"))],
        );
        assert_eq!(
            chain.to_string(),
            "SecurityFilterChain [matcher=pattern '/admin/**', middleware=[a, b]]"
        );
    }
}
