//! The dispatch engine.
//!
//! Per request the engine:
//!
//! 1. Skips straight to the outer continuation if the request is already
//!    being secured further up the stack (internal forwarding).
//! 2. Runs the firewall; a rejection goes to the [`RejectionHandler`].
//! 3. Selects the first chain whose matcher accepts the request.
//! 4. Runs that chain's middleware through a [`Next`] cursor, or hands the
//!    request straight on when no chain (or an empty one) applies.
//! 5. Clears the security context, on every way out.

use crate::chain::SecurityFilterChain;
use crate::context::{MiddlewareContext, RequestLine};
use crate::middleware::{BoxFuture, BoxedMiddleware, Continuation, Next};
use crate::rejection::{DefaultRejectionHandler, RejectionHandler};
use crate::validator::{ChainValidator, NoopChainValidator};
use bastion_core::{
    RejectionReason, Request, RequestRejected, Response, SecurityError, SecurityResult,
};
use bastion_firewall::{Firewall, StrictFirewall};
use bytes::Bytes;
use http::Method;
use http_body_util::Full;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Marker extension present on a [`MiddlewareContext`] while the engine is
/// dispatching it.
///
/// A request arriving at the engine with the marker already set is passed
/// through without being secured again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityApplied;

/// Selects and runs the security chain for each request.
///
/// The engine is immutable once built and can be shared between tasks;
/// per-request state lives in the [`MiddlewareContext`] and the [`Next`]
/// cursor.
///
/// # Example
///
/// ```
/// use bastion_core::{Response, ResponseExt};
/// use bastion_matcher::PatternMatcher;
/// use bastion_middleware::{DispatchEngine, MiddlewareContext, SecurityFilterChain};
/// use bytes::Bytes;
/// use http::StatusCode;
/// use http_body_util::Full;
///
/// # tokio_test::block_on(async {
/// let engine = DispatchEngine::builder()
///     .chain(SecurityFilterChain::ignoring(PatternMatcher::new("/health")))
///     .build()
///     .unwrap();
///
/// let request = http::Request::builder()
///     .uri("/health")
///     .body(Full::new(Bytes::new()))
///     .unwrap();
///
/// let mut ctx = MiddlewareContext::new();
/// let response = engine
///     .process(&mut ctx, request, |_ctx, _request| {
///         Box::pin(async { Ok(Response::empty(StatusCode::NO_CONTENT)) })
///     })
///     .await
///     .unwrap();
///
/// assert_eq!(response.status(), StatusCode::NO_CONTENT);
/// # });
/// ```
pub struct DispatchEngine {
    chains: Vec<Arc<SecurityFilterChain>>,
    firewall: Arc<dyn Firewall>,
    rejection_handler: Arc<dyn RejectionHandler>,
    debug: bool,
}

impl DispatchEngine {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> DispatchEngineBuilder {
        DispatchEngineBuilder::new()
    }

    /// Secures `request`, then hands it to `outer`.
    ///
    /// `outer` is the rest of the application pipeline. It runs at most
    /// once: not at all when the firewall rejects the request or a
    /// middleware answers it, otherwise after the selected chain's
    /// middleware and the firewall reset.
    ///
    /// # Errors
    ///
    /// Rejections, whether raised by the firewall, a middleware or `outer`,
    /// are answered by the rejection handler. Any other error is returned,
    /// as is an error from the rejection handler itself.
    pub fn process<'a, O>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        outer: O,
    ) -> BoxFuture<'a, SecurityResult<Response>>
    where
        O: for<'c> FnOnce(
                &'c mut MiddlewareContext,
                Request,
            ) -> BoxFuture<'c, SecurityResult<Response>>
            + Send
            + 'a,
    {
        let outer: Continuation<'a> = Box::new(outer);

        Box::pin(async move {
            if ctx.has_extension::<SecurityApplied>() {
                tracing::trace!(
                    request_id = %ctx.request_id(),
                    "Request is already being secured, passing it through"
                );
                return outer(ctx, request).await;
            }

            let mut scope = DispatchScope::enter(ctx);
            let result = self.dispatch(&mut scope, request, outer).await;
            drop(scope);
            result
        })
    }

    async fn dispatch(
        &self,
        ctx: &mut MiddlewareContext,
        mut request: Request,
        outer: Continuation<'_>,
    ) -> SecurityResult<Response> {
        let line = RequestLine::of(&request);

        if let Err(rejection) = self.firewall.firewalled_request(&mut request) {
            self.firewall.reset(&mut request);
            return self.reject(ctx, &line, &rejection);
        }

        let chain = self.select(&request);
        if self.debug {
            tracing::info!(
                request_id = %ctx.request_id(),
                "Request received for '{line}', security chain: [{}]",
                chain.map(|c| c.middleware_names().join(", ")).unwrap_or_default()
            );
        }

        let result = match chain.filter(|c| !c.is_empty()) {
            Some(chain) => {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    http.method = %line.method(),
                    http.path = line.path(),
                    "Securing {line}"
                );
                Next::new(chain.middleware(), self.firewall.as_ref(), outer, line.clone())
                    .run(ctx, request)
                    .await
            }
            None => {
                tracing::trace!(request_id = %ctx.request_id(), "No security for {line}");
                self.firewall.reset(&mut request);
                outer(ctx, request).await
            }
        };

        match result {
            Ok(response) => Ok(self.firewall.firewalled_response(response)),
            Err(SecurityError::RequestRejected(rejection)) => self.reject(ctx, &line, &rejection),
            Err(err) => {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    error = %err,
                    "Security chain failed for {line}"
                );
                Err(err)
            }
        }
    }

    fn select(&self, request: &Request) -> Option<&Arc<SecurityFilterChain>> {
        let total = self.chains.len();
        self.chains
            .iter()
            .enumerate()
            .find(|(index, chain)| {
                tracing::trace!(
                    chain = %chain,
                    position = index + 1,
                    total,
                    "Trying to match request against {} ({}/{})",
                    chain,
                    index + 1,
                    total
                );
                chain.matches(request)
            })
            .map(|(_, chain)| chain)
    }

    fn reject(
        &self,
        ctx: &MiddlewareContext,
        line: &RequestLine,
        rejection: &RequestRejected,
    ) -> SecurityResult<Response> {
        tracing::warn!(
            request_id = %ctx.request_id(),
            http.method = %line.method(),
            http.path = line.path(),
            reason = %rejection.reason(),
            "Rejecting {line}: {}",
            rejection.message()
        );
        self.rejection_handler.handle(ctx, line, rejection)
    }

    /// Returns the chains in dispatch order.
    #[must_use]
    pub fn chains(&self) -> &[Arc<SecurityFilterChain>] {
        &self.chains
    }

    /// Returns the firewall.
    #[must_use]
    pub fn firewall(&self) -> &dyn Firewall {
        self.firewall.as_ref()
    }

    /// Returns `true` if debug logging of each request is enabled.
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Returns the middleware that would run for a request to `uri`.
    ///
    /// The request goes through the firewall first, as it would when served.
    /// An empty slice means the request would bypass security.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::RequestRejected`] if the URI cannot be parsed
    /// or the firewall rejects it.
    pub fn middleware_for(
        &self,
        method: Method,
        uri: &str,
    ) -> SecurityResult<&[BoxedMiddleware]> {
        let mut request = http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .map_err(|e| {
                RequestRejected::new(
                    RejectionReason::Custom,
                    format!("malformed URI '{uri}': {e}"),
                )
            })?;
        self.firewall.firewalled_request(&mut request)?;

        Ok(self
            .select(&request)
            .map(|chain| chain.middleware())
            .unwrap_or_default())
    }

    /// Returns the names of the middleware that would run for a request to
    /// `uri`.
    ///
    /// # Errors
    ///
    /// See [`middleware_for`](Self::middleware_for).
    pub fn middleware_names_for(
        &self,
        method: Method,
        uri: &str,
    ) -> SecurityResult<Vec<&'static str>> {
        Ok(self
            .middleware_for(method, uri)?
            .iter()
            .map(|m| m.name())
            .collect())
    }
}

impl fmt::Display for DispatchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DispatchEngine [")?;
        for chain in &self.chains {
            writeln!(f, "  {chain}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for DispatchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchEngine")
            .field("chains", &self.chains)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

/// Borrow of the context for the duration of one dispatch.
///
/// Sets [`SecurityApplied`] on entry. On drop, including on error or
/// cancellation, clears the security context and removes the marker.
struct DispatchScope<'a> {
    ctx: &'a mut MiddlewareContext,
}

impl<'a> DispatchScope<'a> {
    fn enter(ctx: &'a mut MiddlewareContext) -> Self {
        ctx.set_extension(SecurityApplied);
        Self { ctx }
    }
}

impl Deref for DispatchScope<'_> {
    type Target = MiddlewareContext;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for DispatchScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for DispatchScope<'_> {
    fn drop(&mut self) {
        self.ctx.security_context_mut().clear();
        self.ctx.remove_extension::<SecurityApplied>();
        tracing::trace!(request_id = %self.ctx.request_id(), "Cleared security context");
    }
}

/// Builder for [`DispatchEngine`].
///
/// The firewall defaults to [`StrictFirewall::default`], the rejection
/// handler to [`DefaultRejectionHandler`] and the validator to
/// [`NoopChainValidator`].
pub struct DispatchEngineBuilder {
    chains: Vec<Arc<SecurityFilterChain>>,
    firewall: Option<Arc<dyn Firewall>>,
    rejection_handler: Option<Arc<dyn RejectionHandler>>,
    validator: Option<Arc<dyn ChainValidator>>,
    debug: bool,
}

impl DispatchEngineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chains: Vec::new(),
            firewall: None,
            rejection_handler: None,
            validator: None,
            debug: false,
        }
    }

    /// Appends a chain. Chains are tried in the order they are added.
    #[must_use]
    pub fn chain(mut self, chain: SecurityFilterChain) -> Self {
        self.chains.push(Arc::new(chain));
        self
    }

    /// Appends already shared chains.
    #[must_use]
    pub fn chains(mut self, chains: impl IntoIterator<Item = Arc<SecurityFilterChain>>) -> Self {
        self.chains.extend(chains);
        self
    }

    /// Sets the firewall.
    #[must_use]
    pub fn firewall(self, firewall: impl Firewall) -> Self {
        self.shared_firewall(Arc::new(firewall))
    }

    /// Sets an already shared firewall.
    #[must_use]
    pub fn shared_firewall(mut self, firewall: Arc<dyn Firewall>) -> Self {
        self.firewall = Some(firewall);
        self
    }

    /// Sets the rejection handler.
    #[must_use]
    pub fn rejection_handler(self, handler: impl RejectionHandler) -> Self {
        self.shared_rejection_handler(Arc::new(handler))
    }

    /// Sets an already shared rejection handler.
    #[must_use]
    pub fn shared_rejection_handler(mut self, handler: Arc<dyn RejectionHandler>) -> Self {
        self.rejection_handler = Some(handler);
        self
    }

    /// Sets the validator run once by [`build`](Self::build).
    #[must_use]
    pub fn validator(self, validator: impl ChainValidator) -> Self {
        self.shared_validator(Arc::new(validator))
    }

    /// Sets an already shared validator.
    #[must_use]
    pub fn shared_validator(mut self, validator: Arc<dyn ChainValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Enables logging of every request with its selected chain at `info`.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Validates the chains and builds the engine.
    ///
    /// # Errors
    ///
    /// Returns the validator's error if the chain list is rejected.
    pub fn build(self) -> SecurityResult<DispatchEngine> {
        let validator = self
            .validator
            .unwrap_or_else(|| Arc::new(NoopChainValidator));
        validator.validate(&self.chains)?;

        if self.debug {
            tracing::warn!(
                "Security debugging is enabled. This may include sensitive information \
                 and should not be used in a production system"
            );
        }

        let engine = DispatchEngine {
            chains: self.chains,
            firewall: self
                .firewall
                .unwrap_or_else(|| Arc::new(StrictFirewall::default())),
            rejection_handler: self
                .rejection_handler
                .unwrap_or_else(|| Arc::new(DefaultRejectionHandler)),
            debug: self.debug,
        };
        tracing::debug!(chains = engine.chains.len(), "Built dispatch engine");
        Ok(engine)
    }
}

impl Default for DispatchEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::FnMiddleware;
    use crate::validator::UnreachableChainValidator;
    use bastion_core::{Authentication, ResponseExt};
    use bastion_matcher::{AnyRequestMatcher, PatternMatcher};
    use http::StatusCode;

    fn request(method: Method, uri: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn named(name: &'static str) -> BoxedMiddleware {
        Arc::new(FnMiddleware::new(name, |ctx, request, next| {
            Box::pin(next.run(ctx, request))
        }))
    }

    fn engine() -> DispatchEngine {
        DispatchEngine::builder()
            .chain(SecurityFilterChain::ignoring(PatternMatcher::new("/css/**")))
            .chain(SecurityFilterChain::new(
                PatternMatcher::new("/api/**"),
                vec![named("bearer"), named("authorize")],
            ))
            .chain(SecurityFilterChain::new(
                AnyRequestMatcher,
                vec![named("session"), named("csrf"), named("authorize")],
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_middleware_names_for() {
        let engine = engine();

        assert_eq!(
            engine.middleware_names_for(Method::GET, "/api/orders").unwrap(),
            vec!["bearer", "authorize"]
        );
        assert_eq!(
            engine.middleware_names_for(Method::GET, "/login").unwrap(),
            vec!["session", "csrf", "authorize"]
        );
        assert!(engine
            .middleware_names_for(Method::GET, "/css/site.css")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_middleware_for_runs_firewall() {
        let err = engine()
            .middleware_for(Method::GET, "/api/../admin")
            .unwrap_err();
        assert_eq!(
            err.as_rejection().map(RequestRejected::reason),
            Some(RejectionReason::NonNormalizedPath)
        );
    }

    #[test]
    fn test_middleware_for_malformed_uri() {
        let err = engine().middleware_for(Method::GET, "/a b").unwrap_err();
        assert!(err.as_rejection().is_some());
    }

    #[test]
    fn test_display_lists_chains_in_order() {
        let rendered = engine().to_string();
        let css = rendered.find("/css/**").unwrap();
        let api = rendered.find("/api/**").unwrap();
        let any = rendered.find("any request").unwrap();
        assert!(css < api && api < any);
    }

    #[test]
    fn test_build_runs_validator() {
        let result = DispatchEngine::builder()
            .chain(SecurityFilterChain::ignoring(AnyRequestMatcher))
            .chain(SecurityFilterChain::ignoring(PatternMatcher::new("/api/**")))
            .validator(UnreachableChainValidator)
            .build();
        assert!(matches!(
            result,
            Err(SecurityError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_scope_cleans_up_on_drop() {
        let mut ctx = MiddlewareContext::new();
        {
            let mut scope = DispatchScope::enter(&mut ctx);
            assert!(scope.has_extension::<SecurityApplied>());
            scope
                .security_context_mut()
                .set_authentication(Authentication::new("alice"));
        }
        assert!(!ctx.has_extension::<SecurityApplied>());
        assert!(!ctx.security_context().is_authenticated());
    }

    #[tokio::test]
    async fn test_firewalled_response_applied() {
        let engine = engine();
        let mut ctx = MiddlewareContext::new();

        let response = engine
            .process(&mut ctx, request(Method::GET, "/css/site.css"), |_ctx, _request| {
                Box::pin(async {
                    let mut response = Response::empty(StatusCode::OK);
                    response.headers_mut().insert(
                        "x-legacy",
                        http::HeaderValue::from_bytes(b"caf\xc3\xa9").unwrap(),
                    );
                    Ok(response)
                })
            })
            .await
            .unwrap();

        assert!(response.headers().get("x-legacy").is_none());
    }
}
