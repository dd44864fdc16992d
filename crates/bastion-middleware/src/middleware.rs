//! The [`Middleware`] trait and the per-request virtual chain.
//!
//! A matched [`SecurityFilterChain`](crate::SecurityFilterChain) is executed
//! through a [`Next`] cursor over its middleware. Each unit receives the
//! cursor for the rest of the chain and decides whether to advance it.
//! Past the last unit the firewall's [`reset`](bastion_firewall::Firewall::reset)
//! runs and the request leaves the security pipeline through the outer
//! continuation supplied to the dispatch engine.
//!
//! # Example
//!
//! ```
//! use bastion_core::{Request, Response, ResponseExt, SecurityResult};
//! use bastion_middleware::{BoxFuture, Middleware, MiddlewareContext, Next};
//! use http::StatusCode;
//!
//! struct RequireAuthentication;
//!
//! impl Middleware for RequireAuthentication {
//!     fn name(&self) -> &'static str {
//!         "require_authentication"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, SecurityResult<Response>> {
//!         Box::pin(async move {
//!             if !ctx.security_context().is_authenticated() {
//!                 return Ok(Response::empty(StatusCode::UNAUTHORIZED));
//!             }
//!             next.run(ctx, request).await
//!         })
//!     }
//! }
//! ```

use crate::context::{MiddlewareContext, RequestLine};
use bastion_core::{Request, RequestRejected, Response, SecurityResult};
use bastion_firewall::Firewall;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A shared middleware unit.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The rest of the application pipeline, run once the request leaves the
/// security chain.
pub type Continuation<'a> = Box<
    dyn for<'c> FnOnce(
            &'c mut MiddlewareContext,
            Request,
        ) -> BoxFuture<'c, SecurityResult<Response>>
        + Send
        + 'a,
>;

/// One unit of a security chain.
///
/// A unit either hands the request on with [`Next::run`] or produces a
/// response itself. Not calling `next` short-circuits the chain: no later
/// unit and no application code sees the request. Since [`Next`] is
/// consumed by `run`, a unit can continue the chain at most once.
///
/// Failures are returned as errors. A
/// [`SecurityError::RequestRejected`](bastion_core::SecurityError::RequestRejected)
/// is turned into a response by the engine's rejection handler; every other
/// error is passed back to the caller of the engine.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this unit, used in logs and for positioning
    /// units relative to each other.
    fn name(&self) -> &'static str;

    /// Processes the request.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, SecurityResult<Response>>;
}

impl fmt::Debug for dyn Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Middleware").field(&self.name()).finish()
    }
}

/// Cursor over the remaining middleware of the selected chain.
///
/// Created fresh for every request and never shared.
pub struct Next<'a> {
    middleware: &'a [BoxedMiddleware],
    position: usize,
    firewall: &'a dyn Firewall,
    outer: Continuation<'a>,
    line: RequestLine,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        middleware: &'a [BoxedMiddleware],
        firewall: &'a dyn Firewall,
        outer: Continuation<'a>,
        line: RequestLine,
    ) -> Self {
        Self {
            middleware,
            position: 0,
            firewall,
            outer,
            line,
        }
    }

    /// Creates a cursor with no middleware left that goes straight to
    /// `outer`.
    ///
    /// Useful for exercising a single unit in isolation.
    pub fn terminal<O>(line: RequestLine, outer: O) -> Self
    where
        O: for<'c> FnOnce(
                &'c mut MiddlewareContext,
                Request,
            ) -> BoxFuture<'c, SecurityResult<Response>>
            + Send
            + 'a,
    {
        Self::new(&[], &PassThrough, Box::new(outer), line)
    }

    /// Returns how many units are left, including the one `run` would
    /// invoke next.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.middleware.len() - self.position
    }

    /// Invokes the next unit, or leaves the security chain if none is left.
    pub async fn run(
        self,
        ctx: &mut MiddlewareContext,
        mut request: Request,
    ) -> SecurityResult<Response> {
        let Self {
            middleware,
            position,
            firewall,
            outer,
            line,
        } = self;

        match middleware.get(position) {
            Some(current) => {
                tracing::trace!(
                    middleware = current.name(),
                    position = position + 1,
                    total = middleware.len(),
                    "Invoking {} ({}/{})",
                    current.name(),
                    position + 1,
                    middleware.len()
                );
                let next = Self {
                    middleware,
                    position: position + 1,
                    firewall,
                    outer,
                    line,
                };
                current.process(ctx, request, next).await
            }
            None => {
                tracing::debug!("Secured {line}");
                firewall.reset(&mut request);
                outer(ctx, request).await
            }
        }
    }
}

/// Firewall for cursors built outside the engine; nothing to validate or
/// undo.
struct PassThrough;

impl Firewall for PassThrough {
    fn firewalled_request(&self, _request: &mut Request) -> Result<(), RequestRejected> {
        Ok(())
    }

    fn reset(&self, _request: &mut Request) {}
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```
/// use bastion_middleware::FnMiddleware;
///
/// let audit = FnMiddleware::new("audit", |ctx, request, next| {
///     Box::pin(async move {
///         tracing::info!(request_id = %ctx.request_id(), "audited");
///         next.run(ctx, request).await
///     })
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(
            &'a mut MiddlewareContext,
            Request,
            Next<'a>,
        ) -> BoxFuture<'a, SecurityResult<Response>>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new closure-based middleware.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(
            &'a mut MiddlewareContext,
            Request,
            Next<'a>,
        ) -> BoxFuture<'a, SecurityResult<Response>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, SecurityResult<Response>> {
        (self.func)(ctx, request, next)
    }
}
