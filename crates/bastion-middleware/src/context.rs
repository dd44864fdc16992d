//! Per-request state threaded through the security pipeline.

use bastion_core::{Request, RequestId, SecurityContext};
use http::{Method, Uri};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Context passed to every middleware while a request is being secured.
///
/// The context is owned by the caller of the dispatch engine and lent to
/// each middleware in turn. It carries:
///
/// - The request ID
/// - The [`SecurityContext`] established by authentication middleware
/// - Typed extensions for data shared between middleware
///
/// The engine clears the security context when dispatch ends, whichever
/// way it ends.
///
/// # Example
///
/// ```
/// use bastion_core::Authentication;
/// use bastion_middleware::MiddlewareContext;
///
/// let mut ctx = MiddlewareContext::new();
/// ctx.security_context_mut()
///     .set_authentication(Authentication::new("alice").with_authority("ROLE_ADMIN"));
///
/// assert!(ctx.security_context().is_authenticated());
/// ```
pub struct MiddlewareContext {
    request_id: RequestId,
    security: SecurityContext,
    started_at: Instant,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a new context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a new context for a request ID assigned upstream.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            security: SecurityContext::default(),
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the security context.
    #[must_use]
    pub fn security_context(&self) -> &SecurityContext {
        &self.security
    }

    /// Returns the security context for modification.
    pub fn security_context_mut(&mut self) -> &mut SecurityContext {
        &mut self.security
    }

    /// Returns when the context was created.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the time elapsed since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension, replacing any previous value of that type.
    pub fn set_extension<T: Any + Send + Sync>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Returns the extension of type `T`, if present.
    #[must_use]
    pub fn get_extension<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Removes and returns the extension of type `T`.
    pub fn remove_extension<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Returns `true` if an extension of type `T` is present.
    #[must_use]
    pub fn has_extension<T: Any + Send + Sync>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MiddlewareContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareContext")
            .field("request_id", &self.request_id)
            .field("security", &self.security)
            .field("started_at", &self.started_at)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

/// Method and URI of a request as it arrived, before the firewall touched it.
///
/// Captured at the start of dispatch for logging and for the rejection
/// handler, since the request itself is handed on to the middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    uri: Uri,
}

impl RequestLine {
    /// Creates a request line.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self { method, uri }
    }

    /// Captures the request line of `request`.
    #[must_use]
    pub fn of(request: &Request) -> Self {
        Self::new(request.method().clone(), request.uri().clone())
    }

    /// Returns the method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the full URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path component.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.uri)
    }
}
