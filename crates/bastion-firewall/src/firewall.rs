//! The [`Firewall`] trait.

use bastion_core::{Request, RequestRejected, Response};

use crate::path;

/// Validates and normalizes requests before any chain logic runs.
///
/// The dispatch engine calls, per request:
///
/// 1. [`firewalled_request`](Self::firewalled_request) once, before chain
///    selection. An `Err` ends dispatch with the rejection handler.
/// 2. [`reset`](Self::reset) exactly once, after the security middleware has
///    finished (or immediately, when no chain applies), so code downstream of
///    the security pipeline sees the original request path.
/// 3. [`firewalled_response`](Self::firewalled_response) on the response
///    produced by the chain.
///
/// # Example
///
/// ```
/// use bastion_core::{RejectionReason, Request, RequestRejected};
/// use bastion_firewall::Firewall;
///
/// struct NoAdminFromOutside;
///
/// impl Firewall for NoAdminFromOutside {
///     fn firewalled_request(&self, request: &mut Request) -> Result<(), RequestRejected> {
///         if request.uri().path().starts_with("/internal") {
///             return Err(RequestRejected::new(RejectionReason::Custom, "internal path"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Firewall: Send + Sync + 'static {
    /// Validates the request, rewriting its path if needed for matching.
    ///
    /// Implementations must not rewrite a request they reject.
    fn firewalled_request(&self, request: &mut Request) -> Result<(), RequestRejected>;

    /// Filters the outbound response. Identity by default.
    fn firewalled_response(&self, response: Response) -> Response {
        response
    }

    /// Undoes any path rewrite made by [`firewalled_request`](Self::firewalled_request).
    fn reset(&self, request: &mut Request) {
        path::restore_original_uri(request);
    }
}
