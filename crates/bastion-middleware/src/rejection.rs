//! Turning firewall rejections into responses.

use crate::context::{MiddlewareContext, RequestLine};
use bastion_core::{RequestRejected, Response, ResponseExt, SecurityError, SecurityResult};
use bytes::Bytes;
use http::{header, StatusCode};
use http_body_util::Full;

/// Produces the terminal response for a rejected request.
///
/// Called at most once per request, with the request line as it arrived.
/// An `Err` returned here is not handled further and reaches the caller of
/// the dispatch engine.
pub trait RejectionHandler: Send + Sync + 'static {
    /// Builds the response for `rejection`.
    fn handle(
        &self,
        ctx: &MiddlewareContext,
        request: &RequestLine,
        rejection: &RequestRejected,
    ) -> SecurityResult<Response>;
}

/// Responds with `400 Bad Request` and a JSON error envelope.
///
/// The body carries the rejection reason code and the request ID, never the
/// rejection message.
///
/// ```json
/// {
///   "error": {
///     "code": "REQUEST_REJECTED",
///     "message": "The request was rejected",
///     "reason": "non_normalized_path"
///   },
///   "request_id": "01927f..."
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRejectionHandler;

impl RejectionHandler for DefaultRejectionHandler {
    fn handle(
        &self,
        ctx: &MiddlewareContext,
        _request: &RequestLine,
        rejection: &RequestRejected,
    ) -> SecurityResult<Response> {
        let error = SecurityError::from(rejection.clone());
        let envelope = error.to_envelope(Some(&ctx.request_id().to_string()));
        let body = serde_json::to_vec(&envelope)
            .map_err(|e| SecurityError::middleware("rejection_handler", e))?;

        http::Response::builder()
            .status(error.status_code())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| SecurityError::middleware("rejection_handler", e))
    }
}

/// Responds with a fixed status code and an empty body.
#[derive(Debug, Clone, Copy)]
pub struct StatusRejectionHandler {
    status: StatusCode,
}

impl StatusRejectionHandler {
    /// Creates a handler answering with `status`.
    #[must_use]
    pub const fn new(status: StatusCode) -> Self {
        Self { status }
    }

    /// Returns the status code sent for rejected requests.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl Default for StatusRejectionHandler {
    fn default() -> Self {
        Self::new(StatusCode::BAD_REQUEST)
    }
}

impl RejectionHandler for StatusRejectionHandler {
    fn handle(
        &self,
        _ctx: &MiddlewareContext,
        request: &RequestLine,
        rejection: &RequestRejected,
    ) -> SecurityResult<Response> {
        tracing::debug!(
            status = self.status.as_u16(),
            reason = %rejection.reason(),
            "Rejecting {request} with status {}",
            self.status
        );
        Ok(Response::empty(self.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{ErrorEnvelope, RejectionReason};
    use http::{Method, Uri};
    use http_body_util::BodyExt;

    fn line() -> RequestLine {
        RequestLine::new(Method::GET, Uri::from_static("/a/../b"))
    }

    fn rejection() -> RequestRejected {
        RequestRejected::new(
            RejectionReason::NonNormalizedPath,
            "the request was rejected because the URL was not normalized",
        )
    }

    #[tokio::test]
    async fn test_default_handler_writes_envelope() {
        let ctx = MiddlewareContext::new();
        let response = DefaultRejectionHandler
            .handle(&ctx, &line(), &rejection())
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.error.code, "REQUEST_REJECTED");
        assert_eq!(envelope.error.reason, Some(RejectionReason::NonNormalizedPath));
        assert_eq!(envelope.request_id, Some(ctx.request_id().to_string()));
        assert!(!String::from_utf8_lossy(&body).contains("URL was not"));
    }

    #[test]
    fn test_status_handler() {
        let ctx = MiddlewareContext::new();
        let handler = StatusRejectionHandler::new(StatusCode::NOT_FOUND);
        let response = handler.handle(&ctx, &line(), &rejection()).unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(StatusRejectionHandler::default().status(), StatusCode::BAD_REQUEST);
    }
}
