//! HTTP types that flow through the security chain.

use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type seen by the firewall, matchers and middleware.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by middleware and the outer pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building terminal responses.
pub trait ResponseExt {
    /// Creates a response with the given status code and no body.
    fn empty(status: http::StatusCode) -> Response;

    /// Creates a plain-text error response.
    fn error(status: http::StatusCode, message: &str) -> Response;
}

impl ResponseExt for Response {
    fn empty(status: http::StatusCode) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }

    fn error(status: http::StatusCode, message: &str) -> Response {
        let mut response = Self::empty(status);
        *response.body_mut() = Full::new(Bytes::from(message.to_string()));
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}
