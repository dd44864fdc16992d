//! Security filter chains and the dispatch engine for Bastion.
//!
//! A [`DispatchEngine`] holds an ordered list of [`SecurityFilterChain`]s.
//! For each request it runs the firewall, picks the first chain whose
//! matcher accepts the request and executes that chain's [`Middleware`]
//! in order before handing the request to the rest of the application.
//!
//! ```text
//!                 ┌──────────────────── DispatchEngine ────────────────────┐
//!   request ──►   │ firewall ──► select chain ──► m1 ──► m2 ──► … ──► reset │ ──► outer
//!                 └───────┬──────────────────────────────────────────────────┘
//!                         └── rejected ──► RejectionHandler ──► response
//! ```
//!
//! Chains are tried in order and the first match wins, so more specific
//! chains go first. A middleware that does not call [`Next::run`] ends the
//! request there. Whatever happens, the [`SecurityContext`] is cleared when
//! dispatch ends.
//!
//! [`SecurityContext`]: bastion_core::SecurityContext
//!
//! # Example
//!
//! ```
//! use bastion_core::{Authentication, Response, ResponseExt};
//! use bastion_matcher::{AnyRequestMatcher, PatternMatcher};
//! use bastion_middleware::{
//!     BoxedMiddleware, DispatchEngine, FnMiddleware, MiddlewareContext, SecurityFilterChain,
//! };
//! use bytes::Bytes;
//! use http::StatusCode;
//! use http_body_util::Full;
//! use std::sync::Arc;
//!
//! let authenticate = FnMiddleware::new("authenticate", |ctx, request, next| {
//!     Box::pin(async move {
//!         if request.headers().contains_key("x-api-key") {
//!             ctx.security_context_mut()
//!                 .set_authentication(Authentication::new("service"));
//!             next.run(ctx, request).await
//!         } else {
//!             Ok(Response::empty(StatusCode::UNAUTHORIZED))
//!         }
//!     })
//! });
//! let authenticate: BoxedMiddleware = Arc::new(authenticate);
//!
//! let engine = DispatchEngine::builder()
//!     .chain(SecurityFilterChain::ignoring(PatternMatcher::new("/health")))
//!     .chain(SecurityFilterChain::new(AnyRequestMatcher, vec![authenticate]))
//!     .build()
//!     .unwrap();
//!
//! # tokio_test::block_on(async {
//! let request = http::Request::builder()
//!     .uri("/orders")
//!     .body(Full::new(Bytes::new()))
//!     .unwrap();
//!
//! let mut ctx = MiddlewareContext::new();
//! let response = engine
//!     .process(&mut ctx, request, |_ctx, _request| {
//!         Box::pin(async { Ok(Response::empty(StatusCode::OK)) })
//!     })
//!     .await
//!     .unwrap();
//!
//! assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/bastion-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
pub mod context;
mod dispatch;
pub mod middleware;
mod rejection;
mod validator;

pub use chain::SecurityFilterChain;
pub use context::{MiddlewareContext, RequestLine};
pub use dispatch::{DispatchEngine, DispatchEngineBuilder, SecurityApplied};
pub use middleware::{BoxFuture, BoxedMiddleware, Continuation, FnMiddleware, Middleware, Next};
pub use rejection::{DefaultRejectionHandler, RejectionHandler, StatusRejectionHandler};
pub use validator::{ChainValidator, NoopChainValidator, UnreachableChainValidator};

pub use bastion_core::{Request, Response, SecurityError, SecurityResult};
