//! # Bastion
//!
//! **Security filter chain dispatch for async Rust HTTP services**
//!
//! Bastion decides, per request, which ordered list of security middleware
//! applies and runs it:
//!
//! - 🛡️ **Firewall first** – Ambiguous paths, encoded separators and
//!   untrusted hosts are rejected before any chain logic runs
//! - 🎯 **First match wins** – Chains are tried in order; ignored paths
//!   bypass security entirely
//! - 🔗 **Virtual chains** – Middleware continue or short-circuit the chain
//!   through a single-use `Next`
//! - 🧹 **Guaranteed cleanup** – The security context is cleared on every
//!   way out, including errors and cancellation
//! - 🔒 **Build once** – Configuration is assembled exactly once and
//!   validated before traffic is served
//!
//! ## Quick Start
//!
//! ```rust
//! use bastion::prelude::*;
//! use http::StatusCode;
//!
//! let require_key = FnMiddleware::new("require_api_key", |ctx, request, next| {
//!     Box::pin(async move {
//!         if request.headers().contains_key("x-api-key") {
//!             next.run(ctx, request).await
//!         } else {
//!             Ok(Response::empty(StatusCode::UNAUTHORIZED))
//!         }
//!     })
//! });
//!
//! let engine = WebSecurity::new()
//!     .ignoring(PatternMatcher::new("/health"))
//!     .chain(SecurityFilterChain::new(
//!         PatternMatcher::new("/api/**"),
//!         vec![std::sync::Arc::new(require_key)],
//!     ))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     engine.middleware_names_for(http::Method::GET, "/api/orders").unwrap(),
//!     vec!["require_api_key"]
//! );
//! ```
//!
//! ## Architecture
//!
//! ```text
//! WebSecurity ──► [ignored chains] + [configurer chains | supplied chains] ──► DispatchEngine
//!
//! Request → Firewall → first matching chain → m1 → m2 → … → reset → application
//!              │
//!              └── rejected → RejectionHandler → Response
//! ```

#![doc(html_root_url = "https://docs.rs/bastion/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod configurer;
mod http_security;
mod web_security;

pub use configurer::{FnConfigurer, SecurityConfigurer, DEFAULT_ORDER};
pub use http_security::HttpSecurity;
pub use web_security::{EmptyConfigPolicy, WebSecurity};

// Re-export core types
pub use bastion_core as core;

// Re-export request matchers
pub use bastion_matcher as matcher;

// Re-export the firewall
pub use bastion_firewall as firewall;

// Re-export chains and the dispatch engine
pub use bastion_middleware as middleware;

// Re-export configuration
pub use bastion_config as config;

// Re-export logging setup
pub use bastion_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use bastion::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        EmptyConfigPolicy, FnConfigurer, HttpSecurity, SecurityConfigurer, WebSecurity,
    };

    pub use bastion_core::{
        Authentication, BuildGuard, RejectionReason, Request, RequestRejected, Response,
        ResponseExt, SecurityBuilder, SecurityContext, SecurityError, SecurityResult,
    };

    pub use bastion_matcher::{
        AndMatcher, AnyRequestMatcher, MethodMatcher, NegatedMatcher, OrMatcher, PatternMatcher,
        RequestMatcher,
    };

    pub use bastion_firewall::{Firewall, StrictFirewall};

    pub use bastion_middleware::{
        BoxFuture, BoxedMiddleware, DefaultRejectionHandler, DispatchEngine, FnMiddleware,
        Middleware, MiddlewareContext, Next, RejectionHandler, SecurityFilterChain,
        StatusRejectionHandler,
    };

    pub use bastion_config::{BastionConfig, ConfigLoader};

    pub use bastion_telemetry::{init_logging, LogConfig};
}
