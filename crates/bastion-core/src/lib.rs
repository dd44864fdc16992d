//! # Bastion Core
//!
//! Core types shared by every Bastion crate.
//!
//! - [`Request`] / [`Response`] - HTTP types flowing through the security chain
//! - [`RequestId`] - UUID v7 request identifier
//! - [`SecurityContext`] - Per-request authentication state established by middleware
//! - [`SecurityError`] - Error taxonomy of the dispatch core
//! - [`RequestRejected`] - Firewall rejection with a [`RejectionReason`]
//! - [`BuildGuard`] - Runs a [`SecurityBuilder`] at most once

#![doc(html_root_url = "https://docs.rs/bastion-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod build;
mod context;
mod error;
mod types;

pub use build::{BuildGuard, SecurityBuilder};
pub use context::{Authentication, RequestId, SecurityContext};
pub use error::{
    ErrorDetail, ErrorEnvelope, RejectionReason, RequestRejected, SecurityError, SecurityResult,
};
pub use types::{Request, Response, ResponseExt};
