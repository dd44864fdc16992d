//! Request firewall for Bastion.
//!
//! The firewall runs before any security chain is selected. It rejects
//! requests whose path could be read differently by the matcher and by the
//! application (encoded separators, dot segments, path parameters), and may
//! rewrite the path into the canonical form used for matching. The rewrite
//! is undone by [`Firewall::reset`] once the security middleware is done.
//!
//! ```text
//!   request ──► firewalled_request ──► chain selection ──► middleware ──► reset ──► application
//!                    │
//!                    └── Err(RequestRejected) ──► rejection handler
//! ```
//!
//! [`StrictFirewall`] is the default implementation.

#![doc(html_root_url = "https://docs.rs/bastion-firewall/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod firewall;
pub mod path;
mod strict;

pub use firewall::Firewall;
pub use strict::{StrictFirewall, StrictFirewallBuilder};
