//! Request matchers for Bastion security chains.
//!
//! A chain applies to a request when its matcher returns `true` for the
//! request's method and path. Chains are tried in order and the first match
//! wins, so callers order their chains most-specific-first; nothing here
//! infers specificity.
//!
//! # Features
//!
//! - **Ant-style patterns**: `?`, `*`, `**` and `{name}` segments
//! - **Method restriction**: match a pattern only for one HTTP method
//! - **Composition**: AND, OR and negation over any matchers
//! - **Variable extraction**: captured `{name}` values as [`Params`]
//!
//! # Example
//!
//! ```rust
//! use bastion_matcher::{PatternMatcher, RequestMatcher};
//! use http::Method;
//!
//! let chains = [PatternMatcher::new("/admin/*"), PatternMatcher::new("/**")];
//!
//! let selected = chains
//!     .iter()
//!     .position(|m| m.matches(&Method::GET, "/admin/x"));
//! assert_eq!(selected, Some(0));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod matcher;
mod params;
mod pattern;

pub use matcher::{
    AndMatcher, AnyRequestMatcher, BoxedMatcher, FnMatcher, MethodMatcher, NegatedMatcher,
    OrMatcher, PatternMatcher, RequestMatcher,
};
pub use params::Params;
pub use pattern::PathPattern;

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_first_match_is_positional() {
        let chains: Vec<BoxedMatcher> = vec![
            std::sync::Arc::new(PatternMatcher::new("/admin/*")),
            std::sync::Arc::new(PatternMatcher::new("/**")),
        ];

        let first = |path: &str| chains.iter().position(|m| m.matches(&Method::GET, path));
        assert_eq!(first("/admin/x"), Some(0));
        assert_eq!(first("/home"), Some(1));
    }
}
