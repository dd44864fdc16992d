//! The [`RequestMatcher`] trait and its standard implementations.
//!
//! A matcher is a pure predicate over a request's method and path. The
//! dispatch engine evaluates chain matchers in order and stops at the first
//! one that returns `true`, so matchers must be deterministic and free of
//! side effects.

use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::pattern::PathPattern;

/// Decides whether a security chain applies to a request.
pub trait RequestMatcher: fmt::Display + Send + Sync + 'static {
    /// Returns true if the request identified by `method` and `path` matches.
    fn matches(&self, method: &Method, path: &str) -> bool;

    /// Returns true if this matcher accepts every request.
    ///
    /// Used at assembly time to detect chains that can never be reached.
    fn matches_any_request(&self) -> bool {
        false
    }
}

/// A shareable, type-erased matcher.
pub type BoxedMatcher = Arc<dyn RequestMatcher>;

/// Matches every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyRequestMatcher;

impl RequestMatcher for AnyRequestMatcher {
    fn matches(&self, _method: &Method, _path: &str) -> bool {
        true
    }

    fn matches_any_request(&self) -> bool {
        true
    }
}

impl fmt::Display for AnyRequestMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any request")
    }
}

/// Matches requests by HTTP method only.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: Method,
}

impl MethodMatcher {
    /// Creates a matcher for one method.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl RequestMatcher for MethodMatcher {
    fn matches(&self, method: &Method, _path: &str) -> bool {
        *method == self.method
    }
}

impl fmt::Display for MethodMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method {}", self.method)
    }
}

/// Matches requests whose path fits a [`PathPattern`], optionally
/// restricted to one method.
///
/// # Example
///
/// ```rust
/// use bastion_matcher::{PatternMatcher, RequestMatcher};
/// use http::Method;
///
/// let matcher = PatternMatcher::new("/admin/**").with_method(Method::POST);
/// assert!(matcher.matches(&Method::POST, "/admin/users"));
/// assert!(!matcher.matches(&Method::GET, "/admin/users"));
/// ```
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: PathPattern,
    method: Option<Method>,
}

impl PatternMatcher {
    /// Creates a case-sensitive matcher for any method.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: PathPattern::new(pattern),
            method: None,
        }
    }

    /// Creates a matcher from a compiled pattern.
    #[must_use]
    pub fn from_pattern(pattern: PathPattern) -> Self {
        Self {
            pattern,
            method: None,
        }
    }

    /// Restricts the matcher to one method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Returns the path pattern.
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }
}

impl RequestMatcher for PatternMatcher {
    fn matches(&self, method: &Method, path: &str) -> bool {
        if let Some(expected) = &self.method {
            if expected != method {
                return false;
            }
        }
        self.pattern.matches(path)
    }

    fn matches_any_request(&self) -> bool {
        self.method.is_none() && self.pattern.matches_any_path()
    }
}

impl fmt::Display for PatternMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "pattern '{}' {}", self.pattern, method),
            None => write!(f, "pattern '{}'", self.pattern),
        }
    }
}

/// Matches when every inner matcher matches.
#[derive(Clone)]
pub struct AndMatcher {
    matchers: Vec<BoxedMatcher>,
}

impl AndMatcher {
    /// Combines matchers with logical AND. An empty list matches everything.
    #[must_use]
    pub fn new(matchers: Vec<BoxedMatcher>) -> Self {
        Self { matchers }
    }
}

impl RequestMatcher for AndMatcher {
    fn matches(&self, method: &Method, path: &str) -> bool {
        self.matchers.iter().all(|m| m.matches(method, path))
    }

    fn matches_any_request(&self) -> bool {
        self.matchers.iter().all(|m| m.matches_any_request())
    }
}

impl fmt::Display for AndMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.matchers, " and ")
    }
}

/// Matches when any inner matcher matches.
#[derive(Clone)]
pub struct OrMatcher {
    matchers: Vec<BoxedMatcher>,
}

impl OrMatcher {
    /// Combines matchers with logical OR. An empty list matches nothing.
    #[must_use]
    pub fn new(matchers: Vec<BoxedMatcher>) -> Self {
        Self { matchers }
    }
}

impl RequestMatcher for OrMatcher {
    fn matches(&self, method: &Method, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(method, path))
    }

    fn matches_any_request(&self) -> bool {
        self.matchers.iter().any(|m| m.matches_any_request())
    }
}

impl fmt::Display for OrMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.matchers, " or ")
    }
}

/// Inverts another matcher.
#[derive(Clone)]
pub struct NegatedMatcher {
    inner: BoxedMatcher,
}

impl NegatedMatcher {
    /// Creates a matcher that matches whatever `inner` rejects.
    #[must_use]
    pub fn new(inner: BoxedMatcher) -> Self {
        Self { inner }
    }
}

impl RequestMatcher for NegatedMatcher {
    fn matches(&self, method: &Method, path: &str) -> bool {
        !self.inner.matches(method, path)
    }
}

impl fmt::Display for NegatedMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not ({})", self.inner)
    }
}

/// A matcher backed by a closure.
///
/// # Example
///
/// ```rust
/// use bastion_matcher::{FnMatcher, RequestMatcher};
/// use http::Method;
///
/// let api = FnMatcher::new("api prefix", |_method: &Method, path: &str| path.starts_with("/api"));
/// assert!(api.matches(&Method::GET, "/api/users"));
/// ```
pub struct FnMatcher<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMatcher<F>
where
    F: Fn(&Method, &str) -> bool + Send + Sync + 'static,
{
    /// Creates a named closure matcher.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> RequestMatcher for FnMatcher<F>
where
    F: Fn(&Method, &str) -> bool + Send + Sync + 'static,
{
    fn matches(&self, method: &Method, path: &str) -> bool {
        (self.func)(method, path)
    }
}

impl<F> fmt::Display for FnMatcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, matchers: &[BoxedMatcher], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, matcher) in matchers.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{matcher}")?;
    }
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(m: impl RequestMatcher) -> BoxedMatcher {
        Arc::new(m)
    }

    #[test]
    fn test_any_request() {
        let matcher = AnyRequestMatcher;
        assert!(matcher.matches(&Method::DELETE, "/anything"));
        assert!(matcher.matches_any_request());
    }

    #[test]
    fn test_method_matcher() {
        let matcher = MethodMatcher::new(Method::OPTIONS);
        assert!(matcher.matches(&Method::OPTIONS, "/x"));
        assert!(!matcher.matches(&Method::GET, "/x"));
        assert!(!matcher.matches_any_request());
    }

    #[test]
    fn test_pattern_matcher_universal_only_without_method() {
        assert!(PatternMatcher::new("/**").matches_any_request());
        assert!(!PatternMatcher::new("/**")
            .with_method(Method::GET)
            .matches_any_request());
        assert!(!PatternMatcher::new("/api/**").matches_any_request());
    }

    #[test]
    fn test_and_or_composition() {
        let api_posts = AndMatcher::new(vec![
            boxed(PatternMatcher::new("/api/**")),
            boxed(MethodMatcher::new(Method::POST)),
        ]);
        assert!(api_posts.matches(&Method::POST, "/api/users"));
        assert!(!api_posts.matches(&Method::GET, "/api/users"));

        let public = OrMatcher::new(vec![
            boxed(PatternMatcher::new("/css/**")),
            boxed(PatternMatcher::new("/js/**")),
        ]);
        assert!(public.matches(&Method::GET, "/js/app.js"));
        assert!(!public.matches(&Method::GET, "/api"));
        assert!(!OrMatcher::new(Vec::new()).matches(&Method::GET, "/"));
    }

    #[test]
    fn test_negated_matcher() {
        let not_public = NegatedMatcher::new(boxed(PatternMatcher::new("/public/**")));
        assert!(not_public.matches(&Method::GET, "/private"));
        assert!(!not_public.matches(&Method::GET, "/public/index.html"));
    }

    #[test]
    fn test_display() {
        let matcher = OrMatcher::new(vec![
            boxed(PatternMatcher::new("/a").with_method(Method::GET)),
            boxed(NegatedMatcher::new(boxed(AnyRequestMatcher))),
        ]);
        assert_eq!(matcher.to_string(), "(pattern '/a' GET or not (any request))");
    }
}
