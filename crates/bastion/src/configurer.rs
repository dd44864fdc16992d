//! Ordered units of security configuration.

use crate::http_security::HttpSecurity;
use bastion_core::SecurityResult;

/// Order given to a configurer that does not choose one.
pub const DEFAULT_ORDER: i32 = 100;

/// Configures one security chain.
///
/// [`WebSecurity`](crate::WebSecurity) gives each configurer a fresh
/// [`HttpSecurity`] and builds one chain from it. Chains are tried in
/// ascending [`order`](Self::order); two configurers may not share an order.
pub trait SecurityConfigurer: Send + Sync + 'static {
    /// Name used in errors and logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Position of the resulting chain; lower comes first.
    fn order(&self) -> i32 {
        DEFAULT_ORDER
    }

    /// Adds the matcher and middleware of the chain.
    fn configure(&self, http: &mut HttpSecurity) -> SecurityResult<()>;
}

/// A configurer built from a closure.
///
/// # Example
///
/// ```
/// use bastion::prelude::*;
///
/// let admin = FnConfigurer::new("admin", 10, |http| {
///     http.security_matcher(PatternMatcher::new("/admin/**"));
///     Ok(())
/// });
/// assert_eq!(admin.order(), 10);
/// ```
pub struct FnConfigurer<F> {
    name: &'static str,
    order: i32,
    func: F,
}

impl<F> FnConfigurer<F>
where
    F: Fn(&mut HttpSecurity) -> SecurityResult<()> + Send + Sync + 'static,
{
    /// Creates a named configurer with an explicit order.
    pub fn new(name: &'static str, order: i32, func: F) -> Self {
        Self { name, order, func }
    }
}

impl<F> SecurityConfigurer for FnConfigurer<F>
where
    F: Fn(&mut HttpSecurity) -> SecurityResult<()> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.name
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn configure(&self, http: &mut HttpSecurity) -> SecurityResult<()> {
        (self.func)(http)
    }
}
