//! Assembly of the [`DispatchEngine`] from configuration units.

use crate::configurer::SecurityConfigurer;
use crate::http_security::HttpSecurity;
use bastion_config::BastionConfig;
use bastion_core::{BuildGuard, SecurityBuilder, SecurityError, SecurityResult};
use bastion_firewall::{Firewall, StrictFirewall};
use bastion_matcher::{AnyRequestMatcher, BoxedMatcher, RequestMatcher};
use bastion_middleware::{
    ChainValidator, DispatchEngine, RejectionHandler, SecurityFilterChain, StatusRejectionHandler,
};
use http::StatusCode;
use std::fmt;
use std::sync::Arc;

/// What to do when neither configurers nor chains were supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyConfigPolicy {
    /// Add one chain matching every request with no middleware.
    #[default]
    SynthesizeDefault,
    /// Refuse to build.
    FailFast,
}

type HttpCustomizer = Arc<dyn Fn(&mut HttpSecurity) + Send + Sync>;

/// Collects everything the [`DispatchEngine`] is assembled from.
///
/// Chains come out in this order:
///
/// 1. one empty chain per [`ignoring`](Self::ignoring) matcher, so ignored
///    requests bypass security,
/// 2. one chain per [`SecurityConfigurer`], by ascending order, **or** the
///    chains supplied directly with [`chain`](Self::chain),
/// 3. a default chain matching every request, if nothing else was
///    configured and the policy allows it.
///
/// `WebSecurity` is a [`SecurityBuilder`]; [`build`](Self::build) runs it
/// through a [`BuildGuard`].
///
/// # Example
///
/// ```
/// use bastion::prelude::*;
///
/// let engine = WebSecurity::new()
///     .ignoring(PatternMatcher::new("/health"))
///     .configurer(FnConfigurer::new("api", 10, |http| {
///         http.security_matcher(PatternMatcher::new("/api/**"));
///         Ok(())
///     }))
///     .configurer(FnConfigurer::new("default", 20, |_http| Ok(())))
///     .build()
///     .unwrap();
///
/// assert_eq!(engine.chains().len(), 3);
/// ```
#[derive(Default)]
pub struct WebSecurity {
    ignored: Vec<BoxedMatcher>,
    configurers: Vec<Arc<dyn SecurityConfigurer>>,
    chains: Vec<Arc<SecurityFilterChain>>,
    firewall: Option<Arc<dyn Firewall>>,
    rejection_handler: Option<Arc<dyn RejectionHandler>>,
    validator: Option<Arc<dyn ChainValidator>>,
    http_customizers: Vec<HttpCustomizer>,
    empty_policy: EmptyConfigPolicy,
    debug: bool,
}

impl WebSecurity {
    /// Creates an empty assembly.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an assembly with the firewall, rejection status, debug flag
    /// and empty-configuration policy taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::InvalidConfiguration`] if a firewall method
    /// or the rejection status is not valid.
    pub fn from_config(config: &BastionConfig) -> SecurityResult<Self> {
        let mut web = Self::new()
            .firewall(StrictFirewall::from_config(&config.firewall)?)
            .debug(config.dispatch.debug)
            .empty_config_policy(if config.dispatch.fail_on_empty {
                EmptyConfigPolicy::FailFast
            } else {
                EmptyConfigPolicy::SynthesizeDefault
            });

        if let Some(status) = config.dispatch.rejection_status {
            let status = StatusCode::from_u16(status).map_err(|e| {
                SecurityError::invalid_configuration(format!(
                    "invalid rejection status {status}: {e}"
                ))
            })?;
            web = web.rejection_handler(StatusRejectionHandler::new(status));
        }

        Ok(web)
    }

    /// Lets requests accepted by `matcher` bypass security entirely.
    #[must_use]
    pub fn ignoring(mut self, matcher: impl RequestMatcher) -> Self {
        self.ignored.push(Arc::new(matcher));
        self
    }

    /// Adds a configurer producing one chain.
    #[must_use]
    pub fn configurer(mut self, configurer: impl SecurityConfigurer) -> Self {
        self.configurers.push(Arc::new(configurer));
        self
    }

    /// Adds a ready-made chain. Chains are kept in the order they are added.
    #[must_use]
    pub fn chain(mut self, chain: SecurityFilterChain) -> Self {
        self.chains.push(Arc::new(chain));
        self
    }

    /// Sets the firewall. Defaults to [`StrictFirewall::default`].
    #[must_use]
    pub fn firewall(mut self, firewall: impl Firewall) -> Self {
        self.firewall = Some(Arc::new(firewall));
        self
    }

    /// Sets the rejection handler.
    #[must_use]
    pub fn rejection_handler(mut self, handler: impl RejectionHandler) -> Self {
        self.rejection_handler = Some(Arc::new(handler));
        self
    }

    /// Sets the chain validator run when the engine is built.
    #[must_use]
    pub fn validator(mut self, validator: impl ChainValidator) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Applies `customizer` to every [`HttpSecurity`] before its configurer
    /// runs.
    #[must_use]
    pub fn customize_each_chain<F>(mut self, customizer: F) -> Self
    where
        F: Fn(&mut HttpSecurity) + Send + Sync + 'static,
    {
        self.http_customizers.push(Arc::new(customizer));
        self
    }

    /// Sets the behavior when nothing was configured.
    #[must_use]
    pub fn empty_config_policy(mut self, policy: EmptyConfigPolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    /// Enables per-request debug logging in the engine.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// See [`SecurityBuilder::do_build`] for [`WebSecurity`].
    pub fn build(self) -> SecurityResult<Arc<DispatchEngine>> {
        BuildGuard::new(self).build()
    }

    /// Orders the configurers and rejects duplicated orders.
    fn sorted_configurers(&self) -> SecurityResult<Vec<&Arc<dyn SecurityConfigurer>>> {
        let mut sorted: Vec<_> = self.configurers.iter().collect();
        sorted.sort_by_key(|c| c.order());

        for pair in sorted.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            if previous.order() == current.order() {
                return Err(SecurityError::ambiguous_ordering(
                    current.order(),
                    previous.name(),
                    current.name(),
                ));
            }
        }
        Ok(sorted)
    }

    fn configured_chain(
        &self,
        configurer: &dyn SecurityConfigurer,
    ) -> SecurityResult<Arc<SecurityFilterChain>> {
        let mut http = HttpSecurity::new();
        for customize in &self.http_customizers {
            customize(&mut http);
        }
        configurer.configure(&mut http)?;

        let chain = BuildGuard::new(http).build()?;
        tracing::debug!(
            configurer = configurer.name(),
            order = configurer.order(),
            chain = %chain,
            "Configured security chain"
        );
        Ok(chain)
    }
}

impl SecurityBuilder for WebSecurity {
    type Output = DispatchEngine;

    fn name(&self) -> &str {
        "WebSecurity"
    }

    /// Assembles the chains and builds the engine.
    ///
    /// # Errors
    ///
    /// - [`SecurityError::InvalidConfiguration`] if both configurers and
    ///   ready-made chains were supplied, if nothing was configured under
    ///   [`EmptyConfigPolicy::FailFast`], or if the validator rejects the
    ///   chains
    /// - [`SecurityError::AmbiguousOrdering`] if two configurers share an
    ///   order
    /// - any error raised by a configurer
    fn do_build(&self) -> SecurityResult<DispatchEngine> {
        if !self.configurers.is_empty() && !self.chains.is_empty() {
            return Err(SecurityError::invalid_configuration(
                "found both security configurers and security filter chains; \
                 use one or the other",
            ));
        }

        let mut chains: Vec<Arc<SecurityFilterChain>> = self
            .ignored
            .iter()
            .map(|matcher| {
                tracing::debug!(matcher = %matcher, "Ignoring requests");
                Arc::new(SecurityFilterChain::from_shared(
                    Arc::clone(matcher),
                    Vec::new(),
                ))
            })
            .collect();

        for configurer in self.sorted_configurers()? {
            chains.push(self.configured_chain(&**configurer)?);
        }
        chains.extend(self.chains.iter().cloned());

        if self.configurers.is_empty() && self.chains.is_empty() {
            match self.empty_policy {
                EmptyConfigPolicy::SynthesizeDefault => {
                    tracing::warn!(
                        "No security configuration supplied; \
                         all requests pass without security middleware"
                    );
                    chains.push(Arc::new(SecurityFilterChain::ignoring(AnyRequestMatcher)));
                }
                EmptyConfigPolicy::FailFast => {
                    return Err(SecurityError::invalid_configuration(
                        "no security configurers or security filter chains were supplied",
                    ));
                }
            }
        }

        let mut builder = DispatchEngine::builder().chains(chains).debug(self.debug);
        if let Some(firewall) = &self.firewall {
            builder = builder.shared_firewall(Arc::clone(firewall));
        }
        if let Some(handler) = &self.rejection_handler {
            builder = builder.shared_rejection_handler(Arc::clone(handler));
        }
        if let Some(validator) = &self.validator {
            builder = builder.shared_validator(Arc::clone(validator));
        }
        builder.build()
    }
}

impl fmt::Debug for WebSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSecurity")
            .field("ignored", &self.ignored.len())
            .field(
                "configurers",
                &self.configurers.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("chains", &self.chains)
            .field("empty_policy", &self.empty_policy)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
