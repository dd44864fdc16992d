//! The default strict firewall.

use std::collections::HashSet;

use bastion_config::{FirewallConfig, DEFAULT_ALLOWED_METHODS};
use bastion_core::{
    RejectionReason, Request, RequestRejected, Response, SecurityError, SecurityResult,
};
use http::header::HOST;
use http::{HeaderValue, Method};

use crate::firewall::Firewall;
use crate::path;

/// A substring that rejects a request when found in its raw path.
#[derive(Debug, Clone, Copy)]
struct Forbidden {
    needle: &'static str,
    reason: RejectionReason,
}

impl Forbidden {
    const fn character(needle: &'static str) -> Self {
        Self {
            needle,
            reason: RejectionReason::DisallowedCharacter,
        }
    }

    const fn encoding(needle: &'static str) -> Self {
        Self {
            needle,
            reason: RejectionReason::DisallowedEncoding,
        }
    }
}

/// A firewall that rejects anything that could make path matching
/// ambiguous.
///
/// With default settings a request is rejected when:
///
/// | Check | Reason |
/// |-------|--------|
/// | method not in DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT | `MethodNotAllowed` |
/// | path contains `;` or `\` | `DisallowedCharacter` |
/// | path contains `%3B`, `%2F`, `%2E`, `%5C`, `%00`, `%25`, `%0D`, `%0A`, `%E2%80%A8`, `%E2%80%A9` | `DisallowedEncoding` |
/// | raw or decoded path contains `//`, `.` or `..` segments | `NonNormalizedPath` |
/// | path has bytes outside printable ASCII | `NonPrintablePath` |
/// | a header value has bytes outside visible ASCII and tab | `InvalidHeader` |
/// | host not on the allow-list, when one is set | `UntrustedHost` |
///
/// Each rule can be relaxed through [`StrictFirewallBuilder`]. When
/// semicolons are allowed, path parameters are stripped from the path seen
/// by chain matching and restored by [`Firewall::reset`].
///
/// # Example
///
/// ```
/// use bastion_firewall::{Firewall, StrictFirewall};
/// use bytes::Bytes;
/// use http_body_util::Full;
///
/// let firewall = StrictFirewall::default();
///
/// let mut request = http::Request::builder()
///     .uri("/admin/%2e%2e/secret")
///     .body(Full::new(Bytes::new()))
///     .unwrap();
/// assert!(firewall.firewalled_request(&mut request).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct StrictFirewall {
    /// `None` accepts every method.
    allowed_methods: Option<HashSet<Method>>,
    allow_semicolon: bool,
    allow_url_encoded_double_slash: bool,
    blocklist: Vec<Forbidden>,
    /// Lowercased; empty accepts every host.
    allowed_hostnames: Vec<String>,
}

impl Default for StrictFirewall {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl StrictFirewall {
    /// Returns a builder with every rule at its strict default.
    #[must_use]
    pub fn builder() -> StrictFirewallBuilder {
        StrictFirewallBuilder::new()
    }

    /// Builds a firewall from the `[firewall]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::InvalidConfiguration`] if an allowed method
    /// is not a valid HTTP method token.
    pub fn from_config(config: &FirewallConfig) -> SecurityResult<Self> {
        let mut builder = Self::builder()
            .allow_semicolon(config.allow_semicolon)
            .allow_url_encoded_slash(config.allow_url_encoded_slash)
            .allow_url_encoded_double_slash(config.allow_url_encoded_double_slash)
            .allow_url_encoded_period(config.allow_url_encoded_period)
            .allow_backslash(config.allow_backslash)
            .allow_null(config.allow_null)
            .allow_url_encoded_percent(config.allow_url_encoded_percent)
            .allow_url_encoded_carriage_return(config.allow_url_encoded_carriage_return)
            .allow_url_encoded_line_feed(config.allow_url_encoded_line_feed)
            .allow_url_encoded_line_separator(config.allow_url_encoded_line_separator)
            .allow_url_encoded_paragraph_separator(config.allow_url_encoded_paragraph_separator)
            .allowed_hostnames(config.allowed_hostnames.iter().cloned());

        builder = if config.allow_any_method {
            builder.allow_any_method()
        } else {
            let methods = config
                .allowed_methods
                .iter()
                .map(|m| {
                    Method::from_bytes(m.as_bytes()).map_err(|_| {
                        SecurityError::invalid_configuration(format!(
                            "'{m}' is not a valid HTTP method"
                        ))
                    })
                })
                .collect::<SecurityResult<Vec<_>>>()?;
            builder.allowed_methods(methods)
        };

        Ok(builder.build())
    }

    fn reject_forbidden_method(&self, method: &Method) -> Result<(), RequestRejected> {
        match &self.allowed_methods {
            Some(allowed) if !allowed.contains(method) => Err(RequestRejected::new(
                RejectionReason::MethodNotAllowed,
                format!(
                    "The request was rejected because the HTTP method \"{method}\" was not \
                     included within the list of allowed HTTP methods"
                ),
            )),
            _ => Ok(()),
        }
    }

    fn reject_blocklisted(&self, raw_path: &str) -> Result<(), RequestRejected> {
        let lowered = raw_path.to_ascii_lowercase();
        match self.blocklist.iter().find(|f| lowered.contains(f.needle)) {
            Some(forbidden) => Err(RequestRejected::new(
                forbidden.reason,
                format!(
                    "The request was rejected because the URL contained a potentially \
                     malicious String \"{}\"",
                    forbidden.needle
                ),
            )),
            None => Ok(()),
        }
    }

    fn reject_untrusted_host(&self, request: &Request) -> Result<(), RequestRejected> {
        if self.allowed_hostnames.is_empty() {
            return Ok(());
        }

        let host = request
            .headers()
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| request.uri().host())
            .map(strip_port);

        match host {
            Some(host) if self.allowed_hostnames.iter().any(|h| h.eq_ignore_ascii_case(host)) => {
                Ok(())
            }
            Some(host) => Err(RequestRejected::new(
                RejectionReason::UntrustedHost,
                format!("The request was rejected because the domain {host} is untrusted."),
            )),
            None => Err(RequestRejected::new(
                RejectionReason::UntrustedHost,
                "The request was rejected because it carried no host",
            )),
        }
    }

    fn reject_non_normalized(&self, matching_path: &str) -> Result<(), RequestRejected> {
        let not_normalized = |what: &str| {
            RequestRejected::new(
                RejectionReason::NonNormalizedPath,
                format!("The request was rejected because the {what} was not normalized."),
            )
        };

        if !path::is_normalized(matching_path) {
            return Err(not_normalized("URL"));
        }

        let decoded = urlencoding::decode(matching_path).map_err(|_| {
            RequestRejected::new(
                RejectionReason::DisallowedEncoding,
                "The request was rejected because the URL did not decode to valid UTF-8",
            )
        })?;

        if !path::is_normalized(&decoded)
            || (!self.allow_url_encoded_double_slash && decoded.contains("//"))
        {
            return Err(not_normalized("decoded URL"));
        }
        Ok(())
    }

    fn reject_invalid_headers(&self, request: &Request) -> Result<(), RequestRejected> {
        for (name, value) in request.headers() {
            if !is_valid_header_value(value) {
                return Err(RequestRejected::new(
                    RejectionReason::InvalidHeader,
                    format!(
                        "The request was rejected because the header \"{name}\" has a value \
                         that is not allowed."
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl Firewall for StrictFirewall {
    fn firewalled_request(&self, request: &mut Request) -> Result<(), RequestRejected> {
        self.reject_forbidden_method(request.method())?;

        let raw_path = request.uri().path().to_string();
        self.reject_blocklisted(&raw_path)?;
        self.reject_untrusted_host(request)?;

        let matching_path = if self.allow_semicolon && raw_path.contains(';') {
            path::strip_path_parameters(&raw_path)
        } else {
            raw_path.clone()
        };
        self.reject_non_normalized(&matching_path)?;

        if !path::is_printable_ascii(raw_path.as_bytes()) {
            return Err(RequestRejected::new(
                RejectionReason::NonPrintablePath,
                "The request was rejected because the URL contained non-printable characters",
            ));
        }

        self.reject_invalid_headers(request)?;

        if matching_path != raw_path {
            if path::rewrite_path(request, &matching_path) {
                tracing::debug!(
                    original = %raw_path,
                    rewritten = %matching_path,
                    "Stripped path parameters for matching"
                );
            } else {
                tracing::warn!(path = %raw_path, "Could not strip path parameters");
            }
        }
        Ok(())
    }

    fn firewalled_response(&self, mut response: Response) -> Response {
        let invalid: Vec<_> = response
            .headers()
            .iter()
            .filter(|(_, value)| !is_valid_header_value(value))
            .map(|(name, _)| name.clone())
            .collect();

        for name in invalid {
            tracing::warn!(header = %name, "Dropped response header with a non-visible value");
            response.headers_mut().remove(&name);
        }
        response
    }
}

/// Visible ASCII, space and tab.
fn is_valid_header_value(value: &HeaderValue) -> bool {
    value
        .as_bytes()
        .iter()
        .all(|&b| b == b'\t' || (0x20..=0x7E).contains(&b))
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    host.split(':').next().unwrap_or(host)
}

/// Builder for [`StrictFirewall`].
///
/// Every `allow_*` toggle defaults to `false`.
///
/// # Example
///
/// ```
/// use bastion_firewall::StrictFirewall;
/// use http::Method;
///
/// let firewall = StrictFirewall::builder()
///     .allowed_methods([Method::GET, Method::POST])
///     .allow_semicolon(true)
///     .allowed_hostnames(["api.example.com"])
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct StrictFirewallBuilder {
    allowed_methods: Option<HashSet<Method>>,
    allow_semicolon: bool,
    allow_url_encoded_slash: bool,
    allow_url_encoded_double_slash: bool,
    allow_url_encoded_period: bool,
    allow_backslash: bool,
    allow_null: bool,
    allow_url_encoded_percent: bool,
    allow_url_encoded_carriage_return: bool,
    allow_url_encoded_line_feed: bool,
    allow_url_encoded_line_separator: bool,
    allow_url_encoded_paragraph_separator: bool,
    allowed_hostnames: Vec<String>,
}

impl Default for StrictFirewallBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StrictFirewallBuilder {
    /// Creates a builder with the strict defaults.
    #[must_use]
    pub fn new() -> Self {
        let methods = DEFAULT_ALLOWED_METHODS
            .iter()
            .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
            .collect();

        Self {
            allowed_methods: Some(methods),
            allow_semicolon: false,
            allow_url_encoded_slash: false,
            allow_url_encoded_double_slash: false,
            allow_url_encoded_period: false,
            allow_backslash: false,
            allow_null: false,
            allow_url_encoded_percent: false,
            allow_url_encoded_carriage_return: false,
            allow_url_encoded_line_feed: false,
            allow_url_encoded_line_separator: false,
            allow_url_encoded_paragraph_separator: false,
            allowed_hostnames: Vec::new(),
        }
    }

    /// Replaces the method allow-list.
    pub fn allowed_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.allowed_methods = Some(methods.into_iter().collect());
        self
    }

    /// Accepts every HTTP method.
    pub fn allow_any_method(mut self) -> Self {
        self.allowed_methods = None;
        self
    }

    /// Accepts `;` and `%3B`; path parameters are stripped for matching.
    pub fn allow_semicolon(mut self, allow: bool) -> Self {
        self.allow_semicolon = allow;
        self
    }

    /// Accepts `%2F`.
    pub fn allow_url_encoded_slash(mut self, allow: bool) -> Self {
        self.allow_url_encoded_slash = allow;
        self
    }

    /// Accepts `//` and its encoded forms.
    pub fn allow_url_encoded_double_slash(mut self, allow: bool) -> Self {
        self.allow_url_encoded_double_slash = allow;
        self
    }

    /// Accepts `%2E`.
    pub fn allow_url_encoded_period(mut self, allow: bool) -> Self {
        self.allow_url_encoded_period = allow;
        self
    }

    /// Accepts `\` and `%5C`.
    pub fn allow_backslash(mut self, allow: bool) -> Self {
        self.allow_backslash = allow;
        self
    }

    /// Accepts `%00`.
    pub fn allow_null(mut self, allow: bool) -> Self {
        self.allow_null = allow;
        self
    }

    /// Accepts `%25`.
    pub fn allow_url_encoded_percent(mut self, allow: bool) -> Self {
        self.allow_url_encoded_percent = allow;
        self
    }

    /// Accepts `%0D`.
    pub fn allow_url_encoded_carriage_return(mut self, allow: bool) -> Self {
        self.allow_url_encoded_carriage_return = allow;
        self
    }

    /// Accepts `%0A`.
    pub fn allow_url_encoded_line_feed(mut self, allow: bool) -> Self {
        self.allow_url_encoded_line_feed = allow;
        self
    }

    /// Accepts `%E2%80%A8`.
    pub fn allow_url_encoded_line_separator(mut self, allow: bool) -> Self {
        self.allow_url_encoded_line_separator = allow;
        self
    }

    /// Accepts `%E2%80%A9`.
    pub fn allow_url_encoded_paragraph_separator(mut self, allow: bool) -> Self {
        self.allow_url_encoded_paragraph_separator = allow;
        self
    }

    /// Restricts accepted `Host` names. An empty list accepts any host.
    pub fn allowed_hostnames<S: Into<String>>(
        mut self,
        hosts: impl IntoIterator<Item = S>,
    ) -> Self {
        self.allowed_hostnames = hosts
            .into_iter()
            .map(|h| h.into().to_ascii_lowercase())
            .collect();
        self
    }

    /// Builds the firewall.
    #[must_use]
    pub fn build(self) -> StrictFirewall {
        let mut blocklist = Vec::new();
        if !self.allow_semicolon {
            blocklist.extend([Forbidden::character(";"), Forbidden::encoding("%3b")]);
        }
        if !self.allow_url_encoded_slash {
            blocklist.push(Forbidden::encoding("%2f"));
        }
        if !self.allow_url_encoded_double_slash {
            blocklist.extend([
                Forbidden::encoding("%2f%2f"),
                Forbidden::encoding("%2f/"),
                Forbidden::encoding("/%2f"),
                Forbidden {
                    needle: "//",
                    reason: RejectionReason::NonNormalizedPath,
                },
            ]);
        }
        if !self.allow_url_encoded_period {
            blocklist.push(Forbidden::encoding("%2e"));
        }
        if !self.allow_backslash {
            blocklist.extend([Forbidden::character("\\"), Forbidden::encoding("%5c")]);
        }
        if !self.allow_null {
            blocklist.push(Forbidden::encoding("%00"));
        }
        if !self.allow_url_encoded_percent {
            blocklist.push(Forbidden::encoding("%25"));
        }
        if !self.allow_url_encoded_carriage_return {
            blocklist.push(Forbidden::encoding("%0d"));
        }
        if !self.allow_url_encoded_line_feed {
            blocklist.push(Forbidden::encoding("%0a"));
        }
        if !self.allow_url_encoded_line_separator {
            blocklist.push(Forbidden::encoding("%e2%80%a8"));
        }
        if !self.allow_url_encoded_paragraph_separator {
            blocklist.push(Forbidden::encoding("%e2%80%a9"));
        }

        StrictFirewall {
            allowed_methods: self.allowed_methods,
            allow_semicolon: self.allow_semicolon,
            allow_url_encoded_double_slash: self.allow_url_encoded_double_slash,
            blocklist,
            allowed_hostnames: self.allowed_hostnames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use proptest::prelude::*;

    fn request(method: Method, uri: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn get(uri: &str) -> Request {
        request(Method::GET, uri)
    }

    fn reason(firewall: &StrictFirewall, mut req: Request) -> Option<RejectionReason> {
        firewall.firewalled_request(&mut req).err().map(|r| r.reason())
    }

    #[test]
    fn test_accepts_ordinary_request() {
        let firewall = StrictFirewall::default();
        let mut req = get("/api/users/42?sort=name");
        assert!(firewall.firewalled_request(&mut req).is_ok());
        assert!(!path::is_rewritten(&req));
    }

    #[test]
    fn test_rejects_method_outside_allow_list() {
        let firewall = StrictFirewall::default();
        assert_eq!(
            reason(&firewall, request(Method::TRACE, "/")),
            Some(RejectionReason::MethodNotAllowed)
        );
        let custom = Method::from_bytes(b"PROPFIND").unwrap();
        assert_eq!(
            reason(&firewall, request(custom.clone(), "/")),
            Some(RejectionReason::MethodNotAllowed)
        );

        let any = StrictFirewall::builder().allow_any_method().build();
        assert_eq!(reason(&any, request(custom, "/")), None);
    }

    #[test]
    fn test_rejects_semicolon() {
        let firewall = StrictFirewall::default();
        assert_eq!(
            reason(&firewall, get("/login;jsessionid=abc")),
            Some(RejectionReason::DisallowedCharacter)
        );
        assert_eq!(
            reason(&firewall, get("/login%3Bjsessionid=abc")),
            Some(RejectionReason::DisallowedEncoding)
        );
    }

    #[test]
    fn test_allowed_semicolon_strips_and_reset_restores() {
        let firewall = StrictFirewall::builder().allow_semicolon(true).build();
        let mut req = get("/admin;jsessionid=abc/panel?x=1");

        firewall.firewalled_request(&mut req).unwrap();
        assert_eq!(req.uri().path(), "/admin/panel");
        assert_eq!(req.uri().query(), Some("x=1"));

        firewall.reset(&mut req);
        assert_eq!(req.uri().path(), "/admin;jsessionid=abc/panel");
    }

    #[test]
    fn test_allowed_semicolon_still_catches_dot_dot_bypass() {
        let firewall = StrictFirewall::builder().allow_semicolon(true).build();
        assert_eq!(
            reason(&firewall, get("/public/..;/admin")),
            Some(RejectionReason::NonNormalizedPath)
        );
    }

    #[test]
    fn test_rejects_encoded_characters() {
        let firewall = StrictFirewall::default();
        for uri in [
            "/a%2Fb",
            "/a%2eb",
            "/a%5Cb",
            "/a%00b",
            "/a%25b",
            "/a%0Db",
            "/a%0ab",
            "/a%E2%80%A8b",
            "/a%e2%80%a9b",
        ] {
            assert_eq!(
                reason(&firewall, get(uri)),
                Some(RejectionReason::DisallowedEncoding),
                "{uri} should be rejected"
            );
        }
    }

    #[test]
    fn test_toggles_relax_rules() {
        let firewall = StrictFirewall::builder()
            .allow_url_encoded_slash(true)
            .allow_url_encoded_percent(true)
            .allow_null(true)
            .allow_url_encoded_carriage_return(true)
            .allow_url_encoded_line_feed(true)
            .allow_url_encoded_line_separator(true)
            .allow_url_encoded_paragraph_separator(true)
            .build();
        for uri in [
            "/a%2Fb",
            "/a%25b",
            "/a%00b",
            "/a%0Db",
            "/a%0Ab",
            "/a%E2%80%A8b",
            "/a%E2%80%A9b",
        ] {
            assert_eq!(reason(&firewall, get(uri)), None, "{uri} should be allowed");
        }
    }

    #[test]
    fn test_encoded_double_slash_needs_its_own_toggle() {
        let slash_only = StrictFirewall::builder().allow_url_encoded_slash(true).build();
        assert_eq!(
            reason(&slash_only, get("/a%2F%2Fb")),
            Some(RejectionReason::DisallowedEncoding)
        );

        let both = StrictFirewall::builder()
            .allow_url_encoded_slash(true)
            .allow_url_encoded_double_slash(true)
            .build();
        assert_eq!(reason(&both, get("/a%2F%2Fb")), None);
    }

    #[test]
    fn test_rejects_non_normalized_paths() {
        let firewall = StrictFirewall::default();
        for uri in ["/a/../b", "/a/./b", "/a/..", "/a//b"] {
            assert_eq!(
                reason(&firewall, get(uri)),
                Some(RejectionReason::NonNormalizedPath),
                "{uri} should be rejected"
            );
        }
    }

    #[test]
    fn test_decoded_dot_segments_rejected_when_period_allowed() {
        let firewall = StrictFirewall::builder().allow_url_encoded_period(true).build();
        assert_eq!(
            reason(&firewall, get("/a/%2e%2e/b")),
            Some(RejectionReason::NonNormalizedPath)
        );
        assert_eq!(reason(&firewall, get("/files/report%2epdf")), None);
    }

    #[test]
    fn test_rejects_non_visible_header_values() {
        let firewall = StrictFirewall::default();
        let mut req = get("/");
        req.headers_mut().insert(
            "x-note",
            HeaderValue::from_bytes(b"caf\xc3\xa9").unwrap(),
        );
        assert_eq!(reason(&firewall, req), Some(RejectionReason::InvalidHeader));

        let mut req = get("/");
        req.headers_mut()
            .insert("x-note", HeaderValue::from_static("tab\tis fine"));
        assert_eq!(reason(&firewall, req), None);
    }

    #[test]
    fn test_allowed_hostnames() {
        let firewall = StrictFirewall::builder()
            .allowed_hostnames(["API.example.com"])
            .build();

        let mut trusted = get("/");
        trusted
            .headers_mut()
            .insert(HOST, HeaderValue::from_static("api.example.com:8443"));
        assert_eq!(reason(&firewall, trusted), None);

        assert_eq!(reason(&firewall, get("http://api.example.com/")), None);

        let mut untrusted = get("/");
        untrusted
            .headers_mut()
            .insert(HOST, HeaderValue::from_static("evil.example.com"));
        assert_eq!(
            reason(&firewall, untrusted),
            Some(RejectionReason::UntrustedHost)
        );

        assert_eq!(
            reason(&firewall, get("/")),
            Some(RejectionReason::UntrustedHost)
        );
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.com:80"), "example.com");
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("[::1]:8080"), "[::1]");
    }

    #[test]
    fn test_response_drops_invisible_header_values() {
        let firewall = StrictFirewall::default();
        let mut response = Response::new(Full::new(Bytes::new()));
        response
            .headers_mut()
            .insert("x-ok", HeaderValue::from_static("fine"));
        response
            .headers_mut()
            .insert("x-bad", HeaderValue::from_bytes(b"caf\xc3\xa9").unwrap());

        let response = firewall.firewalled_response(response);
        assert!(response.headers().contains_key("x-ok"));
        assert!(!response.headers().contains_key("x-bad"));
    }

    #[test]
    fn test_from_config() {
        let config = FirewallConfig {
            allowed_methods: vec!["GET".to_string()],
            allow_semicolon: true,
            ..FirewallConfig::default()
        };
        let firewall = StrictFirewall::from_config(&config).unwrap();
        assert_eq!(
            reason(&firewall, request(Method::POST, "/")),
            Some(RejectionReason::MethodNotAllowed)
        );
        assert_eq!(reason(&firewall, get("/a;b=c")), None);

        let bad = FirewallConfig {
            allowed_methods: vec!["G ET".to_string()],
            ..FirewallConfig::default()
        };
        assert!(matches!(
            StrictFirewall::from_config(&bad),
            Err(SecurityError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_rejected_request_is_not_rewritten() {
        let firewall = StrictFirewall::builder().allow_semicolon(true).build();
        let mut req = get("/a;x=1/%2e%2e");
        assert!(firewall.firewalled_request(&mut req).is_err());
        assert_eq!(req.uri().path(), "/a;x=1/%2e%2e");
        assert!(!path::is_rewritten(&req));
    }

    proptest! {
        #[test]
        fn prop_dot_dot_segments_always_rejected(
            prefix in proptest::collection::vec("[a-z0-9]{1,6}", 0..4),
            suffix in proptest::collection::vec("[a-z0-9]{1,6}", 0..4),
        ) {
            let mut segments = prefix;
            segments.push("..".to_string());
            segments.extend(suffix);
            let uri = format!("/{}", segments.join("/"));

            let firewall = StrictFirewall::default();
            prop_assert_eq!(
                reason(&firewall, get(&uri)),
                Some(RejectionReason::NonNormalizedPath)
            );
        }

        #[test]
        fn prop_plain_paths_accepted(segments in proptest::collection::vec("[a-zA-Z0-9_-]{1,8}", 0..6)) {
            let uri = format!("/{}", segments.join("/"));
            let firewall = StrictFirewall::default();
            prop_assert_eq!(reason(&firewall, get(&uri)), None);
        }
    }
}
