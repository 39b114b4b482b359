//! Session configuration.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use sasl_core::{
    ChannelBinding, MechanismCatalog, MechanismConfig, SaslError, SecurityProperties, Ssf,
};

use crate::client::SaslClient;

// RFC 952/1123 hostname: dot-separated LDH labels, no leading or
// trailing hyphen
#[allow(clippy::unwrap_used)]
static HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9])\.)*([A-Za-z0-9]|[A-Za-z0-9][A-Za-z0-9\-]*[A-Za-z0-9])$",
    )
    .unwrap()
});

/// Builder for a [`SaslClient`] session.
///
/// Defaults: no minimum strength, unlimited maximum strength, a 64 KiB
/// receive buffer, and the no-anonymous / no-plaintext security
/// properties.
///
/// # Example
///
/// ```rust,ignore
/// let client = SaslClientBuilder::new("ldap")
///     .server_fqdn("dc1.example.com")
///     .mechanisms(["GSSAPI"])
///     .extra_property("ad_compat", "1")
///     .build(catalog)?;
/// ```
#[derive(Debug, Clone)]
pub struct SaslClientBuilder {
    mechanisms: Vec<String>,
    config: MechanismConfig,
}

impl SaslClientBuilder {
    /// Create a builder for the given service (e.g. `"imap"`, `"ldap"`),
    /// used to form the target principal.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            mechanisms: Vec::new(),
            config: MechanismConfig {
                service: service.into(),
                ..MechanismConfig::default()
            },
        }
    }

    /// Candidate mechanisms in preference order.
    ///
    /// Order is the only ranking signal during selection. When not set,
    /// every registered mechanism is a candidate, in registration order.
    #[must_use]
    pub fn mechanisms<I, S>(mut self, mechs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mechanisms = mechs.into_iter().map(Into::into).collect();
        self
    }

    /// The server's fully-qualified hostname.
    ///
    /// Required by mechanisms that authenticate the server (GSSAPI).
    /// Validated at [`build`](Self::build) time.
    #[must_use]
    pub fn server_fqdn(mut self, fqdn: impl Into<String>) -> Self {
        let fqdn = fqdn.into();
        if !fqdn.is_empty() {
            self.config.server_fqdn = Some(fqdn);
        }
        self
    }

    /// Minimum acceptable total security strength (default: 0).
    #[must_use]
    pub fn min_ssf(mut self, ssf: Ssf) -> Self {
        self.config.min_ssf = ssf;
        self
    }

    /// Maximum security strength any layer may use (default: unlimited).
    #[must_use]
    pub fn max_ssf(mut self, ssf: Ssf) -> Self {
        self.config.max_ssf = ssf;
        self
    }

    /// Largest message this side is willing to receive (default: 64 KiB).
    #[must_use]
    pub fn max_buf_size(mut self, size: u32) -> Self {
        self.config.max_buf_size = size;
        self
    }

    /// Required security properties; undefined bits are discarded.
    #[must_use]
    pub fn security_properties(mut self, props: SecurityProperties) -> Self {
        self.config.security_properties = props.intersection(SecurityProperties::all());
        self
    }

    /// Strength of an already-established external layer such as TLS
    /// (default: 0).
    #[must_use]
    pub fn external_ssf(mut self, ssf: Ssf) -> Self {
        self.config.external_ssf = ssf;
        self
    }

    /// Negotiate for HTTP authentication (e.g. Negotiate); skips the
    /// SASL security-layer exchange.
    #[must_use]
    pub fn http_mode(mut self) -> Self {
        self.config.http_mode = true;
        self
    }

    /// Request channel binding to the outer transport.
    #[must_use]
    pub fn channel_binding(mut self, binding: ChannelBinding) -> Self {
        self.config.channel_binding = Some(binding);
        self
    }

    /// Set a free-form mechanism-specific property (e.g. `ad_compat`).
    #[must_use]
    pub fn extra_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.extra_props.insert(key.into(), value.into());
        self
    }

    /// Validate the configuration and bind it to a catalog.
    ///
    /// The candidate list is trimmed to registered names; when no list was
    /// supplied, all registered mechanisms become candidates in
    /// registration order.
    ///
    /// # Errors
    ///
    /// [`SaslError::BadHostname`] if the configured FQDN fails syntax
    /// validation; [`SaslError::NoMechanism`] if no candidate mechanism is
    /// registered.
    pub fn build(self, catalog: Arc<MechanismCatalog>) -> Result<SaslClient, SaslError> {
        if let Some(fqdn) = self.config.server_fqdn.as_deref() {
            if !HOSTNAME_RE.is_match(fqdn) {
                return Err(SaslError::BadHostname(fqdn.to_owned()));
            }
        }

        let mechanisms: Vec<String> = if self.mechanisms.is_empty() {
            let all: Vec<String> = catalog.names().map(str::to_owned).collect();
            tracing::debug!(mechs = ?all, "using all registered mechs");
            all
        } else {
            let trimmed: Vec<String> = self
                .mechanisms
                .into_iter()
                .filter(|name| catalog.is_registered(name))
                .collect();
            tracing::debug!(mechs = ?trimmed, "using specified registered mechs");
            trimmed
        };

        if mechanisms.is_empty() {
            return Err(SaslError::NoMechanism);
        }

        Ok(SaslClient::new(catalog, mechanisms, self.config))
    }
}
