//! SASL error types.

use thiserror::Error;

use crate::ssf::Ssf;

/// Errors that can occur while configuring or driving a SASL session.
///
/// All handshake errors are terminal for the session; the framework never
/// retries. A caller may build a new session with adjusted constraints.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaslError {
    /// No candidate mechanism satisfies the session requirements.
    #[error("no worthy mechs found")]
    NoMechanism,

    /// A handshake operation was invoked before `start`.
    #[error("must use start() before step()")]
    NotStarted,

    /// `step` was invoked on an already-established context.
    #[error("context is already established")]
    AlreadyEstablished,

    /// An established context was required but negotiation is incomplete.
    #[error("context is not established")]
    NotEstablished,

    /// The negotiated strength is provably below the configured minimum.
    #[error(
        "mechanism SSF ({mech_ssf}) plus external SSF ({external_ssf}) \
         is less than required SSF ({required_ssf})"
    )]
    TooWeak {
        /// Strength the mechanism's channel can provide.
        mech_ssf: Ssf,
        /// Strength of the external layer.
        external_ssf: Ssf,
        /// Configured minimum.
        required_ssf: Ssf,
    },

    /// The mechanism requires the server's hostname but none was configured.
    #[error("server FQDN not provided")]
    MissingServerFqdn,

    /// A server hostname failed syntax validation.
    #[error("bad hostname: {0}")]
    BadHostname(String),

    /// The peer sent a malformed negotiation token.
    #[error("bad token: {0}")]
    BadToken(String),

    /// No mutually acceptable quality of protection exists, or a data
    /// protection call was made with no security layer negotiated.
    #[error("no suitable security layer available")]
    NoSecurityLayer,

    /// Failure reported by the underlying security mechanism engine.
    #[error("mechanism error: {0}")]
    Mechanism(String),
}

/// Errors raised while composing the mechanism catalog.
///
/// These indicate a build-time defect (a plugin registering a malformed or
/// colliding name), not a runtime condition: they should abort startup
/// composition rather than be handled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The mechanism name does not match the RFC 4422 §3.1 pattern.
    #[error("bad mechanism name: {0}")]
    InvalidName(String),

    /// A mechanism with this name is already registered.
    #[error("cannot register two mechanisms named {0}")]
    Duplicate(String),
}
