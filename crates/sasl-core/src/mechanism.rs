//! The pluggable mechanism contract.
//!
//! Every SASL mechanism implements the [`Mechanism`] trait and is
//! constructed per session from a [`MechanismConfig`] by a factory stored
//! in the catalog. A session drives the handshake with [`Mechanism::step`]
//! and, once established, passes application data through
//! [`Mechanism::encode`] / [`Mechanism::decode`].

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::SaslError;
use crate::features::Features;
use crate::properties::SecurityProperties;
use crate::ssf::Ssf;

/// Static capability descriptor a mechanism registers with.
///
/// Created once at startup composition, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MechanismProps {
    /// Maximum security strength factor the mechanism can contribute.
    pub max_ssf: Ssf,
    /// Protections the mechanism offers.
    pub security_properties: SecurityProperties,
    /// Protocol-shape features and optional capabilities.
    pub features: Features,
}

/// Parameters of an established security context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContextParams {
    /// Negotiated security strength factor (0 = no security layer).
    pub ssf: Ssf,
    /// Largest message the peer is willing to receive, after any
    /// wrap-overhead clamping.
    pub max_peer_message_size: u32,
}

/// Channel-binding data tying the authentication to an outer channel
/// (RFC 5056), typically derived from the TLS connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelBinding {
    /// The application-supplied channel-binding bytes.
    pub data: Bytes,
    /// Whether authentication must fail if the binding cannot be used.
    pub critical: bool,
}

/// Per-session configuration handed to a mechanism factory.
///
/// Carries everything a mechanism needs to run its handshake; the
/// candidate mechanism list itself stays with the session.
#[derive(Debug, Clone)]
pub struct MechanismConfig {
    /// Service name used to build the target principal (e.g. `"imap"`).
    pub service: String,
    /// Fully-qualified server hostname, when known.
    pub server_fqdn: Option<String>,
    /// Minimum acceptable total SSF.
    pub min_ssf: Ssf,
    /// Maximum SSF the session wants any layer to use.
    pub max_ssf: Ssf,
    /// Largest message this side is willing to receive.
    pub max_buf_size: u32,
    /// Strength of an already-established external layer (e.g. TLS).
    pub external_ssf: Ssf,
    /// Protections the session requires.
    pub security_properties: SecurityProperties,
    /// HTTP authentication mode (e.g. Negotiate); skips the SASL
    /// security-layer negotiation.
    pub http_mode: bool,
    /// Free-form mechanism-specific properties.
    pub extra_props: HashMap<String, String>,
    /// Optional channel-binding request.
    pub channel_binding: Option<ChannelBinding>,
}

impl Default for MechanismConfig {
    fn default() -> Self {
        Self {
            service: String::new(),
            server_fqdn: None,
            min_ssf: 0,
            max_ssf: Ssf::MAX,
            max_buf_size: 65536,
            external_ssf: 0,
            security_properties: SecurityProperties::NO_ANONYMOUS
                | SecurityProperties::NO_PLAINTEXT,
            http_mode: false,
            extra_props: HashMap::new(),
            channel_binding: None,
        }
    }
}

/// A live, per-session mechanism instance.
///
/// Sessions are strictly sequential: `step` must never run concurrently
/// with itself or with `encode`/`decode` on the same instance. The trait
/// takes `&mut self` throughout, so the borrow checker enforces this
/// within a single session.
pub trait Mechanism {
    /// The mechanism's registered name.
    fn name(&self) -> &'static str;

    /// The mechanism's static capability descriptor.
    fn properties(&self) -> MechanismProps;

    /// Whether the handshake has completed.
    fn is_established(&self) -> bool;

    /// Run one handshake step.
    ///
    /// `None` means no token has been received yet (the very first step of
    /// a client-first exchange); `Some(&[])` is a received zero-length
    /// token, which is distinct. Returns the token to send to the peer,
    /// if any.
    fn step(&mut self, input: Option<&[u8]>) -> Result<Option<Bytes>, SaslError>;

    /// Negotiated context parameters; meaningful only once established.
    fn context_params(&self) -> ContextParams;

    /// Protect an outgoing message with the negotiated security layer.
    fn encode(&mut self, input: &[u8]) -> Result<Bytes, SaslError>;

    /// Unprotect an incoming message with the negotiated security layer.
    fn decode(&mut self, input: &[u8]) -> Result<Bytes, SaslError>;
}

/// Factory constructing a mechanism instance for one session.
pub type MechanismFactory =
    Box<dyn Fn(MechanismConfig) -> Box<dyn Mechanism + Send> + Send + Sync>;
