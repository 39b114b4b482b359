//! The external security-context collaborator.
//!
//! The SASL GSSAPI mechanism does not implement Kerberos itself; it drives
//! an external security context through this trait. The `krb5` feature
//! provides a libgssapi-backed implementation; applications with their own
//! GSSAPI engine (or tests) can supply any other implementation through
//! [`crate::register_with`].

use bitflags::bitflags;
use bytes::Bytes;

use sasl_core::{SaslError, Ssf};

bitflags! {
    /// GSS context establishment flags, both requested and negotiated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ContextFlags: u32 {
        /// Mutual authentication of client and server.
        const MUTUAL = 0x01;
        /// Message sequencing detection.
        const SEQUENCE = 0x02;
        /// Replay detection.
        const REPLAY = 0x04;
        /// Per-message integrity protection available.
        const INTEGRITY = 0x08;
        /// Per-message confidentiality protection available.
        const CONFIDENTIALITY = 0x10;
    }
}

/// One external security context, exclusively owned by a mechanism
/// instance for the lifetime of its session.
pub trait SecurityContext: Send {
    /// Begin context establishment toward `principal` with the given
    /// requested flags and optional channel-binding data.
    fn initiate(
        &mut self,
        principal: &str,
        flags: ContextFlags,
        channel_binding: Option<&[u8]>,
    ) -> Result<(), SaslError>;

    /// Feed a peer token into context establishment; returns the next
    /// token to send, if any.
    fn step(&mut self, input: &[u8]) -> Result<Option<Bytes>, SaslError>;

    /// Whether context establishment has completed.
    fn is_established(&self) -> bool;

    /// Flags actually granted by the peer (valid once established).
    fn negotiated_flags(&self) -> ContextFlags;

    /// Protect a message; `confidential` selects encryption rather than
    /// integrity-only protection.
    fn wrap(&mut self, data: &[u8], confidential: bool) -> Result<Bytes, SaslError>;

    /// Unprotect a message; the boolean reports whether confidentiality
    /// was applied by the peer.
    fn unwrap(&mut self, token: &[u8]) -> Result<(Bytes, bool), SaslError>;

    /// Intrinsic strength of the established channel.
    fn ssf(&self) -> Ssf;

    /// Largest pre-wrap message that stays within `output_limit` bytes
    /// once wrapped with the given protection level.
    fn wrap_size_limit(&mut self, output_limit: u32, confidential: bool)
        -> Result<u32, SaslError>;
}
