//! Mechanism feature flags.
//!
//! Features describe protocol-shape requirements a mechanism places on the
//! session (who sends first, whether the server hostname must be known)
//! and optional capabilities the session may require of a mechanism
//! (HTTP authentication, channel bindings).

use bitflags::bitflags;

bitflags! {
    /// Static features of a mechanism, declared at registration time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Features: u32 {
        /// Mechanism requires the server's fully-qualified hostname.
        const NEEDS_SERVER_FQDN = 0x01;
        /// Mechanism prefers the client to send first.
        const WANTS_CLIENT_FIRST = 0x02;
        /// Mechanism only supports server-first exchanges.
        const SERVER_FIRST = 0x04;
        /// Don't use cleartext passwords.
        const AVOID_USER_PASSWORD = 0x08;
        /// Mechanism uses GSS framing.
        const GSS_FRAMING = 0x10;
        /// Mechanism can be used for HTTP authentication.
        const SUPPORTS_HTTP = 0x20;
        /// Mechanism supports channel bindings.
        const CHANNEL_BINDINGS = 0x40;
    }
}

impl Features {
    /// Human-readable description of a single feature flag.
    ///
    /// Composite values are not described; pass one flag at a time.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self.bits() {
            0x01 => "mechanism requires the server FQDN",
            0x02 => "mechanism prefers client-first protocol",
            0x04 => "mechanism requires server-first protocol",
            0x08 => "don't use clear text passwords",
            0x10 => "mechanism uses GSSAPI framing",
            0x20 => "mechanism supports HTTP authentication",
            0x40 => "mechanism supports channel bindings",
            _ => "unknown",
        }
    }
}
