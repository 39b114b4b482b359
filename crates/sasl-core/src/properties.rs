//! Security property flags.
//!
//! A mechanism descriptor advertises the protections the mechanism can
//! offer; a session configures the protections it requires. Matching is a
//! plain subset check: a mechanism is acceptable when every required bit is
//! among its advertised bits.

use bitflags::bitflags;

bitflags! {
    /// Security properties required of, or advertised by, a mechanism.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SecurityProperties: u32 {
        /// Don't permit mechanisms susceptible to simple passive attack
        /// (e.g. PLAIN, LOGIN).
        const NO_PLAINTEXT = 0x01;
        /// Protection from active (non-dictionary) attacks.
        const NO_ACTIVE = 0x02;
        /// Don't permit mechanisms susceptible to passive dictionary attack.
        const NO_DICTIONARY = 0x04;
        /// Require forward secrecy between sessions.
        const FORWARD_SECRECY = 0x08;
        /// Don't permit mechanisms that allow anonymous login.
        const NO_ANONYMOUS = 0x10;
        /// Require mechanisms that pass client credentials.
        const PASS_CREDENTIALS = 0x20;
        /// Require mechanisms that provide mutual authentication.
        const MUTUAL_AUTH = 0x40;
    }
}

impl SecurityProperties {
    /// Human-readable description of a single property flag.
    ///
    /// Composite values are not described; pass one flag at a time.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self.bits() {
            0x01 => "no plain text mechanisms",
            0x02 => "active attack protection",
            0x04 => "no mechanisms susceptible to dictionary attacks",
            0x08 => "require forward secrecy",
            0x10 => "no anonymous mechanisms",
            0x20 => "require passing of client credentials",
            0x40 => "require mutual authentication",
            _ => "unknown",
        }
    }
}
