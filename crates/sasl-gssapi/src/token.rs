//! RFC 4752 security-layer negotiation token.
//!
//! Exchanged exactly once per handshake as the payload of a GSS-wrapped
//! message: 4 bytes, where byte 0 is a quality-of-protection bitmask and
//! bytes 1–3 carry the sender's maximum acceptable message size as a
//! big-endian 24-bit integer. The layout must round-trip byte-for-byte
//! with conforming peers.

use bitflags::bitflags;

use sasl_core::SaslError;

/// Size of the negotiation token payload.
pub const TOKEN_LEN: usize = 4;

/// Largest message size representable in the 24-bit size field.
pub const MAX_SIZE_FIELD: u32 = 0x00FF_FFFF;

bitflags! {
    /// Quality-of-protection bitmask (RFC 4752 §3.3).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Qop: u8 {
        /// No security layer.
        const NONE = 0x01;
        /// Integrity protection.
        const INTEGRITY = 0x02;
        /// Confidentiality protection (implies integrity on the wire).
        const CONFIDENTIALITY = 0x04;
    }
}

/// Decoded security-layer negotiation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityLayerToken {
    /// Offered or chosen quality-of-protection set.
    pub qop: Qop,
    /// Largest message the sender is willing to receive.
    pub max_message_size: u32,
}

impl SecurityLayerToken {
    /// Parse a token from an unwrapped payload.
    ///
    /// # Errors
    ///
    /// Returns [`SaslError::BadToken`] unless the payload is exactly
    /// 4 bytes.
    pub fn decode(data: &[u8]) -> Result<Self, SaslError> {
        if data.len() != TOKEN_LEN {
            return Err(SaslError::BadToken(format!(
                "SSF negotiate token is {} bytes, wanted {}",
                data.len(),
                TOKEN_LEN
            )));
        }

        // undefined QOP bits are ignored, per RFC 4752
        let qop = Qop::from_bits_truncate(data[0]);
        let max_message_size =
            u32::from(data[1]) << 16 | u32::from(data[2]) << 8 | u32::from(data[3]);

        Ok(Self {
            qop,
            max_message_size,
        })
    }

    /// Serialize the token. The size field saturates at its 24-bit
    /// maximum.
    #[must_use]
    pub fn encode(&self) -> [u8; TOKEN_LEN] {
        let size = self.max_message_size.min(MAX_SIZE_FIELD);
        [
            self.qop.bits(),
            (size >> 16) as u8,
            (size >> 8) as u8,
            size as u8,
        ]
    }
}
