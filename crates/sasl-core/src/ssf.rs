//! Security-strength-factor arithmetic.
//!
//! A security strength factor (SSF) is a rough numeric measure of the
//! protection a layer provides: 0 means no protection, 1 means integrity
//! only, and anything above 1 means confidentiality, with the magnitude
//! conveying mechanism-defined cipher strength (e.g. 56 for DES, 256 for
//! AES-256).
//!
//! SSF bounds configured on a session are *additional to* any security
//! layer the application already has in place (typically TLS). The helpers
//! here compute the residual strength a mechanism still has to provide once
//! that external layer is taken into account.

use crate::properties::SecurityProperties;

/// Security strength factor.
pub type Ssf = u32;

/// Residual SSF a mechanism must (or may) contribute once an external
/// layer of strength `external` is accounted for.
///
/// Returns `bound - external`, floored at zero.
#[must_use]
pub fn residual(bound: Ssf, external: Ssf) -> Ssf {
    bound.saturating_sub(external)
}

/// Apply the plaintext waiver to a required property set.
///
/// If the external layer is already stronger than the configured minimum
/// and provides confidentiality (strength above 1), credentials are not
/// exposed on the wire and the no-plaintext requirement is dropped before
/// mechanism matching.
#[must_use]
pub fn effective_requirements(
    want: SecurityProperties,
    min_ssf: Ssf,
    external_ssf: Ssf,
) -> SecurityProperties {
    if external_ssf > min_ssf && external_ssf > 1 {
        want - SecurityProperties::NO_PLAINTEXT
    } else {
        want
    }
}
