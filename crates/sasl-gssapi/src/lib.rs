//! # sasl-gssapi
//!
//! Client-side GSSAPI/Kerberos SASL mechanism
//! ([RFC 4752](https://tools.ietf.org/html/rfc4752)).
//!
//! The mechanism drives an external GSSAPI security context through the
//! [`SecurityContext`] trait: context establishment first, then one wrapped
//! token exchange negotiating the SASL security layer (quality of
//! protection and buffer sizes). Kerberos itself is never reimplemented
//! here.
//!
//! ## Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `krb5`  | `libgssapi`-backed [`Krb5Context`] using the system Kerberos libraries |
//!
//! Without `krb5`, register through [`register_with`] and supply your own
//! [`SecurityContext`] implementation.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sasl_core::CatalogBuilder;
//!
//! let mut builder = CatalogBuilder::new();
//! sasl_gssapi::register(&mut builder)?;
//! let catalog = builder.build();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod context;
#[cfg(feature = "krb5")]
pub mod krb5;
pub mod mech;
pub mod token;

pub use context::{ContextFlags, SecurityContext};
#[cfg(feature = "krb5")]
pub use krb5::Krb5Context;
pub use mech::{GssapiMechanism, MECH_NAME, PROPS};
pub use token::{Qop, SecurityLayerToken};

use sasl_core::{CatalogBuilder, CatalogError};

/// Register the GSSAPI mechanism with a caller-supplied security-context
/// provider.
///
/// `context_factory` is invoked once per session to produce the external
/// context the handshake will drive.
///
/// # Errors
///
/// Propagates [`CatalogError`] from the builder; a duplicate registration
/// is a startup-composition defect.
pub fn register_with<F>(builder: &mut CatalogBuilder, context_factory: F) -> Result<(), CatalogError>
where
    F: Fn() -> Box<dyn SecurityContext + Send> + Send + Sync + 'static,
{
    builder.register(
        MECH_NAME,
        Box::new(move |config| Box::new(GssapiMechanism::with_context(config, context_factory()))),
        PROPS,
    )
}

/// Register the GSSAPI mechanism backed by the system Kerberos libraries.
///
/// # Errors
///
/// Propagates [`CatalogError`] from the builder.
#[cfg(feature = "krb5")]
pub fn register(builder: &mut CatalogBuilder) -> Result<(), CatalogError> {
    register_with(builder, || Box::new(Krb5Context::new()))
}
