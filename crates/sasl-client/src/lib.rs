//! # sasl-client
//!
//! Client-side SASL (RFC 4422) session API: mechanism selection under
//! security-strength constraints, handshake driving, and post-negotiation
//! data protection.
//!
//! This is the primary public API surface for the rust-sasl-client
//! project. The crate is transport-agnostic: protocol clients (IMAP, LDAP,
//! SMTP, HTTP-Negotiate) carry the tokens; a session only transforms byte
//! buffers.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sasl_client::{SaslClient, SaslClientBuilder};
//!
//! // startup composition: build the mechanism catalog once
//! let catalog = sasl_client::default_catalog()?;
//!
//! let mut client = SaslClientBuilder::new("imap")
//!     .server_fqdn("mail.example.com")
//!     .min_ssf(56)
//!     .build(catalog)?;
//!
//! // drive the handshake; the protocol client moves the tokens
//! let mut token = client.start()?;
//! while !client.is_established() {
//!     let reply = exchange_with_server(token)?;
//!     token = client.step(&reply)?;
//! }
//!
//! // pass application data through the negotiated layer
//! let protected = client.encode(b"a001 SELECT INBOX")?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
mod select;

pub use client::SaslClient;
pub use config::SaslClientBuilder;

// the core vocabulary is part of this crate's public API
pub use sasl_core::{
    CatalogBuilder, CatalogError, ChannelBinding, ContextParams, Features, Mechanism,
    MechanismCatalog, MechanismConfig, MechanismProps, SaslError, SecurityProperties, Ssf,
};

#[cfg(feature = "gssapi")]
pub use sasl_gssapi;

/// Build a catalog containing the stock mechanisms, backed by the system
/// Kerberos libraries.
///
/// # Errors
///
/// Propagates [`CatalogError`] from registration; failure indicates a
/// startup-composition defect.
#[cfg(feature = "krb5")]
pub fn default_catalog() -> Result<std::sync::Arc<MechanismCatalog>, CatalogError> {
    let mut builder = CatalogBuilder::new();
    sasl_gssapi::register(&mut builder)?;
    Ok(std::sync::Arc::new(builder.build()))
}
