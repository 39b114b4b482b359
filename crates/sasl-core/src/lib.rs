//! # sasl-core
//!
//! Core model for SASL (Simple Authentication and Security Layer,
//! [RFC 4422](https://tools.ietf.org/html/rfc4422)) mechanism negotiation.
//!
//! This crate defines the vocabulary shared by every SASL mechanism and by
//! the client session layer: security-strength-factor arithmetic, security
//! property and feature flag sets, the pluggable `Mechanism` contract, and
//! the write-once mechanism catalog that sessions select from.
//!
//! ## Design Philosophy
//!
//! This crate is intentionally IO-agnostic. It contains no networking logic
//! and no cryptography; mechanisms transform byte buffers and the caller is
//! responsible for transporting them. Higher-level crates (`sasl-client`,
//! `sasl-gssapi`) build on this foundation.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sasl_core::{CatalogBuilder, MechanismProps, SecurityProperties, Features};
//!
//! let mut builder = CatalogBuilder::new();
//! builder.register("GSSAPI", factory, MechanismProps {
//!     max_ssf: 256,
//!     security_properties: SecurityProperties::NO_PLAINTEXT
//!         | SecurityProperties::MUTUAL_AUTH,
//!     features: Features::NEEDS_SERVER_FQDN,
//! })?;
//! let catalog = builder.build();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod features;
pub mod mechanism;
pub mod properties;
pub mod ssf;

pub use catalog::{CatalogBuilder, MechanismCatalog};
pub use error::{CatalogError, SaslError};
pub use features::Features;
pub use mechanism::{
    ChannelBinding, ContextParams, Mechanism, MechanismConfig, MechanismFactory, MechanismProps,
};
pub use properties::SecurityProperties;
pub use ssf::Ssf;
