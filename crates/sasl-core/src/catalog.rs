//! The mechanism catalog.
//!
//! A catalog is a write-once mapping from mechanism name to a construction
//! factory and capability descriptor. It is composed once at startup with
//! [`CatalogBuilder`], then shared read-only into sessions; there is no
//! unregistration and no mutation after [`CatalogBuilder::build`].
//!
//! Name order is preserved from registration, and that order is the
//! default candidate preference when a session does not supply its own
//! mechanism list.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CatalogError;
use crate::mechanism::{Mechanism, MechanismConfig, MechanismFactory, MechanismProps};

// See RFC 4422 § 3.1
#[allow(clippy::unwrap_used)]
static MECH_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9-_]{1,20}$").unwrap());

struct Entry {
    factory: MechanismFactory,
    props: MechanismProps,
}

/// Builder composing a [`MechanismCatalog`] during startup.
#[derive(Default)]
pub struct CatalogBuilder {
    entries: HashMap<String, Entry>,
    order: Vec<String>,
}

impl CatalogBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mechanism under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidName`] if `name` does not match the
    /// RFC 4422 §3.1 pattern, or [`CatalogError::Duplicate`] if the name is
    /// already taken. Both indicate a startup-composition defect and should
    /// be propagated out of initialization, not handled.
    pub fn register(
        &mut self,
        name: &str,
        factory: MechanismFactory,
        props: MechanismProps,
    ) -> Result<(), CatalogError> {
        if !MECH_NAME_RE.is_match(name) {
            return Err(CatalogError::InvalidName(name.to_owned()));
        }
        if self.entries.contains_key(name) {
            return Err(CatalogError::Duplicate(name.to_owned()));
        }

        self.entries.insert(name.to_owned(), Entry { factory, props });
        self.order.push(name.to_owned());
        Ok(())
    }

    /// Freeze the builder into an immutable catalog.
    #[must_use]
    pub fn build(self) -> MechanismCatalog {
        MechanismCatalog {
            entries: self.entries,
            order: self.order,
        }
    }
}

/// Immutable catalog of registered mechanisms.
pub struct MechanismCatalog {
    entries: HashMap<String, Entry>,
    order: Vec<String>,
}

impl MechanismCatalog {
    /// Whether a mechanism is registered under `name`.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Construct a session instance of the named mechanism.
    ///
    /// Returns `None` if the name is unknown.
    #[must_use]
    pub fn instantiate(
        &self,
        name: &str,
        config: MechanismConfig,
    ) -> Option<Box<dyn Mechanism + Send>> {
        self.entries.get(name).map(|e| (e.factory)(config))
    }

    /// Capability descriptor of the named mechanism.
    ///
    /// Unknown names yield the zero descriptor, which fails every
    /// selection filter.
    #[must_use]
    pub fn props(&self, name: &str) -> MechanismProps {
        self.entries
            .get(name)
            .map(|e| e.props)
            .unwrap_or_default()
    }

    /// Registered mechanism names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl std::fmt::Debug for MechanismCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MechanismCatalog")
            .field("names", &self.order)
            .finish()
    }
}
