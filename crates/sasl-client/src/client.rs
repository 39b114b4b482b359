//! The SASL client session.
//!
//! One session negotiates one authentication: [`SaslClient::start`] picks
//! a mechanism and may produce the first token, [`SaslClient::step`] feeds
//! peer tokens through the handshake, and once established
//! [`SaslClient::encode`] / [`SaslClient::decode`] pass application data
//! through the negotiated security layer.
//!
//! Sessions are strictly sequential half-duplex exchanges; the caller
//! serializes all calls (`&mut self` enforces this within one session)
//! and owns all token transport, timeouts, and retries. Abandoning a
//! session is simply dropping it; partially-negotiated state is never
//! reused.

use std::sync::Arc;

use bytes::Bytes;

use sasl_core::{
    ContextParams, Features, Mechanism, MechanismCatalog, MechanismConfig, SaslError,
};

use crate::select;

/// A client-side SASL session.
///
/// Built by [`crate::SaslClientBuilder`]; holds the catalog it selects
/// from and, after [`start`](Self::start), the bound mechanism instance.
pub struct SaslClient {
    catalog: Arc<MechanismCatalog>,
    mechanisms: Vec<String>,
    config: MechanismConfig,
    mech: Option<Box<dyn Mechanism + Send>>,
}

impl SaslClient {
    pub(crate) fn new(
        catalog: Arc<MechanismCatalog>,
        mechanisms: Vec<String>,
        config: MechanismConfig,
    ) -> Self {
        Self {
            catalog,
            mechanisms,
            config,
            mech: None,
        }
    }

    /// The trimmed candidate mechanism list, in preference order.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.mechanisms
    }

    /// Name of the mechanism bound by [`start`](Self::start), if any.
    #[must_use]
    pub fn selected_mechanism(&self) -> Option<&str> {
        self.mech.as_ref().map(|m| m.name())
    }

    /// Whether the handshake has completed.
    #[must_use]
    pub fn is_established(&self) -> bool {
        self.mech.as_ref().is_some_and(|m| m.is_established())
    }

    /// Select a mechanism and begin the handshake.
    ///
    /// Discards any previously bound mechanism, so a failed negotiation
    /// can be restarted from scratch with the same session. Returns the
    /// first token to send, or `None` when the chosen mechanism requires
    /// the server to go first.
    ///
    /// # Errors
    ///
    /// [`SaslError::NoMechanism`] when no candidate satisfies the session
    /// requirements, plus any error from the mechanism's first step.
    pub fn start(&mut self) -> Result<Option<Bytes>, SaslError> {
        self.mech = None;

        let disposition = select::disposition(
            &self.catalog,
            &self.mechanisms,
            self.config.channel_binding.as_ref(),
        )?;

        let chosen = select::first_fit(&self.catalog, &self.mechanisms, &self.config, disposition)?;
        tracing::debug!(mech = %chosen, "chose mechanism");

        let mech = self
            .catalog
            .instantiate(&chosen, self.config.clone())
            .ok_or(SaslError::NoMechanism)?;

        // don't produce a token if the mech wants the server to go first
        let server_first = mech.properties().features.contains(Features::SERVER_FIRST);
        self.mech = Some(mech);
        if server_first {
            return Ok(None);
        }

        // otherwise execute the first step
        self.step_inner(None)
    }

    /// Feed a peer token through the handshake; returns the next token to
    /// send, if any.
    ///
    /// # Errors
    ///
    /// [`SaslError::NotStarted`] before [`start`](Self::start),
    /// [`SaslError::AlreadyEstablished`] once the handshake has completed,
    /// plus any mechanism handshake error — all of which are terminal for
    /// the session.
    pub fn step(&mut self, input: &[u8]) -> Result<Option<Bytes>, SaslError> {
        self.step_inner(Some(input))
    }

    fn step_inner(&mut self, input: Option<&[u8]>) -> Result<Option<Bytes>, SaslError> {
        let Some(mech) = self.mech.as_mut() else {
            return Err(SaslError::NotStarted);
        };

        if mech.is_established() {
            return Err(SaslError::AlreadyEstablished);
        }

        mech.step(input)
    }

    /// Negotiated context parameters.
    ///
    /// # Errors
    ///
    /// [`SaslError::NotStarted`] / [`SaslError::NotEstablished`] outside
    /// the established state.
    pub fn context_params(&self) -> Result<ContextParams, SaslError> {
        let Some(mech) = self.mech.as_ref() else {
            return Err(SaslError::NotStarted);
        };

        if !mech.is_established() {
            return Err(SaslError::NotEstablished);
        }

        Ok(mech.context_params())
    }

    /// Protect an outgoing message with the negotiated security layer.
    ///
    /// When no security layer was negotiated (SSF 0) the input passes
    /// through unchanged.
    ///
    /// # Errors
    ///
    /// [`SaslError::NotStarted`] / [`SaslError::NotEstablished`] outside
    /// the established state, plus any mechanism wrap failure.
    pub fn encode(&mut self, input: &[u8]) -> Result<Bytes, SaslError> {
        let Some(mech) = self.mech.as_mut() else {
            return Err(SaslError::NotStarted);
        };

        if !mech.is_established() {
            return Err(SaslError::NotEstablished);
        }

        if mech.context_params().ssf == 0 {
            return Ok(Bytes::copy_from_slice(input));
        }

        mech.encode(input)
    }

    /// Unprotect an incoming message with the negotiated security layer.
    ///
    /// When no security layer was negotiated (SSF 0) the input passes
    /// through unchanged.
    ///
    /// # Errors
    ///
    /// [`SaslError::NotStarted`] / [`SaslError::NotEstablished`] outside
    /// the established state, plus any mechanism unwrap failure.
    pub fn decode(&mut self, input: &[u8]) -> Result<Bytes, SaslError> {
        let Some(mech) = self.mech.as_mut() else {
            return Err(SaslError::NotStarted);
        };

        if !mech.is_established() {
            return Err(SaslError::NotEstablished);
        }

        if mech.context_params().ssf == 0 {
            return Ok(Bytes::copy_from_slice(input));
        }

        mech.decode(input)
    }
}

impl std::fmt::Debug for SaslClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaslClient")
            .field("service", &self.config.service)
            .field("candidates", &self.mechanisms)
            .field("selected", &self.selected_mechanism())
            .field("established", &self.is_established())
            .finish_non_exhaustive()
    }
}
