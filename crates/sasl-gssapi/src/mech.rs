//! The GSSAPI mechanism handshake.
//!
//! Client-side GSSAPI SASL mechanism per RFC 4752. The handshake has two
//! phases: establishing the external security context (one or more token
//! exchanges, delegated to the [`SecurityContext`]), then a single wrapped
//! exchange negotiating the SASL security layer (quality of protection and
//! buffer sizes). In HTTP mode (Negotiate authentication) the second phase
//! does not apply and the mechanism is established as soon as the context
//! is.

use bytes::Bytes;

use sasl_core::ssf;
use sasl_core::{
    ContextParams, Features, Mechanism, MechanismConfig, MechanismProps, SaslError,
    SecurityProperties, Ssf,
};

use crate::context::{ContextFlags, SecurityContext};
use crate::token::{Qop, SecurityLayerToken, MAX_SIZE_FIELD};

/// Registered mechanism name.
///
/// See: <https://www.iana.org/assignments/sasl-mechanisms/sasl-mechanisms.xhtml>
pub const MECH_NAME: &str = "GSSAPI";

/// Capability descriptor the mechanism registers with.
pub const PROPS: MechanismProps = MechanismProps {
    max_ssf: 256,
    security_properties: SecurityProperties::NO_PLAINTEXT
        .union(SecurityProperties::NO_ACTIVE)
        .union(SecurityProperties::NO_ANONYMOUS)
        .union(SecurityProperties::MUTUAL_AUTH)
        .union(SecurityProperties::PASS_CREDENTIALS),
    features: Features::NEEDS_SERVER_FQDN
        .union(Features::WANTS_CLIENT_FIRST)
        .union(Features::CHANNEL_BINDINGS),
};

/// Handshake state. Transitions are monotonic; no state is ever
/// re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Authenticating,
    SsfNegotiation,
    Established,
}

/// Client-side GSSAPI mechanism instance.
pub struct GssapiMechanism {
    config: MechanismConfig,
    ctx: Box<dyn SecurityContext + Send>,
    supported_qop: Qop,
    ssf: Ssf,
    state: State,
    max_output_size: u32,
}

impl GssapiMechanism {
    /// Create a mechanism instance over a caller-supplied security
    /// context.
    ///
    /// This is the construction path for custom GSSAPI engines; catalog
    /// registration through [`crate::register_with`] uses it internally.
    #[must_use]
    pub fn with_context(config: MechanismConfig, ctx: Box<dyn SecurityContext + Send>) -> Self {
        tracing::debug!("new GSSAPI mechanism");
        Self {
            config,
            ctx,
            supported_qop: Qop::empty(),
            ssf: 0,
            state: State::Authenticating,
            max_output_size: 0,
        }
    }

    fn step_authenticating(&mut self, input: Option<&[u8]>) -> Result<Option<Bytes>, SaslError> {
        tracing::debug!("gssapi: step (authenticating)");

        // only the first time..
        let token_in: &[u8] = match input {
            None => {
                let Some(fqdn) = self.config.server_fqdn.as_deref().filter(|f| !f.is_empty())
                else {
                    return Err(SaslError::MissingServerFqdn);
                };
                let principal = format!("{}/{}", self.config.service, fqdn);

                let mut flags = ContextFlags::MUTUAL | ContextFlags::SEQUENCE;
                if self.config.max_ssf > self.config.external_ssf {
                    flags |= ContextFlags::INTEGRITY;

                    if ssf::residual(self.config.max_ssf, self.config.external_ssf) > 1 {
                        flags |= ContextFlags::CONFIDENTIALITY;
                    }
                }

                tracing::debug!(principal = %principal, ?flags, "gssapi: requesting flags");

                let binding = self.config.channel_binding.as_ref().map(|cb| cb.data.clone());
                self.ctx.initiate(&principal, flags, binding.as_deref())?;

                &[]
            }
            Some(token) => token,
        };

        let out = self.ctx.step(token_in)?;

        if self.ctx.is_established() {
            let negotiated = self.ctx.negotiated_flags();
            self.supported_qop = if !negotiated.contains(ContextFlags::INTEGRITY) {
                Qop::NONE
            } else if !negotiated.contains(ContextFlags::CONFIDENTIALITY) {
                Qop::NONE | Qop::INTEGRITY
            } else {
                Qop::NONE | Qop::INTEGRITY | Qop::CONFIDENTIALITY
            };

            if self.config.http_mode {
                tracing::debug!("gssapi: context established (HTTP mode)");
                self.state = State::Established;
                return Ok(out);
            }

            tracing::debug!("gssapi: context established, negotiating SSF");
            self.state = State::SsfNegotiation;
            return Ok(Some(out.unwrap_or_default()));
        }

        Ok(out)
    }

    fn step_ssf_negotiation(&mut self, input: &[u8]) -> Result<Option<Bytes>, SaslError> {
        // input is a wrapped token sent by the server following context
        // establishment
        tracing::debug!("gssapi: step (negotiating SSF)");

        let (data, _) = self.ctx.unwrap(input)?;
        let offer = SecurityLayerToken::decode(&data)?;
        tracing::debug!(offered = ?offer.qop, supported = ?self.supported_qop, "server QOP offer");

        let channel_ssf = self.ctx.ssf();
        tracing::debug!(channel_ssf, "GSSAPI SSF");
        if channel_ssf.saturating_add(self.config.external_ssf) < self.config.min_ssf {
            return Err(SaslError::TooWeak {
                mech_ssf: channel_ssf,
                external_ssf: self.config.external_ssf,
                required_ssf: self.config.min_ssf,
            });
        }

        // how much SSF is the mechanism allowed to provide, and how much
        // does it still have to provide?
        let allowed = ssf::residual(self.config.max_ssf, self.config.external_ssf);
        let needed = ssf::residual(self.config.min_ssf, self.config.external_ssf);
        tracing::debug!(allowed, needed, "residual SSF bounds");

        let choice = if self.supported_qop.contains(Qop::CONFIDENTIALITY)
            && offer.qop.contains(Qop::CONFIDENTIALITY)
            && allowed >= channel_ssf
            && needed <= channel_ssf
        {
            self.ssf = channel_ssf;

            // some directory servers require the integrity bit alongside
            // confidentiality
            if self.ad_compat() {
                Qop::CONFIDENTIALITY | Qop::INTEGRITY
            } else {
                Qop::CONFIDENTIALITY
            }
        } else if self.supported_qop.contains(Qop::INTEGRITY)
            && offer.qop.contains(Qop::INTEGRITY)
            && allowed >= 1
            && needed <= 2
        {
            self.ssf = 1;
            Qop::INTEGRITY
        } else if self.supported_qop.contains(Qop::NONE)
            && offer.qop.contains(Qop::NONE)
            && needed == 0
        {
            self.ssf = 0;
            Qop::NONE
        } else {
            return Err(SaslError::NoSecurityLayer);
        };

        tracing::debug!(?choice, ssf = self.ssf, "selected QOP");

        // max message size the server will accept
        self.max_output_size = offer.max_message_size;
        if self.ssf > 0 {
            // max size of a pre-wrap message we can send to the server
            self.max_output_size = self
                .ctx
                .wrap_size_limit(self.max_output_size, self.ssf > 1)?;
        }
        tracing::debug!(max_output_size = self.max_output_size, "peer message size limit");

        let reply = SecurityLayerToken {
            qop: choice,
            max_message_size: if choice == Qop::NONE {
                0
            } else {
                self.config.max_buf_size.min(MAX_SIZE_FIELD)
            },
        };

        // the reply is integrity protected, never encrypted
        let out = self.ctx.wrap(&reply.encode(), false)?;

        self.state = State::Established;
        Ok(Some(out))
    }

    fn ad_compat(&self) -> bool {
        self.config
            .extra_props
            .get("ad_compat")
            .is_some_and(|v| is_truthy(v))
    }
}

impl Mechanism for GssapiMechanism {
    fn name(&self) -> &'static str {
        MECH_NAME
    }

    fn properties(&self) -> MechanismProps {
        PROPS
    }

    fn is_established(&self) -> bool {
        self.state == State::Established
    }

    fn step(&mut self, input: Option<&[u8]>) -> Result<Option<Bytes>, SaslError> {
        match self.state {
            State::Authenticating => self.step_authenticating(input),
            State::SsfNegotiation => self.step_ssf_negotiation(input.unwrap_or(&[])),
            State::Established => Err(SaslError::AlreadyEstablished),
        }
    }

    fn context_params(&self) -> ContextParams {
        ContextParams {
            ssf: self.ssf,
            max_peer_message_size: self.max_output_size,
        }
    }

    fn encode(&mut self, input: &[u8]) -> Result<Bytes, SaslError> {
        if self.ssf == 0 {
            return Err(SaslError::NoSecurityLayer);
        }

        self.ctx.wrap(input, self.ssf > 1)
    }

    fn decode(&mut self, input: &[u8]) -> Result<Bytes, SaslError> {
        if self.ssf == 0 {
            return Err(SaslError::NoSecurityLayer);
        }

        Ok(self.ctx.unwrap(input)?.0)
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(val, "1" | "y" | "on" | "t")
}
