//! Kerberos-backed security context.
//!
//! Wraps `libgssapi` (MIT/Heimdal GSSAPI) as a [`SecurityContext`]
//! implementation. Credentials come from the process ticket cache; run
//! `kinit user@REALM` before connecting.

use bytes::Bytes;

use libgssapi::context::{ClientCtx, CtxFlags, SecurityContext as _};
use libgssapi::credential::{Cred, CredUsage};
use libgssapi::name::Name;
use libgssapi::oid::{GSS_MECH_KRB5, GSS_NT_KRB5_PRINCIPAL, OidSet};

use sasl_core::{SaslError, Ssf};

use crate::context::{ContextFlags, SecurityContext};

/// GSSAPI client context backed by the system Kerberos libraries.
///
/// Created empty; all engine interaction is deferred to
/// [`SecurityContext::initiate`], so construction never fails.
#[derive(Default)]
pub struct Krb5Context {
    ctx: Option<ClientCtx>,
    binding: Option<Vec<u8>>,
    complete: bool,
    negotiated: ContextFlags,
}

impl Krb5Context {
    /// Create an uninitiated context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn to_ctx_flags(flags: ContextFlags) -> CtxFlags {
        let mut out = CtxFlags::empty();
        if flags.contains(ContextFlags::MUTUAL) {
            out |= CtxFlags::GSS_C_MUTUAL_FLAG;
        }
        if flags.contains(ContextFlags::SEQUENCE) {
            out |= CtxFlags::GSS_C_SEQUENCE_FLAG;
        }
        if flags.contains(ContextFlags::REPLAY) {
            out |= CtxFlags::GSS_C_REPLAY_FLAG;
        }
        if flags.contains(ContextFlags::INTEGRITY) {
            out |= CtxFlags::GSS_C_INTEG_FLAG;
        }
        if flags.contains(ContextFlags::CONFIDENTIALITY) {
            out |= CtxFlags::GSS_C_CONF_FLAG;
        }
        out
    }

    fn from_ctx_flags(flags: CtxFlags) -> ContextFlags {
        let mut out = ContextFlags::empty();
        if flags.contains(CtxFlags::GSS_C_MUTUAL_FLAG) {
            out |= ContextFlags::MUTUAL;
        }
        if flags.contains(CtxFlags::GSS_C_SEQUENCE_FLAG) {
            out |= ContextFlags::SEQUENCE;
        }
        if flags.contains(CtxFlags::GSS_C_REPLAY_FLAG) {
            out |= ContextFlags::REPLAY;
        }
        if flags.contains(CtxFlags::GSS_C_INTEG_FLAG) {
            out |= ContextFlags::INTEGRITY;
        }
        if flags.contains(CtxFlags::GSS_C_CONF_FLAG) {
            out |= ContextFlags::CONFIDENTIALITY;
        }
        out
    }
}

impl SecurityContext for Krb5Context {
    fn initiate(
        &mut self,
        principal: &str,
        flags: ContextFlags,
        channel_binding: Option<&[u8]>,
    ) -> Result<(), SaslError> {
        let name = Name::new(principal.as_bytes(), Some(&GSS_NT_KRB5_PRINCIPAL))
            .map_err(|e| SaslError::Mechanism(format!("failed to create target name: {e}")))?;

        let mut mechs = OidSet::new()
            .map_err(|e| SaslError::Mechanism(format!("failed to create OID set: {e}")))?;
        mechs
            .add(&GSS_MECH_KRB5)
            .map_err(|e| SaslError::Mechanism(format!("failed to add krb5 mechanism: {e}")))?;

        // acquire default credentials from the ticket cache
        let cred = Cred::acquire(None, None, CredUsage::Initiate, Some(&mechs))
            .map_err(|e| SaslError::Mechanism(format!("failed to acquire credentials: {e}")))?;

        self.binding = channel_binding.map(<[u8]>::to_vec);
        self.ctx = Some(ClientCtx::new(
            Some(cred),
            name,
            Self::to_ctx_flags(flags),
            Some(&GSS_MECH_KRB5),
        ));
        self.complete = false;
        self.negotiated = ContextFlags::empty();
        Ok(())
    }

    fn step(&mut self, input: &[u8]) -> Result<Option<Bytes>, SaslError> {
        let binding = self.binding.clone();
        let Some(ctx) = self.ctx.as_mut() else {
            return Err(SaslError::Mechanism("context not initiated".into()));
        };

        let token = if input.is_empty() { None } else { Some(input) };
        let result = ctx.step(token, binding.as_deref());
        let flags = ctx.flags().ok();

        if let Some(flags) = flags {
            self.negotiated = Self::from_ctx_flags(flags);
        }

        match result {
            Ok(Some(out)) => Ok(Some(Bytes::copy_from_slice(&out))),
            Ok(None) => {
                self.complete = true;
                Ok(None)
            }
            Err(e) => Err(SaslError::Mechanism(format!("GSSAPI step failed: {e}"))),
        }
    }

    fn is_established(&self) -> bool {
        self.complete
    }

    fn negotiated_flags(&self) -> ContextFlags {
        self.negotiated
    }

    fn wrap(&mut self, data: &[u8], confidential: bool) -> Result<Bytes, SaslError> {
        let Some(ctx) = self.ctx.as_mut() else {
            return Err(SaslError::Mechanism("context not initiated".into()));
        };
        let out = ctx
            .wrap(confidential, data)
            .map_err(|e| SaslError::Mechanism(format!("GSSAPI wrap failed: {e}")))?;
        Ok(Bytes::copy_from_slice(&out))
    }

    fn unwrap(&mut self, token: &[u8]) -> Result<(Bytes, bool), SaslError> {
        let confidential = self.negotiated.contains(ContextFlags::CONFIDENTIALITY);
        let Some(ctx) = self.ctx.as_mut() else {
            return Err(SaslError::Mechanism("context not initiated".into()));
        };
        let out = ctx
            .unwrap(token)
            .map_err(|e| SaslError::Mechanism(format!("GSSAPI unwrap failed: {e}")))?;
        Ok((Bytes::copy_from_slice(&out), confidential))
    }

    fn ssf(&self) -> Ssf {
        // TODO: map the negotiated krb5 enctype to its real key strength
        // once libgssapi exposes it; until then report the conservative
        // DES-era floor for confidential contexts.
        if self.negotiated.contains(ContextFlags::CONFIDENTIALITY) {
            56
        } else if self.negotiated.contains(ContextFlags::INTEGRITY) {
            1
        } else {
            0
        }
    }

    fn wrap_size_limit(
        &mut self,
        output_limit: u32,
        confidential: bool,
    ) -> Result<u32, SaslError> {
        let Some(ctx) = self.ctx.as_mut() else {
            return Err(SaslError::Mechanism("context not initiated".into()));
        };
        ctx.wrap_size_limit(confidential, output_limit)
            .map_err(|e| SaslError::Mechanism(format!("GSSAPI wrap_size_limit failed: {e}")))
    }
}
