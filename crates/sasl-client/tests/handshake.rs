//! End-to-end GSSAPI handshake through the session API, against a
//! scripted security context.

#![cfg(feature = "gssapi")]
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use bytes::Bytes;
use sasl_client::sasl_gssapi::{ContextFlags, SecurityContext};
use sasl_client::{
    CatalogBuilder, ChannelBinding, MechanismCatalog, SaslClientBuilder, SaslError,
};

const WRAP_PLAIN: u8 = 0x15;
const WRAP_SEALED: u8 = 0xC5;

/// Scripted GSSAPI engine: two establishment legs, then wrap/unwrap with
/// a one-byte frame marker.
struct ScriptedContext {
    negotiated: ContextFlags,
    channel_ssf: u32,
    legs: usize,
    steps_taken: usize,
}

impl ScriptedContext {
    fn new(negotiated: ContextFlags, channel_ssf: u32) -> Self {
        Self {
            negotiated,
            channel_ssf,
            legs: 2,
            steps_taken: 0,
        }
    }
}

impl SecurityContext for ScriptedContext {
    fn initiate(
        &mut self,
        principal: &str,
        _flags: ContextFlags,
        _channel_binding: Option<&[u8]>,
    ) -> Result<(), SaslError> {
        assert!(principal.contains('/'), "principal is service/fqdn");
        Ok(())
    }

    fn step(&mut self, _input: &[u8]) -> Result<Option<Bytes>, SaslError> {
        self.steps_taken += 1;
        if self.steps_taken < self.legs {
            Ok(Some(Bytes::from_static(b"ap-req")))
        } else {
            Ok(None)
        }
    }

    fn is_established(&self) -> bool {
        self.steps_taken >= self.legs
    }

    fn negotiated_flags(&self) -> ContextFlags {
        self.negotiated
    }

    fn wrap(&mut self, data: &[u8], confidential: bool) -> Result<Bytes, SaslError> {
        let mut framed = vec![if confidential { WRAP_SEALED } else { WRAP_PLAIN }];
        framed.extend_from_slice(data);
        Ok(Bytes::from(framed))
    }

    fn unwrap(&mut self, token: &[u8]) -> Result<(Bytes, bool), SaslError> {
        match token.first() {
            Some(&WRAP_PLAIN) => Ok((Bytes::copy_from_slice(&token[1..]), false)),
            Some(&WRAP_SEALED) => Ok((Bytes::copy_from_slice(&token[1..]), true)),
            _ => Err(SaslError::Mechanism("bad frame".into())),
        }
    }

    fn ssf(&self) -> u32 {
        self.channel_ssf
    }

    fn wrap_size_limit(
        &mut self,
        output_limit: u32,
        _confidential: bool,
    ) -> Result<u32, SaslError> {
        Ok(output_limit.saturating_sub(32))
    }
}

fn catalog_with_context(
    negotiated: ContextFlags,
    channel_ssf: u32,
) -> Arc<MechanismCatalog> {
    let mut builder = CatalogBuilder::new();
    sasl_client::sasl_gssapi::register_with(&mut builder, move || {
        Box::new(ScriptedContext::new(negotiated, channel_ssf))
    })
    .unwrap();
    Arc::new(builder.build())
}

fn all_flags() -> ContextFlags {
    ContextFlags::MUTUAL
        | ContextFlags::SEQUENCE
        | ContextFlags::INTEGRITY
        | ContextFlags::CONFIDENTIALITY
}

/// Wrapped server offer: QOP mask plus a 24-bit buffer size.
fn offer(qop: u8, size: [u8; 3]) -> Vec<u8> {
    vec![WRAP_PLAIN, qop, size[0], size[1], size[2]]
}

#[test]
fn test_full_handshake_with_confidentiality() {
    let catalog = catalog_with_context(all_flags(), 56);
    let mut client = SaslClientBuilder::new("imap")
        .server_fqdn("mail.example.com")
        .build(catalog)
        .unwrap();

    // leg 1: client goes first with the initial context token
    let token = client.start().unwrap();
    assert_eq!(token.unwrap(), Bytes::from_static(b"ap-req"));
    assert_eq!(client.selected_mechanism(), Some("GSSAPI"));
    assert!(!client.is_established());

    // leg 2: server's reply completes the context; an empty token prompts
    // the server's security-layer offer
    let token = client.step(b"ap-rep").unwrap();
    assert_eq!(token.unwrap(), Bytes::new());
    assert!(!client.is_established());

    // leg 3: wrapped QOP offer in, wrapped choice out
    let token = client.step(&offer(0x07, [0x01, 0x00, 0x00])).unwrap();
    let reply = token.unwrap();
    assert_eq!(reply[0], WRAP_PLAIN, "reply is integrity protected only");
    assert_eq!(reply[1], 0x04, "confidentiality chosen");
    assert!(client.is_established());

    let params = client.context_params().unwrap();
    assert_eq!(params.ssf, 56);
    // offered 65536, minus the scripted 32-byte wrap overhead
    assert_eq!(params.max_peer_message_size, 65536 - 32);

    // application data flows through wrap/unwrap as an identity transform
    let sealed = client.encode(b"a001 SELECT INBOX").unwrap();
    assert_eq!(sealed[0], WRAP_SEALED);
    let plain = client.decode(&sealed).unwrap();
    assert_eq!(plain, Bytes::from_static(b"a001 SELECT INBOX"));

    // the handshake never re-enters negotiation
    assert_eq!(
        client.step(b"again").unwrap_err(),
        SaslError::AlreadyEstablished
    );
}

#[test]
fn test_handshake_without_security_layer() {
    // context came up without integrity, so only QOP "none" is possible
    let catalog = catalog_with_context(ContextFlags::MUTUAL | ContextFlags::SEQUENCE, 0);
    let mut client = SaslClientBuilder::new("imap")
        .server_fqdn("mail.example.com")
        .build(catalog)
        .unwrap();

    client.start().unwrap();
    client.step(b"ap-rep").unwrap();
    let reply = client.step(&offer(0x01, [0x00, 0x00, 0x00])).unwrap().unwrap();
    assert_eq!(&reply[1..], &[0x01, 0x00, 0x00, 0x00]);

    assert!(client.is_established());
    assert_eq!(client.context_params().unwrap().ssf, 0);

    // no layer: the session passes data through unchanged
    let out = client.encode(b"a001 NOOP").unwrap();
    assert_eq!(out, Bytes::from_static(b"a001 NOOP"));
}

#[test]
fn test_gssapi_requires_fqdn_at_selection() {
    let catalog = catalog_with_context(all_flags(), 56);
    let mut client = SaslClientBuilder::new("imap").build(catalog).unwrap();

    // GSSAPI declares NEEDS_SERVER_FQDN, so selection skips it entirely
    assert_eq!(client.start().unwrap_err(), SaslError::NoMechanism);
}

#[test]
fn test_critical_channel_binding_with_supporting_mech() {
    let catalog = catalog_with_context(all_flags(), 56);
    let mut client = SaslClientBuilder::new("imap")
        .server_fqdn("mail.example.com")
        .channel_binding(ChannelBinding {
            data: Bytes::from_static(b"tls-exporter-data"),
            critical: true,
        })
        .build(catalog)
        .unwrap();

    // GSSAPI supports channel bindings, so the critical request is
    // satisfiable and negotiation proceeds
    let token = client.start().unwrap();
    assert!(token.is_some());
    assert_eq!(client.selected_mechanism(), Some("GSSAPI"));
}

#[test]
fn test_too_weak_negotiation_is_terminal() {
    let catalog = catalog_with_context(all_flags(), 2);
    let mut client = SaslClientBuilder::new("imap")
        .server_fqdn("mail.example.com")
        .min_ssf(100)
        .build(catalog)
        .unwrap();

    client.start().unwrap();
    client.step(b"ap-rep").unwrap();
    let err = client.step(&offer(0x07, [0x01, 0x00, 0x00])).unwrap_err();
    assert_eq!(
        err,
        SaslError::TooWeak {
            mech_ssf: 2,
            external_ssf: 0,
            required_ssf: 100
        }
    );
}
