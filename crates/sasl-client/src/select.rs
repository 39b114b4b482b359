//! Mechanism selection.
//!
//! Selection is first-fit over the candidate list: the list order is the
//! only ranking signal, and the first mechanism whose descriptor passes
//! every filter wins. There is no scoring.

use sasl_core::ssf;
use sasl_core::{ChannelBinding, Features, MechanismCatalog, MechanismConfig, SaslError};

/// How channel binding participates in this negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChannelBindingDisposition {
    /// Not requested, or not applicable.
    None,
    /// Requested; mechanisms that support it are preferred but not
    /// required.
    Want,
    /// Required: only mechanisms supporting channel binding qualify.
    Must,
}

fn any_supports_channel_binding(catalog: &MechanismCatalog, candidates: &[String]) -> bool {
    candidates
        .iter()
        .any(|name| catalog.props(name).features.contains(Features::CHANNEL_BINDINGS))
}

/// Decide the channel-binding disposition for a negotiation.
///
/// Ported Cyrus SASL policy: with a non-empty candidate list the binding
/// is a preference, unless no candidate supports it and the request is
/// critical, which fails the negotiation outright. An empty candidate
/// list means a single mechanism was pre-selected rather than negotiated,
/// so a critical request becomes a hard requirement on it.
pub(crate) fn disposition(
    catalog: &MechanismCatalog,
    candidates: &[String],
    binding: Option<&ChannelBinding>,
) -> Result<ChannelBindingDisposition, SaslError> {
    let Some(binding) = binding else {
        tracing::debug!("no channel binding requested");
        return Ok(ChannelBindingDisposition::None);
    };

    if !candidates.is_empty() {
        if binding.critical && !any_supports_channel_binding(catalog, candidates) {
            tracing::debug!("no negotiating mechs support channel binding, which is critical");
            return Err(SaslError::NoMechanism);
        }
        return Ok(ChannelBindingDisposition::Want);
    }

    if binding.critical {
        Ok(ChannelBindingDisposition::Must)
    } else {
        Ok(ChannelBindingDisposition::None)
    }
}

/// Pick the first candidate whose descriptor satisfies every constraint.
pub(crate) fn first_fit(
    catalog: &MechanismCatalog,
    candidates: &[String],
    config: &MechanismConfig,
    disposition: ChannelBindingDisposition,
) -> Result<String, SaslError> {
    // how much 'extra SSF' is needed once the external layer is counted?
    let needed = ssf::residual(config.min_ssf, config.external_ssf);

    let want = ssf::effective_requirements(
        config.security_properties,
        config.min_ssf,
        config.external_ssf,
    );
    if want != config.security_properties {
        tracing::debug!(
            external_ssf = config.external_ssf,
            "plaintext requirement waived by external layer"
        );
    }

    for name in candidates {
        let props = catalog.props(name);

        if props.max_ssf < needed {
            tracing::debug!(
                mech = %name,
                max_ssf = props.max_ssf,
                needed,
                "mech max SSF too low"
            );
            continue;
        }

        if !props.security_properties.contains(want) {
            tracing::debug!(mech = %name, "mech does not meet security requirements");
            continue;
        }

        // does our configuration meet the mech's feature requirements?

        if disposition == ChannelBindingDisposition::Must
            && !props.features.contains(Features::CHANNEL_BINDINGS)
        {
            tracing::debug!(mech = %name, "mech does not support channel bindings");
            continue;
        }

        if props.features.contains(Features::NEEDS_SERVER_FQDN) && config.server_fqdn.is_none() {
            tracing::debug!(mech = %name, "mech requires server FQDN");
            continue;
        }

        if config.http_mode && !props.features.contains(Features::SUPPORTS_HTTP) {
            tracing::debug!(mech = %name, "mech does not support HTTP");
            continue;
        }

        // this looks like a good fit..
        return Ok(name.clone());
    }

    Err(SaslError::NoMechanism)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use sasl_core::{CatalogBuilder, MechanismProps};

    fn catalog(entries: &[(&str, MechanismProps)]) -> MechanismCatalog {
        let mut builder = CatalogBuilder::new();
        for (name, props) in entries {
            builder
                .register(
                    name,
                    Box::new(|_| unreachable!("selection tests never instantiate")),
                    *props,
                )
                .unwrap();
        }
        builder.build()
    }

    fn cb_props() -> MechanismProps {
        MechanismProps {
            features: Features::CHANNEL_BINDINGS,
            ..MechanismProps::default()
        }
    }

    fn binding(critical: bool) -> ChannelBinding {
        ChannelBinding {
            data: Bytes::from_static(b"cb"),
            critical,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_disposition_without_request() {
        let catalog = catalog(&[("PLAINISH", MechanismProps::default())]);
        let disp = disposition(&catalog, &names(&["PLAINISH"]), None).unwrap();
        assert_eq!(disp, ChannelBindingDisposition::None);
    }

    #[test]
    fn test_disposition_wants_when_negotiating() {
        let catalog = catalog(&[("BINDING", cb_props())]);
        let candidates = names(&["BINDING"]);

        let disp = disposition(&catalog, &candidates, Some(&binding(false))).unwrap();
        assert_eq!(disp, ChannelBindingDisposition::Want);

        let disp = disposition(&catalog, &candidates, Some(&binding(true))).unwrap();
        assert_eq!(disp, ChannelBindingDisposition::Want);
    }

    #[test]
    fn test_disposition_critical_unsupported_fails() {
        let catalog = catalog(&[("PLAINISH", MechanismProps::default())]);
        let candidates = names(&["PLAINISH"]);

        // non-critical request degrades to a preference
        let disp = disposition(&catalog, &candidates, Some(&binding(false))).unwrap();
        assert_eq!(disp, ChannelBindingDisposition::Want);

        let err = disposition(&catalog, &candidates, Some(&binding(true))).unwrap_err();
        assert_eq!(err, SaslError::NoMechanism);
    }

    #[test]
    fn test_disposition_preselected_mechanism() {
        let catalog = catalog(&[]);

        let disp = disposition(&catalog, &[], Some(&binding(true))).unwrap();
        assert_eq!(disp, ChannelBindingDisposition::Must);

        let disp = disposition(&catalog, &[], Some(&binding(false))).unwrap();
        assert_eq!(disp, ChannelBindingDisposition::None);
    }

    #[test]
    fn test_must_filters_unsupporting_mechs() {
        let catalog = catalog(&[("NOBIND", MechanismProps::default()), ("BIND", cb_props())]);
        let config = MechanismConfig {
            security_properties: sasl_core::SecurityProperties::empty(),
            ..MechanismConfig::default()
        };

        let chosen = first_fit(
            &catalog,
            &names(&["NOBIND", "BIND"]),
            &config,
            ChannelBindingDisposition::Must,
        )
        .unwrap();
        assert_eq!(chosen, "BIND");
    }

    #[test]
    fn test_http_mode_requires_http_feature() {
        let http_props = MechanismProps {
            features: Features::SUPPORTS_HTTP,
            ..MechanismProps::default()
        };
        let catalog = catalog(&[("NOHTTP", MechanismProps::default()), ("HTTPOK", http_props)]);
        let config = MechanismConfig {
            security_properties: sasl_core::SecurityProperties::empty(),
            http_mode: true,
            ..MechanismConfig::default()
        };

        let chosen = first_fit(
            &catalog,
            &names(&["NOHTTP", "HTTPOK"]),
            &config,
            ChannelBindingDisposition::None,
        )
        .unwrap();
        assert_eq!(chosen, "HTTPOK");
    }

    #[test]
    fn test_fqdn_requirement() {
        let fqdn_props = MechanismProps {
            features: Features::NEEDS_SERVER_FQDN,
            ..MechanismProps::default()
        };
        let catalog = catalog(&[("NEEDSFQDN", fqdn_props)]);
        let config = MechanismConfig {
            security_properties: sasl_core::SecurityProperties::empty(),
            ..MechanismConfig::default()
        };

        let err = first_fit(
            &catalog,
            &names(&["NEEDSFQDN"]),
            &config,
            ChannelBindingDisposition::None,
        )
        .unwrap_err();
        assert_eq!(err, SaslError::NoMechanism);

        let config = MechanismConfig {
            server_fqdn: Some("host.example.com".into()),
            ..config
        };
        first_fit(
            &catalog,
            &names(&["NEEDSFQDN"]),
            &config,
            ChannelBindingDisposition::None,
        )
        .unwrap();
    }
}
