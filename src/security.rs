//! Checks applied to a web target before anything touches the network.
//!
//! Validation is purely syntactic: host names are never resolved, so only
//! literal loopback/private addresses and `localhost` are recognised.

use std::net::{Ipv4Addr, Ipv6Addr};

use url::{Host, Url};

use crate::config::SecurityPolicy;
use crate::error::LinkError;

/// Parse `raw` and enforce the scheme allow-list and, when enabled, the
/// local-network block.
pub fn validate_web_target(raw: &str, policy: &SecurityPolicy) -> Result<Url, LinkError> {
    let url = Url::parse(raw.trim()).map_err(|err| LinkError::InvalidUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;

    if !policy
        .allowed_schemes
        .iter()
        .any(|scheme| scheme.eq_ignore_ascii_case(url.scheme()))
    {
        return Err(LinkError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("scheme `{}` is not allowed", url.scheme()),
        });
    }

    let Some(host) = url.host() else {
        return Err(LinkError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    };

    if policy.block_local_networks && is_local_host(&host) {
        return Err(LinkError::BlockedHost {
            host: host.to_string(),
        });
    }

    Ok(url)
}

/// Loopback, `localhost` and the RFC 1918 private ranges.
pub fn is_local_host<S: AsRef<str>>(host: &Host<S>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.as_ref().trim_end_matches('.').to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Host::Ipv4(addr) => is_local_ipv4(addr),
        Host::Ipv6(addr) => is_local_ipv6(addr),
    }
}

fn is_local_ipv4(addr: &Ipv4Addr) -> bool {
    // 127.0.0.0/8, 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16
    addr.is_loopback() || addr.is_private()
}

fn is_local_ipv6(addr: &Ipv6Addr) -> bool {
    addr.is_loopback() || addr.to_ipv4_mapped().is_some_and(|v4| is_local_ipv4(&v4))
}
