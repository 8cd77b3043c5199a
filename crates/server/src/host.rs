//! Host header classification.
//!
//! Every request is routed by its `Host`: the bare origin serves the
//! landing page, a single DNS label directly beneath it names a
//! deployment, anything else is unknown.

use hoist_core::DomainSlug;

/// What a request's host names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tenant {
    /// The bare origin.
    Root,
    /// A deployment subdomain.
    Deployment(DomainSlug),
    /// A host that is neither.
    Unknown,
}

/// Classify a `Host` value against the normalized origin host.
pub fn classify(host: &str, origin: &str) -> Tenant {
    let host = strip_port(host.trim())
        .trim_end_matches('.')
        .to_ascii_lowercase();

    if host == origin {
        return Tenant::Root;
    }

    let label = host
        .strip_suffix(origin)
        .and_then(|rest| rest.strip_suffix('.'));
    match label {
        Some(label) => DomainSlug::parse(label)
            .map(Tenant::Deployment)
            .unwrap_or(Tenant::Unknown),
        None => Tenant::Unknown,
    }
}

fn strip_port(host: &str) -> &str {
    // Bracketed IPv6 literal: keep the brackets, drop the port.
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}
