// # Config Validation
//
// Checks a [`Config`] in three passes, always in this order:
//
// 1. Federations: name is a DNS-1123 label, domain a DNS-1123 subdomain
// 2. Stub domains: domain is a DNS-1123 subdomain, nameservers are `ip[:port]`
//    (or a bare DNS-1123 name)
// 3. Upstream nameservers: at most three, each `ip` or `ip:port`
//
// The first failing entry rejects the whole config.

pub mod dns1123;
pub mod federation;
pub mod nameserver;

pub use dns1123::{is_dns1123_label, is_dns1123_subdomain};
pub use federation::{parse_federations_flag, validate_federation_domain, validate_federation_name};
pub use nameserver::validate_nameserver_ip_and_port;

use crate::config::Config;
use thiserror::Error;

/// Maximum number of upstream nameservers
pub const MAX_UPSTREAM_NAMESERVERS: usize = 3;

/// Validation pass that rejected a config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationPass {
    /// Federation names and domains
    Federations,
    /// Stub domain names and their nameservers
    StubDomains,
    /// Upstream nameserver count and addresses
    UpstreamNameservers,
}

/// Reason a config was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Federation name is not a DNS-1123 label
    #[error("{name:?} not a valid federation name: {reason}")]
    FederationName {
        /// Offending name
        name: String,
        /// Which DNS-1123 rule failed
        reason: String,
    },

    /// Federation domain is not a DNS-1123 subdomain
    #[error("{domain:?} not a valid domain name: {reason}")]
    FederationDomain {
        /// Offending domain
        domain: String,
        /// Which DNS-1123 rule failed
        reason: String,
    },

    /// Malformed `name=domain,...` federation value
    #[error("invalid federations flag {value:?}: {reason}")]
    FederationsFlag {
        /// The whole flag value
        value: String,
        /// What is wrong with it
        reason: String,
    },

    /// Stub domain is not a DNS-1123 subdomain
    #[error("invalid domain name: {0:?}")]
    StubDomain(String),

    /// Stub nameserver is neither `ip[:port]` nor a DNS-1123 name
    #[error("invalid nameserver: {0:?}")]
    StubNameserver(String),

    /// More than [`MAX_UPSTREAM_NAMESERVERS`] upstreams; holds the count given
    #[error("upstreamNameserver cannot have more than three entries")]
    TooManyUpstreams(usize),

    /// Upstream entry cannot be split into host and port
    #[error("address {address}: {reason}")]
    UpstreamAddress {
        /// Offending entry
        address: String,
        /// Why the split failed
        reason: String,
    },

    /// Upstream host is not an IP address
    #[error("bad IP address: {0:?}")]
    UpstreamIp(String),

    /// Upstream port is outside 1..=65535
    #[error("bad port number: {0:?}")]
    UpstreamPort(String),
}

impl ValidationError {
    /// The pass that produced this error
    pub fn pass(&self) -> ValidationPass {
        match self {
            Self::FederationName { .. }
            | Self::FederationDomain { .. }
            | Self::FederationsFlag { .. } => ValidationPass::Federations,
            Self::StubDomain(_) | Self::StubNameserver(_) => ValidationPass::StubDomains,
            Self::TooManyUpstreams(_)
            | Self::UpstreamAddress { .. }
            | Self::UpstreamIp(_)
            | Self::UpstreamPort(_) => ValidationPass::UpstreamNameservers,
        }
    }
}

/// Validate a config, stopping at the first failure
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_federations(config)?;
    validate_stub_domains(config)?;
    validate_upstream_nameservers(config)?;
    Ok(())
}

fn validate_federations(config: &Config) -> Result<(), ValidationError> {
    for (name, domain) in &config.federations {
        validate_federation_name(name)?;
        validate_federation_domain(domain)?;
    }
    Ok(())
}

fn validate_stub_domains(config: &Config) -> Result<(), ValidationError> {
    for (domain, nameservers) in &config.stub_domains {
        if !is_dns1123_subdomain(domain) {
            return Err(ValidationError::StubDomain(domain.clone()));
        }

        for ns in nameservers {
            validate_stub_nameserver(ns)?;
        }
    }
    Ok(())
}

/// Stub nameservers split on the first `:` only, so unbracketed IPv6
/// literals are not accepted here.
fn validate_stub_nameserver(ns: &str) -> Result<(), ValidationError> {
    let (host, port) = match ns.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (ns, None),
    };

    if let Some(port) = port
        && nameserver::parse_uint16(port).is_none()
    {
        return Err(ValidationError::StubNameserver(ns.to_string()));
    }

    // A bare hostname-like string passes on its own
    if host.parse::<std::net::IpAddr>().is_err() && !is_dns1123_subdomain(ns) {
        return Err(ValidationError::StubNameserver(ns.to_string()));
    }

    Ok(())
}

fn validate_upstream_nameservers(config: &Config) -> Result<(), ValidationError> {
    if config.upstream_nameservers.len() > MAX_UPSTREAM_NAMESERVERS {
        return Err(ValidationError::TooManyUpstreams(
            config.upstream_nameservers.len(),
        ));
    }

    for ns in &config.upstream_nameservers {
        validate_nameserver_ip_and_port(ns)?;
    }
    Ok(())
}
