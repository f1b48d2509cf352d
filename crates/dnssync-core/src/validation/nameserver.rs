//! Nameserver address parsing
//!
//! Upstream nameservers are `ip`, `ip:port` or `[ipv6]:port`. A bare IP gets
//! the default port 53.

use std::net::IpAddr;

use super::ValidationError;

/// Port used when a nameserver does not specify one
pub const DEFAULT_DNS_PORT: &str = "53";

/// Split and validate an upstream nameserver into `(ip, port)`
///
/// A bare IP is normalized to its canonical form with port `53`. Otherwise
/// the address must be a strict `host:port` pair where the host is an IP and
/// the port is within 1-65535.
pub fn validate_nameserver_ip_and_port(nameserver: &str) -> Result<(String, String), ValidationError> {
    if let Ok(ip) = nameserver.parse::<IpAddr>() {
        return Ok((ip.to_string(), DEFAULT_DNS_PORT.to_string()));
    }

    let (host, port) = split_host_port(nameserver).map_err(|reason| ValidationError::UpstreamAddress {
        address: nameserver.to_string(),
        reason: reason.to_string(),
    })?;

    if host.parse::<IpAddr>().is_err() {
        return Err(ValidationError::UpstreamIp(host.to_string()));
    }

    match port.parse::<i64>() {
        Ok(p) if (1..=65535).contains(&p) => Ok((host.to_string(), port.to_string())),
        _ => Err(ValidationError::UpstreamPort(port.to_string())),
    }
}

/// Split `host:port` or `[host]:port`
///
/// The host may only contain a colon when it is bracketed.
pub(crate) fn split_host_port(address: &str) -> Result<(&str, &str), &'static str> {
    if let Some(rest) = address.strip_prefix('[') {
        let (host, after) = rest.split_once(']').ok_or("missing ']' in address")?;
        let port = after.strip_prefix(':').ok_or("missing port in address")?;
        if host.contains('[') || host.contains(']') || port.contains('[') || port.contains(']') {
            return Err("unexpected bracket in address");
        }
        return Ok((host, port));
    }

    let (host, port) = address.rsplit_once(':').ok_or("missing port in address")?;
    if host.contains(':') {
        return Err("too many colons in address");
    }
    if host.contains('[') || host.contains(']') || port.contains('[') || port.contains(']') {
        return Err("unexpected bracket in address");
    }
    Ok((host, port))
}

/// Parse a decimal unsigned 16-bit port (digits only, 0-65535)
pub(crate) fn parse_uint16(value: &str) -> Option<u16> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
