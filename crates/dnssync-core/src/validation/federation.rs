//! Federation name and domain rules
//!
//! Federations are given either as a map or in the flag format
//! `name1=domain1,name2=domain2`.

use std::collections::BTreeMap;

use super::ValidationError;
use super::dns1123::{is_dns1123_label, is_dns1123_subdomain, label_error, subdomain_error};

/// A federation name must be a DNS-1123 label
pub fn validate_federation_name(name: &str) -> Result<(), ValidationError> {
    if is_dns1123_label(name) {
        Ok(())
    } else {
        Err(ValidationError::FederationName {
            name: name.to_string(),
            reason: label_error(name),
        })
    }
}

/// A federation domain must be a DNS-1123 subdomain
pub fn validate_federation_domain(domain: &str) -> Result<(), ValidationError> {
    if is_dns1123_subdomain(domain) {
        Ok(())
    } else {
        Err(ValidationError::FederationDomain {
            domain: domain.to_string(),
            reason: subdomain_error(domain),
        })
    }
}

/// Parse the `name=domain,...` federation flag format
///
/// Every pair is validated. Empty pairs and duplicate names are rejected.
/// A blank value yields an empty map.
pub fn parse_federations_flag(value: &str) -> Result<BTreeMap<String, String>, ValidationError> {
    let mut federations = BTreeMap::new();
    if value.trim().is_empty() {
        return Ok(federations);
    }

    for pair in value.split(',').map(str::trim) {
        if pair.is_empty() {
            return Err(ValidationError::FederationsFlag {
                value: value.to_string(),
                reason: "empty federation entry".to_string(),
            });
        }
        let (name, domain) = pair.split_once('=').ok_or_else(|| ValidationError::FederationsFlag {
            value: value.to_string(),
            reason: format!("{pair:?} is not of the form name=domain"),
        })?;
        let (name, domain) = (name.trim(), domain.trim());

        validate_federation_name(name)?;
        validate_federation_domain(domain)?;

        if federations.insert(name.to_string(), domain.to_string()).is_some() {
            return Err(ValidationError::FederationsFlag {
                value: value.to_string(),
                reason: format!("duplicate federation name {name:?}"),
            });
        }
    }

    Ok(federations)
}
