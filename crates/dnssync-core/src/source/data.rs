// # External Representation
//
// ConfigMap data and config directories share one layout: a map of key to
// string value, where the key is the ConfigMap data key or the file name.
//
// | key                   | value                                         |
// |-----------------------|-----------------------------------------------|
// | `federations`         | JSON object, or `name=domain,...`             |
// | `stubDomains`         | JSON object of domain -> list of nameservers  |
// | `upstreamNameservers` | JSON list of nameservers                      |
// | `*.json`              | whole or partial config object                |
// | any other key         | whole or partial config object, if it is one  |
//
// Fragments are merged in key order: maps extend, a present upstream list
// replaces the previous one. A `*.json` key that does not decode is an
// error. Any other key is a fragment only when its value is a JSON object;
// otherwise it is ignored.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::validation::parse_federations_flag;

/// Key holding the federations
pub const FEDERATIONS_KEY: &str = "federations";

/// Key holding the stub domains
pub const STUB_DOMAINS_KEY: &str = "stubDomains";

/// Key holding the upstream nameservers
pub const UPSTREAM_NAMESERVERS_KEY: &str = "upstreamNameservers";

/// Suffix of keys holding a whole-object fragment
pub const FRAGMENT_SUFFIX: &str = ".json";

/// Partial config; absent fields leave the merged result untouched
#[derive(Debug, Default, Deserialize)]
struct ConfigFragment {
    federations: Option<BTreeMap<String, String>>,
    #[serde(rename = "stubDomains")]
    stub_domains: Option<BTreeMap<String, Vec<String>>>,
    #[serde(rename = "upstreamNameservers")]
    upstream_nameservers: Option<Vec<String>>,
}

/// Decode key/value data into a config without validating it
pub fn parse_config_data(data: &BTreeMap<String, String>) -> Result<Config> {
    let mut config = Config::default();

    for (key, value) in data {
        // Empty files/keys carry nothing
        if value.trim().is_empty() {
            continue;
        }

        match key.as_str() {
            FEDERATIONS_KEY => config.federations.extend(parse_federations(value)?),
            STUB_DOMAINS_KEY => config
                .stub_domains
                .extend(decode::<BTreeMap<String, Vec<String>>>(key, value)?),
            UPSTREAM_NAMESERVERS_KEY => config.upstream_nameservers = decode(key, value)?,
            _ if key.ends_with(FRAGMENT_SUFFIX) => {
                let fragment: ConfigFragment = decode(key, value)?;
                merge_fragment(&mut config, fragment);
            }
            _ if value.trim_start().starts_with('{') => {
                match decode::<ConfigFragment>(key, value) {
                    Ok(fragment) => merge_fragment(&mut config, fragment),
                    Err(e) => warn!("Ignoring config key {}: {}", key, e),
                }
            }
            _ => debug!("Ignoring unknown config key {}", key),
        }
    }

    Ok(config)
}

/// Decode and validate key/value data
pub fn load_config(data: &BTreeMap<String, String>) -> Result<Config> {
    let config = parse_config_data(data)?;
    config.validate()?;
    Ok(config)
}

fn parse_federations(value: &str) -> Result<BTreeMap<String, String>> {
    if value.trim_start().starts_with('{') {
        decode(FEDERATIONS_KEY, value)
    } else {
        Ok(parse_federations_flag(value.trim())?)
    }
}

fn merge_fragment(config: &mut Config, fragment: ConfigFragment) {
    if let Some(federations) = fragment.federations {
        config.federations.extend(federations);
    }
    if let Some(stub_domains) = fragment.stub_domains {
        config.stub_domains.extend(stub_domains);
    }
    if let Some(upstream) = fragment.upstream_nameservers {
        config.upstream_nameservers = upstream;
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: &str) -> Result<T> {
    serde_json::from_str(value).map_err(|e| Error::parse(key, e.to_string()))
}
