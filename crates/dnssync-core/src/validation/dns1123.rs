//! DNS-1123 name syntax checks
//!
//! A label is 1-63 lowercase alphanumerics or `-`, starting and ending with
//! an alphanumeric. A subdomain is one or more labels joined by `.`, at most
//! 253 characters in total.

/// Maximum length of a DNS-1123 label
pub const DNS1123_LABEL_MAX_LENGTH: usize = 63;

/// Maximum length of a DNS-1123 subdomain
pub const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;

/// Check whether `value` is a DNS-1123 label (e.g. `my-name`)
pub fn is_dns1123_label(value: &str) -> bool {
    if value.is_empty() || value.len() > DNS1123_LABEL_MAX_LENGTH {
        return false;
    }

    let bytes = value.as_bytes();
    let alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    alnum(bytes[0])
        && alnum(bytes[bytes.len() - 1])
        && bytes.iter().all(|&b| alnum(b) || b == b'-')
}

/// Check whether `value` is a DNS-1123 subdomain (e.g. `acme.local`)
pub fn is_dns1123_subdomain(value: &str) -> bool {
    if value.is_empty() || value.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        return false;
    }

    value.split('.').all(is_dns1123_label)
}

/// Human-readable reason a value is not a DNS-1123 label
pub(crate) fn label_error(value: &str) -> String {
    if value.len() > DNS1123_LABEL_MAX_LENGTH {
        format!("must be no more than {} characters", DNS1123_LABEL_MAX_LENGTH)
    } else {
        "a DNS-1123 label must consist of lower case alphanumeric characters or '-', \
         and must start and end with an alphanumeric character"
            .to_string()
    }
}

/// Human-readable reason a value is not a DNS-1123 subdomain
pub(crate) fn subdomain_error(value: &str) -> String {
    if value.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        format!("must be no more than {} characters", DNS1123_SUBDOMAIN_MAX_LENGTH)
    } else {
        "a DNS-1123 subdomain must consist of lower case alphanumeric characters, '-' or '.', \
         and must start and end with an alphanumeric character"
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let longest = "a".repeat(63);
        let too_long = "a".repeat(64);

        for ok in ["a", "abc", "a-b", "a1", "1a", "0", longest.as_str()] {
            assert!(is_dns1123_label(ok), "{ok}");
        }
        for bad in ["", "-a", "a-", "A", "a.b", "a_b", too_long.as_str()] {
            assert!(!is_dns1123_label(bad), "{bad}");
        }
    }

    #[test]
    fn test_subdomains() {
        for ok in ["acme.local", "a.b.c", "my-svc.ns.svc", "10.0.0.1"] {
            assert!(is_dns1123_subdomain(ok), "{ok}");
        }
        for bad in ["", ".a", "a.", "a..b", "UPPER.local", "a:53", "a.-b"] {
            assert!(!is_dns1123_subdomain(bad), "{bad}");
        }

        let long = vec!["a".repeat(63); 4].join(".");
        assert_eq!(long.len(), 255);
        assert!(!is_dns1123_subdomain(&long));
    }
}
