//! Email addresses and URLs.
//!
//! Format checks are delegated to the `validator` crate. This module only
//! decides how its verdict combines with normalization: emails pass through
//! untouched, URLs get their protocol checked and, when missing, added.

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use validator::{ValidateEmail, ValidateUrl};

use super::split_pair;
use crate::consts::DEFAULT_URL_PROTOCOL;
use crate::sanitize::error::ConfigError;
use crate::sanitize::type_spec::Param;
use crate::sanitize::value::Value;

/// `scheme://` at the start of the input
static SCHEME_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+://").expect("Failed to compile scheme regex")
});

/// A bare `host.tld/path` with no scheme
static BARE_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9_]+\.[A-Za-z0-9_]{2,})+(?:/.*|$)")
        .expect("Failed to compile bare host regex")
});

/// The value unchanged when it is a well-formed email address
pub fn email(value: Value, _arg: Option<&Param>) -> Result<Value, ConfigError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    if value.to_string().validate_email() {
        Ok(value)
    } else {
        Ok(Value::Null)
    }
}

/// A well-formed URL using the wanted protocol.
///
/// Bare `host.tld/path` input gets the protocol prefixed. A URL that
/// already names a different protocol is rejected rather than rewritten.
///
/// # Arguments
/// * `value` - The raw URL, or a packed `[url, protocol]` array
/// * `arg` - The protocol from the type spec; when given, a packed protocol
///   is never read
///
/// # Returns
/// * The URL in `protocol://` form, `http` by default
/// * `Null` if the URL is malformed, uses another protocol or is not a scalar
pub fn url(value: Value, arg: Option<&Param>) -> Result<Value, ConfigError> {
    let (value, protocol) = split_pair(value, arg);

    if matches!(value, Value::Null | Value::Undefined) || value.is_object_shaped() {
        return Ok(Value::Null);
    }

    let desired = match protocol {
        None | Some(Value::Undefined) | Some(Value::Null) => DEFAULT_URL_PROTOCOL.to_string(),
        Some(p) => p.to_string().to_ascii_lowercase(),
    };

    Ok(normalize_url(&value.to_string(), &desired)
        .map(Value::String)
        .unwrap_or(Value::Null))
}

/// Validates `url` and puts it in `desired://` form
pub(crate) fn normalize_url(url: &str, desired: &str) -> Option<String> {
    if !is_valid_url(url, desired) {
        trace!("rejecting malformed url {:?}", url);
        return None;
    }

    let prefix = format!("{}://", desired);

    if url
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(&prefix))
    {
        return Some(url.to_string());
    }

    if SCHEME_PREFIX.is_match(url) {
        trace!("rejecting url {:?}, protocol is not {}", url, desired);
        return None;
    }

    if BARE_HOST.is_match(url) {
        return Some(format!("{}{}", prefix, url));
    }

    None
}

/// URL syntax check. Input without a scheme is checked as if it had the
/// desired one. The host must be an IP address or a dotted domain name.
fn is_valid_url(url: &str, desired: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    let candidate = if SCHEME_PREFIX.is_match(url) {
        url.to_string()
    } else {
        format!("{}://{}", desired, url)
    };

    if !candidate.validate_url() {
        return false;
    }

    ::url::Url::parse(&candidate)
        .ok()
        .and_then(|parsed| parsed.host().map(|host| has_qualified_host(&host)))
        .unwrap_or(false)
}

fn has_qualified_host(host: &::url::Host<&str>) -> bool {
    match host {
        ::url::Host::Ipv4(_) | ::url::Host::Ipv6(_) => true,
        ::url::Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.');
            let labels: Vec<&str> = domain.split('.').collect();
            labels.len() > 1
                && labels.iter().all(|label| !label.is_empty())
                && labels.last().is_some_and(|tld| tld.len() >= 2)
        }
    }
}
