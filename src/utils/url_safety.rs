//! Destination URL safety policy.
//!
//! Every URL the service stores or redirects to passes through
//! [`is_acceptable`]. The policy is checked at creation time and again at
//! redirect time, so links written before a rule was tightened stop
//! resolving once the rule rejects them.
//!
//! # Rules
//!
//! 1. **Length**: at most [`MAX_URL_LENGTH`] characters
//! 2. **Scheme**: `http` or `https`, with a host
//! 3. **Scheme confusion**: `javascript:`, `data:`, `vbscript:`, `file:`, `ftp:` are refused outright
//! 4. **Credentials**: no `user@host` / `user:pass@host` authority
//! 5. **Internal hosts**: loopback, unspecified, private, link-local, `*.local`, `*.internal`
//! 6. **Structure**: conservative host/path character classes ([`STRUCTURE_REGEX`])

use regex::Regex;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;
use url::{Host, Url};

/// Longest destination URL accepted, in characters.
pub const MAX_URL_LENGTH: usize = 2000;

const BLOCKED_SCHEMES: &[&str] = &["javascript:", "data:", "vbscript:", "file:", "ftp:"];

const BLOCKED_HOST_SUFFIXES: &[&str] = &[".local", ".internal", ".localhost"];

/// Whole-string structural check applied after the semantic checks.
///
/// The scheme matches in any case, as in [`EXTRACT_REGEX`].
static STRUCTURE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?i:https?)://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_+.~#?&/=]*$",
    )
    .unwrap()
});

/// Finds URL-looking substrings inside free chat text.
static EXTRACT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i:https?)://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_+.~#?&/=]*",
    )
    .unwrap()
});

/// Returns true when `url` is a safe public http(s) destination.
///
/// Pure and total: malformed input yields `false`, never a panic.
///
/// # Examples
///
/// ```ignore
/// assert!(is_acceptable("https://example.com/page"));
/// assert!(!is_acceptable("http://192.168.1.1/admin"));
/// assert!(!is_acceptable("javascript:alert(1)"));
/// ```
pub fn is_acceptable(url: &str) -> bool {
    if url.is_empty() || url.chars().count() > MAX_URL_LENGTH {
        return false;
    }

    let lowered = url.trim_start().to_ascii_lowercase();
    if BLOCKED_SCHEMES
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return false;
    }

    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    if has_credentials(url, &parsed) {
        return false;
    }

    match parsed.host() {
        Some(host) if is_public_host(&host) => {}
        _ => return false,
    }

    STRUCTURE_REGEX.is_match(url)
}

/// Extracts the first http(s) URL found in a chat message.
///
/// Surrounding text is ignored, so `"please shorten https://example.com/x thanks"`
/// yields `https://example.com/x`. The result still has to pass
/// [`is_acceptable`].
pub fn extract_url(text: &str) -> Option<String> {
    EXTRACT_REGEX.find(text).map(|m| m.as_str().to_string())
}

/// Detects `user@host` authorities, including forms the parser normalises away
/// (such as an empty user name before `@`).
fn has_credentials(raw: &str, parsed: &Url) -> bool {
    if !parsed.username().is_empty() || parsed.password().is_some() {
        return true;
    }

    let after_scheme = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(after_scheme);

    authority.contains('@')
}

fn is_public_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => is_public_domain(domain),
        Host::Ipv4(addr) => is_public_ipv4(addr),
        Host::Ipv6(addr) => is_public_ipv6(addr),
    }
}

fn is_public_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();

    if domain.is_empty() || domain == "localhost" || domain == "local" || domain == "internal" {
        return false;
    }

    !BLOCKED_HOST_SUFFIXES
        .iter()
        .any(|suffix| domain.ends_with(suffix))
}

fn is_public_ipv4(addr: &Ipv4Addr) -> bool {
    !(addr.is_loopback()
        || addr.is_unspecified()
        || addr.is_private()
        || addr.is_link_local()
        || addr.is_broadcast())
}

fn is_public_ipv6(addr: &Ipv6Addr) -> bool {
    if let Some(mapped) = addr.to_ipv4_mapped() {
        return is_public_ipv4(&mapped);
    }

    let first = addr.segments()[0];
    let unique_local = first & 0xfe00 == 0xfc00;
    let link_local = first & 0xffc0 == 0xfe80;

    !(addr.is_loopback() || addr.is_unspecified() || unique_local || link_local)
}
