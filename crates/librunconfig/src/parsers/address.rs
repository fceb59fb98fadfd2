//! Address literals: MAC and IP addresses, DNS search domains and
//! `--add-host` entries.
use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ConfigError, Result};

static ALPHA_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z]").expect("alpha regex is valid"));

static DOMAIN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^((?:(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9])\.)*(?:[A-Za-z0-9]|[A-Za-z0-9][A-Za-z0-9\-]*[A-Za-z0-9]))\.?$",
    )
    .expect("domain regex is valid")
});

const MAX_DOMAIN_LEN: usize = 255;

/// Checks an IEEE 802 MAC-48, EUI-48, EUI-64 or 20-octet InfiniBand address
/// written as colon, hyphen or dot separated hexadecimal groups.
pub fn validate_mac_address(val: &str) -> Result<String> {
    let valid_groups = |sep: char, digits: usize, counts: &[usize]| {
        let groups: Vec<&str> = val.split(sep).collect();
        counts.contains(&groups.len())
            && groups
                .iter()
                .all(|g| g.len() == digits && g.chars().all(|c| c.is_ascii_hexdigit()))
    };

    let valid = if val.contains('.') {
        valid_groups('.', 4, &[3, 4, 10])
    } else if val.contains('-') {
        valid_groups('-', 2, &[6, 8, 20])
    } else {
        valid_groups(':', 2, &[6, 8, 20])
    };

    if !valid {
        return Err(ConfigError::invalid(
            "mac-address",
            val,
            format!("{val} is not a valid mac address"),
        ));
    }
    Ok(val.to_owned())
}

/// Checks an IPv4 or IPv6 literal and returns its canonical spelling.
pub fn validate_ip_address(option: &'static str, val: &str) -> Result<String> {
    val.trim()
        .parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| ConfigError::invalid(option, val, format!("{val} is not an ip address")))
}

/// Checks a `--dns-search` domain. `.` is accepted as is and a trailing dot
/// is stripped from anything else.
pub fn validate_dns_search(val: &str) -> Result<String> {
    let val = val.trim_matches(' ');
    if val == "." {
        return Ok(val.to_owned());
    }
    let invalid = || ConfigError::invalid("dns-search", val, format!("{val} is not a valid domain"));
    if !ALPHA_REGEX.is_match(val) {
        return Err(invalid());
    }
    match DOMAIN_REGEX.captures(val).and_then(|caps| caps.get(1)) {
        Some(domain) if domain.as_str().len() < MAX_DOMAIN_LEN => Ok(domain.as_str().to_owned()),
        _ => Err(invalid()),
    }
}

/// Checks an `--add-host` entry of the form `host:ip`. The address may be an
/// IPv6 literal, so only the first colon separates.
pub fn validate_extra_host(val: &str) -> Result<String> {
    match val.split_once(':') {
        Some((host, ip)) if !host.is_empty() => {
            validate_ip_address("add-host", ip)?;
            Ok(val.to_owned())
        }
        _ => Err(ConfigError::malformed("add-host", val)),
    }
}
