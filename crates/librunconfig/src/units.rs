//! Human readable byte sizes such as `512m` or `1.5GB`.
use once_cell::sync::Lazy;
use regex::Regex;

const KIB: i64 = 1024;
const MIB: i64 = KIB * 1024;
const GIB: i64 = MIB * 1024;
const TIB: i64 = GIB * 1024;
const PIB: i64 = TIB * 1024;

static SIZE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?\d+(?:\.\d+)?) ?([kKmMgGtTpP])?[bB]?$").expect("size regex is valid")
});

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SizeError {
    #[error("invalid size: '{0}'")]
    Invalid(String),
}

/// Parses a size in bytes where every unit is a power of 1024, so `1k` is
/// 1024 bytes and `1m` is 1048576 bytes. A leading `-` is accepted, callers
/// that need a non-negative size must check the result.
pub fn ram_in_bytes(size: &str) -> Result<i64, SizeError> {
    let captures = SIZE_REGEX
        .captures(size)
        .ok_or_else(|| SizeError::Invalid(size.to_owned()))?;

    let value: f64 = captures[1]
        .parse()
        .map_err(|_| SizeError::Invalid(size.to_owned()))?;

    let multiplier = match captures.get(2).map(|unit| unit.as_str()) {
        None => 1,
        Some("k") | Some("K") => KIB,
        Some("m") | Some("M") => MIB,
        Some("g") | Some("G") => GIB,
        Some("t") | Some("T") => TIB,
        Some(_) => PIB,
    };

    Ok((value * multiplier as f64) as i64)
}
