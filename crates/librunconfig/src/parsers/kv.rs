//! `key=value` lists of `--log-opt`, `--storage-opt` and `--label`.
use std::collections::BTreeMap;

use crate::error::{ConfigError, Result};

/// Turns `key=value` strings into a map. A string without `=` maps to an
/// empty value and later keys override earlier ones.
pub fn convert_kv_strings_to_map(values: &[String]) -> BTreeMap<String, String> {
    values
        .iter()
        .map(|value| match value.split_once('=') {
            Some((key, value)) => (key.to_owned(), value.to_owned()),
            None => (value.clone(), String::new()),
        })
        .collect()
}

fn parse_kv_opts(option: &'static str, opts: &[String]) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for opt in opts {
        let (key, value) = opt
            .split_once('=')
            .ok_or_else(|| ConfigError::malformed(option, opt.as_str()))?;
        map.insert(key.to_owned(), value.to_owned());
    }
    Ok(map)
}

/// Parses `--storage-opt` entries. Every entry needs a `=`; the value keeps
/// any further `=`.
pub fn parse_storage_opts(opts: &[String]) -> Result<BTreeMap<String, String>> {
    parse_kv_opts("storage-opt", opts)
}

/// Parses `--log-opt` entries for the given log driver. The `none` driver
/// takes no options.
pub fn parse_logging_opts(driver: &str, opts: &[String]) -> Result<BTreeMap<String, String>> {
    let map = parse_kv_opts("log-opt", opts)?;
    if driver == "none" && !map.is_empty() {
        return Err(ConfigError::conflict(
            "log-opt",
            format!("invalid logging opts for driver {driver}"),
        ));
    }
    Ok(map)
}
