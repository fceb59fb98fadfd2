use crate::error::{ConfigError, Result};
use crate::host::Host;

const ATTACH_STREAMS: [&str; 3] = ["stdin", "stdout", "stderr"];

const SYSCTL_WHITELIST: [&str; 8] = [
    "kernel.msgmax",
    "kernel.msgmnb",
    "kernel.msgmni",
    "kernel.sem",
    "kernel.shmall",
    "kernel.shmmax",
    "kernel.shmmni",
    "kernel.shm_rmid_forced",
];

const SYSCTL_PREFIXES: [&str; 2] = ["net.", "fs.mqueue."];

/// Accepts `stdin`, `stdout` or `stderr` in any case and lower-cases it.
pub fn validate_attach(val: &str) -> Result<String> {
    let stream = val.to_lowercase();
    if ATTACH_STREAMS.contains(&stream.as_str()) {
        return Ok(stream);
    }
    Err(ConfigError::invalid(
        "attach",
        val,
        "valid streams are STDIN, STDOUT and STDERR",
    ))
}

/// Completes a bare `NAME` from the environment of `host`. Entries with a
/// `=`, and names that are not set, are returned unchanged.
pub fn validate_env(val: &str, host: &dyn Host) -> Result<String> {
    if val.contains('=') {
        return Ok(val.to_owned());
    }
    Ok(match host.env_var(val) {
        Some(value) => format!("{val}={value}"),
        None => val.to_owned(),
    })
}

/// Accepts a `key=value` sysctl whose key is namespaced, that is either
/// whitelisted or below `net.` or `fs.mqueue.`.
pub fn validate_sysctl(val: &str) -> Result<String> {
    let not_whitelisted =
        || ConfigError::invalid("sysctl", val, format!("sysctl '{val}' is not whitelisted"));
    let (key, _) = val.split_once('=').ok_or_else(not_whitelisted)?;
    if SYSCTL_WHITELIST.contains(&key) || SYSCTL_PREFIXES.iter().any(|p| key.starts_with(p)) {
        return Ok(val.to_owned());
    }
    Err(not_whitelisted())
}
