use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::host::Host;

const NO_NEW_PRIVILEGES: &str = "no-new-privileges";
const SECCOMP: &str = "seccomp";
const SECCOMP_UNCONFINED: &str = "unconfined";

/// Validates `--security-opt` entries of the form `key=value` (or the legacy
/// `key:value`) and inlines seccomp profiles.
///
/// `seccomp=<path>` is replaced by `seccomp=<profile>`, where the profile is
/// the compacted JSON content of the file at `path`. All other entries are
/// passed through unchanged.
pub fn parse_security_opts(opts: &[String], host: &dyn Host) -> Result<Vec<String>> {
    let mut parsed = Vec::with_capacity(opts.len());
    for opt in opts {
        let (key, value) = match opt.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None if opt == NO_NEW_PRIVILEGES => (opt.as_str(), None),
            None => match opt.split_once(':') {
                Some((key, value)) => (key, Some(value)),
                None => {
                    return Err(ConfigError::invalid(
                        "security-opt",
                        opt.as_str(),
                        "expected key=value",
                    ))
                }
            },
        };

        match (key, value) {
            (SECCOMP, Some(path)) if path != SECCOMP_UNCONFINED => {
                let profile = read_seccomp_profile(path, host)?;
                tracing::debug!(path, "inlined seccomp profile");
                parsed.push(format!("{SECCOMP}={profile}"));
            }
            _ => parsed.push(opt.clone()),
        }
    }
    Ok(parsed)
}

fn read_seccomp_profile(path: &str, host: &dyn Host) -> Result<String> {
    let content = host
        .read_bytes(Path::new(path))
        .map_err(|source| ConfigError::ExternalResource {
            option: "security-opt",
            path: path.into(),
            source,
        })?;

    serde_json::from_slice::<serde::de::IgnoredAny>(&content).map_err(|err| {
        ConfigError::MalformedFile {
            option: "security-opt",
            path: path.into(),
            reason: format!("decoding seccomp profile failed: {err}"),
        }
    })?;

    // valid JSON is valid UTF-8
    let content = String::from_utf8_lossy(&content);
    Ok(compact_json(&content))
}

/// Drops the insignificant whitespace of a valid JSON document, keeping the
/// order and spelling of every token.
fn compact_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in json.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            ' ' | '\t' | '\n' | '\r' => {}
            '"' => {
                in_string = true;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
