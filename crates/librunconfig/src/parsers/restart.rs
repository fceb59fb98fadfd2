use crate::config::RestartPolicy;
use crate::error::{ConfigError, Result};

pub const RESTART_NO: &str = "no";
pub const RESTART_ALWAYS: &str = "always";
pub const RESTART_UNLESS_STOPPED: &str = "unless-stopped";
pub const RESTART_ON_FAILURE: &str = "on-failure";

/// Parses a `--restart` value of the form `name[:maxRetries]`.
///
/// An empty value means no policy. Only `on-failure` takes a retry count.
pub fn parse_restart_policy(policy: &str) -> Result<RestartPolicy> {
    if policy.is_empty() {
        return Ok(RestartPolicy::default());
    }

    let (name, count) = match policy.split_once(':') {
        Some((name, count)) => (name, Some(count)),
        None => (policy, None),
    };

    match name {
        RESTART_NO | RESTART_ALWAYS | RESTART_UNLESS_STOPPED => {
            if count.is_some() {
                return Err(ConfigError::conflict(
                    "restart",
                    format!("maximum retry count cannot be used with restart policy '{name}'"),
                ));
            }
            Ok(RestartPolicy {
                name: name.to_owned(),
                maximum_retry_count: 0,
            })
        }
        RESTART_ON_FAILURE => {
            let maximum_retry_count = match count {
                None => 0,
                Some(count) if count.contains(':') => {
                    return Err(ConfigError::invalid(
                        "restart",
                        policy,
                        "restart count format is not valid, usage: 'on-failure:N' or 'on-failure'",
                    ));
                }
                Some(count) => count
                    .parse::<i32>()
                    .map_err(|err| ConfigError::invalid("restart", policy, err))?,
            };
            Ok(RestartPolicy {
                name: name.to_owned(),
                maximum_retry_count,
            })
        }
        _ => Err(ConfigError::invalid(
            "restart",
            policy,
            "invalid restart policy",
        )),
    }
}
