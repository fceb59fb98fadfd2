use std::collections::BTreeMap;

use crate::config::Ulimit;
use crate::error::{ConfigError, Result};

/// Resource limit names understood by `setrlimit`, without the `RLIMIT_`
/// prefix.
const ULIMIT_NAMES: [&str; 15] = [
    "core",
    "cpu",
    "data",
    "fsize",
    "locks",
    "memlock",
    "msgqueue",
    "nice",
    "nofile",
    "nproc",
    "rss",
    "rtprio",
    "rttime",
    "sigpending",
    "stack",
];

/// Parses a `--ulimit` value of the form `name=soft[:hard]`. The hard limit
/// defaults to the soft one.
pub fn parse_ulimit(val: &str) -> Result<Ulimit> {
    let (name, limits) = val
        .split_once('=')
        .ok_or_else(|| ConfigError::malformed("ulimit", val))?;
    if !ULIMIT_NAMES.contains(&name) {
        return Err(ConfigError::invalid(
            "ulimit",
            val,
            format!("invalid ulimit type: {name}"),
        ));
    }

    let parse_limit = |limit: &str| {
        limit
            .parse::<i64>()
            .map_err(|err| ConfigError::invalid("ulimit", val, err))
    };
    let (soft, hard) = match limits.split(':').collect::<Vec<_>>().as_slice() {
        &[soft] => {
            let soft = parse_limit(soft)?;
            (soft, soft)
        }
        &[soft, hard] => (parse_limit(soft)?, parse_limit(hard)?),
        _ => {
            return Err(ConfigError::invalid(
                "ulimit",
                val,
                "too many limit value arguments, can only have up to two, `soft[:hard]`",
            ))
        }
    };

    if soft > hard {
        return Err(ConfigError::invalid(
            "ulimit",
            val,
            format!("soft limit must be less than or equal to hard limit: {soft} > {hard}"),
        ));
    }

    Ok(Ulimit {
        name: name.to_owned(),
        soft,
        hard,
    })
}

/// Ulimits keyed by name; a later value for the same name replaces the
/// earlier one.
#[derive(Debug, Default)]
pub struct UlimitOpts {
    values: BTreeMap<String, Ulimit>,
}

impl UlimitOpts {
    pub fn from_values(values: &[String]) -> Result<Self> {
        let mut opts = UlimitOpts::default();
        for value in values {
            opts.set(value)?;
        }
        Ok(opts)
    }

    pub fn set(&mut self, val: &str) -> Result<()> {
        let ulimit = parse_ulimit(val)?;
        self.values.insert(ulimit.name.clone(), ulimit);
        Ok(())
    }

    /// The ulimits sorted by name.
    pub fn get_list(&self) -> Vec<Ulimit> {
        self.values.values().cloned().collect()
    }
}
