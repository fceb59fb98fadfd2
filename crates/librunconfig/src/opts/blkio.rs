//! Per-device block I/O weights and throttles.
use crate::config::{ThrottleDevice, WeightDevice};
use crate::error::{ConfigError, Result};
use crate::units::ram_in_bytes;

const DEVICE_PREFIX: &str = "/dev/";

fn split_device<'a>(option: &'static str, val: &'a str) -> Result<(&'a str, &'a str)> {
    let (path, value) = val
        .split_once(':')
        .ok_or_else(|| ConfigError::malformed(option, val))?;
    if !path.starts_with(DEVICE_PREFIX) {
        return Err(ConfigError::invalid(
            option,
            val,
            format!("bad format for device path: {path}"),
        ));
    }
    Ok((path, value))
}

/// Parses a `--blkio-weight-device` value of the form `/dev/path:weight`.
/// The weight is 0 or between 10 and 1000.
pub fn validate_weight_device(val: &str) -> Result<WeightDevice> {
    let (path, weight) = split_device("blkio-weight-device", val)?;
    let invalid = || ConfigError::invalid("blkio-weight-device", val, "invalid weight for device");
    let weight = weight.parse::<u16>().map_err(|_| invalid())?;
    if weight > 0 && !(10..=1000).contains(&weight) {
        return Err(invalid());
    }
    Ok(WeightDevice {
        path: path.to_owned(),
        weight,
    })
}

/// Parses a `--device-{read,write}-bps` value of the form `/dev/path:size`.
pub fn validate_throttle_bps_device(option: &'static str, val: &str) -> Result<ThrottleDevice> {
    let (path, rate) = split_device(option, val)?;
    let rate = ram_in_bytes(rate)
        .ok()
        .and_then(|rate| u64::try_from(rate).ok())
        .ok_or_else(|| {
            ConfigError::invalid(
                option,
                val,
                "the correct format is <device-path>:<number>[<unit>], number must be a positive integer, unit is optional and can be kb, mb, or gb",
            )
        })?;
    Ok(ThrottleDevice {
        path: path.to_owned(),
        rate,
    })
}

/// Parses a `--device-{read,write}-iops` value of the form `/dev/path:count`.
pub fn validate_throttle_iops_device(option: &'static str, val: &str) -> Result<ThrottleDevice> {
    let (path, rate) = split_device(option, val)?;
    let rate = rate.parse::<u64>().map_err(|_| {
        ConfigError::invalid(
            option,
            val,
            "the correct format is <device-path>:<number>, number must be a positive integer",
        )
    })?;
    Ok(ThrottleDevice {
        path: path.to_owned(),
        rate,
    })
}
