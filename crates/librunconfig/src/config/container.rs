use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;
use serde::{Serialize, Serializer};

use crate::ports::PortSet;

/// Probe test that disables any health check inherited from the image.
pub const HEALTH_TEST_NONE: &str = "NONE";
/// Probe test prefix for a command run through the container's shell.
pub const HEALTH_TEST_CMD_SHELL: &str = "CMD-SHELL";

/// Process and image level configuration of the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    pub hostname: String,
    pub user: String,
    pub attach_stdin: bool,
    pub attach_stdout: bool,
    pub attach_stderr: bool,
    #[serde(serialize_with = "super::serialize_set_as_map")]
    pub exposed_ports: PortSet,
    pub tty: bool,
    pub open_stdin: bool,
    /// Close stdin once the attached client disconnects.
    pub stdin_once: bool,
    pub env: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<HealthConfig>,
    pub image: String,
    #[serde(serialize_with = "super::serialize_set_as_map")]
    pub volumes: BTreeSet<String>,
    pub working_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<Vec<String>>,
    pub network_disabled: bool,
    pub mac_address: String,
    pub labels: BTreeMap<String, String>,
    /// Only present when the signal was given explicitly, so the daemon
    /// default applies otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_signal: Option<String>,
}

/// Health check of the container. `None` on [`Config`] means the check of
/// the image is inherited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthConfig {
    /// `["NONE"]` disables the check, `["CMD-SHELL", cmd]` runs `cmd`, an
    /// empty test keeps the command of the image.
    pub test: Vec<String>,
    #[serde(serialize_with = "serialize_nanos")]
    pub interval: Duration,
    #[serde(serialize_with = "serialize_nanos")]
    pub timeout: Duration,
    pub retries: i32,
}

impl HealthConfig {
    pub fn disabled() -> Self {
        HealthConfig {
            test: vec![HEALTH_TEST_NONE.to_owned()],
            interval: Duration::zero(),
            timeout: Duration::zero(),
            retries: 0,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self.test.first(), Some(test) if test == HEALTH_TEST_NONE)
    }
}

fn serialize_nanos<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_nanoseconds().unwrap_or(i64::MAX))
}
