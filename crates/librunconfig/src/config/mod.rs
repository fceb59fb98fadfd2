//! The configuration objects handed to the component that creates the
//! container. Field names serialize the way the engine API spells them.

mod container;
mod host;
mod network;

use std::collections::BTreeSet;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub use container::{Config, HealthConfig, HEALTH_TEST_CMD_SHELL, HEALTH_TEST_NONE};
pub use host::{
    DeviceMapping, HostConfig, IpcMode, LogConfig, NetworkMode, PidMode, Resources,
    RestartPolicy, ThrottleDevice, Ulimit, UsernsMode, UtsMode, WeightDevice,
};
pub use network::{EndpointIpamConfig, EndpointSettings, NetworkingConfig};

/// The three objects produced for one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssembledConfig {
    pub config: Config,
    pub host_config: HostConfig,
    pub networking_config: NetworkingConfig,
}

/// Sets are sent as objects whose values are empty objects.
fn serialize_set_as_map<T, S>(set: &BTreeSet<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    #[derive(Serialize)]
    struct Empty {}

    let mut map = serializer.serialize_map(Some(set.len()))?;
    for item in set {
        map.serialize_entry(item, &Empty {})?;
    }
    map.end()
}
