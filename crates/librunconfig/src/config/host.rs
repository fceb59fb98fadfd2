use std::collections::BTreeMap;

use serde::Serialize;

use crate::ports::PortMap;

/// Runtime configuration of the container: resources, namespaces, mounts
/// and policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfig {
    pub binds: Vec<String>,
    #[serde(rename = "ContainerIDFile")]
    pub container_id_file: String,
    pub log_config: LogConfig,
    pub network_mode: NetworkMode,
    pub port_bindings: PortMap,
    pub restart_policy: RestartPolicy,
    pub volume_driver: String,
    pub volumes_from: Vec<String>,

    pub cap_add: Vec<String>,
    pub cap_drop: Vec<String>,
    pub dns: Vec<String>,
    pub dns_options: Vec<String>,
    pub dns_search: Vec<String>,
    pub extra_hosts: Vec<String>,
    pub group_add: Vec<String>,
    pub ipc_mode: IpcMode,
    pub links: Vec<String>,
    pub oom_score_adj: i32,
    pub pid_mode: PidMode,
    pub privileged: bool,
    pub publish_all_ports: bool,
    pub readonly_rootfs: bool,
    pub security_opt: Vec<String>,
    pub storage_opt: BTreeMap<String, String>,
    pub tmpfs: BTreeMap<String, String>,
    #[serde(rename = "UTSMode")]
    pub uts_mode: UtsMode,
    pub userns_mode: UsernsMode,
    pub shm_size: i64,
    pub sysctls: BTreeMap<String, String>,
    pub runtime: String,
    pub isolation: String,

    #[serde(flatten)]
    pub resources: Resources,
}

/// Cgroup backed resource limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resources {
    pub cgroup_parent: String,
    pub blkio_weight: u16,
    pub blkio_weight_device: Vec<WeightDevice>,
    pub blkio_device_read_bps: Vec<ThrottleDevice>,
    pub blkio_device_write_bps: Vec<ThrottleDevice>,
    #[serde(rename = "BlkioDeviceReadIOps")]
    pub blkio_device_read_iops: Vec<ThrottleDevice>,
    #[serde(rename = "BlkioDeviceWriteIOps")]
    pub blkio_device_write_iops: Vec<ThrottleDevice>,
    #[serde(rename = "CPUPeriod")]
    pub cpu_period: i64,
    #[serde(rename = "CPUQuota")]
    pub cpu_quota: i64,
    #[serde(rename = "CPUShares")]
    pub cpu_shares: i64,
    #[serde(rename = "CPUPercent")]
    pub cpu_percent: i64,
    pub cpuset_cpus: String,
    pub cpuset_mems: String,
    pub devices: Vec<DeviceMapping>,
    pub kernel_memory: i64,
    pub memory: i64,
    pub memory_reservation: i64,
    /// Memory plus swap; -1 means unlimited swap.
    pub memory_swap: i64,
    pub memory_swappiness: Option<i64>,
    pub oom_kill_disable: Option<bool>,
    pub pids_limit: i64,
    pub ulimits: Vec<Ulimit>,
    #[serde(rename = "IOMaximumIOps")]
    pub io_maximum_iops: u64,
    #[serde(rename = "IOMaximumBandwidth")]
    pub io_maximum_bandwidth: u64,
}

/// A host device made available inside the container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceMapping {
    pub path_on_host: String,
    pub path_in_container: String,
    /// Ordered, de-duplicated subset of `r`, `w` and `m`.
    pub cgroup_permissions: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RestartPolicy {
    /// Empty when no policy was requested.
    pub name: String,
    pub maximum_retry_count: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogConfig {
    #[serde(rename = "Type")]
    pub driver: String,
    pub config: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeightDevice {
    pub path: String,
    pub weight: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ThrottleDevice {
    pub path: String,
    pub rate: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ulimit {
    pub name: String,
    pub soft: i64,
    pub hard: i64,
}

macro_rules! mode_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_host(&self) -> bool {
                self.0 == "host"
            }
        }

        impl From<&str> for $name {
            fn from(mode: &str) -> Self {
                $name(mode.to_owned())
            }
        }
    };
}

/// Returns the container referenced by a `container:<name>` mode.
fn container_of(mode: &str) -> Option<&str> {
    mode.strip_prefix("container:")
}

/// `true` for the private, host and `container:<name>` forms.
fn valid_shareable_mode(mode: &str) -> bool {
    match mode {
        "" | "host" => true,
        _ => matches!(container_of(mode), Some(name) if !name.is_empty() && !name.contains(':')),
    }
}

mode_type!(
    /// IPC namespace of the container.
    IpcMode
);

impl IpcMode {
    pub fn valid(&self) -> bool {
        valid_shareable_mode(&self.0)
    }

    pub fn container(&self) -> Option<&str> {
        container_of(&self.0)
    }
}

mode_type!(
    /// PID namespace of the container.
    PidMode
);

impl PidMode {
    pub fn valid(&self) -> bool {
        valid_shareable_mode(&self.0)
    }

    pub fn container(&self) -> Option<&str> {
        container_of(&self.0)
    }
}

mode_type!(
    /// UTS namespace of the container.
    UtsMode
);

impl UtsMode {
    pub fn valid(&self) -> bool {
        matches!(self.0.as_str(), "" | "host")
    }
}

mode_type!(
    /// User namespace of the container.
    UsernsMode
);

impl UsernsMode {
    pub fn valid(&self) -> bool {
        matches!(self.0.as_str(), "" | "host")
    }
}

mode_type!(
    /// Network the container is attached to.
    NetworkMode
);

impl NetworkMode {
    pub fn is_default(&self) -> bool {
        self.0 == "default"
    }

    pub fn is_bridge(&self) -> bool {
        self.0 == "bridge"
    }

    pub fn is_none(&self) -> bool {
        self.0 == "none"
    }

    pub fn is_container(&self) -> bool {
        container_of(&self.0).is_some()
    }

    /// A network created by the user rather than one of the built in modes.
    pub fn is_user_defined(&self) -> bool {
        !(self.is_default()
            || self.is_bridge()
            || self.is_host()
            || self.is_none()
            || self.is_container())
    }
}
