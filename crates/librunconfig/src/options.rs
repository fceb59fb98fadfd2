//! The raw option surface, as a set of flags a front end can flatten into
//! its own command line.
use std::error::Error;

use chrono::Duration;
use clap::Args;

/// Network mode used when `--network` is not given.
pub const DEFAULT_NETWORK: &str = "default";

/// Swappiness value meaning "inherit from the parent cgroup".
pub const DEFAULT_SWAPPINESS: i64 = -1;

/// Options describing one container, as given on the command line.
///
/// Values are kept as typed, unvalidated text: [`crate::parse`] performs every
/// check and derivation.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOptions {
    // General purpose
    /// Attach to STDIN, STDOUT or STDERR
    #[clap(short, long)]
    pub attach: Vec<String>,
    /// Add a host device to the container
    #[clap(long)]
    pub device: Vec<String>,
    /// Set environment variables
    #[clap(short, long)]
    pub env: Vec<String>,
    /// Read in a file of environment variables
    #[clap(long)]
    pub env_file: Vec<String>,
    /// Overwrite the default ENTRYPOINT of the image
    #[clap(long, default_value = "")]
    pub entrypoint: String,
    /// Add additional groups to join
    #[clap(long)]
    pub group_add: Vec<String>,
    /// Container host name
    #[clap(long, default_value = "")]
    pub hostname: String,
    /// Keep STDIN open even if not attached
    #[clap(short, long)]
    pub interactive: bool,
    /// Set meta data on a container
    #[clap(short, long)]
    pub label: Vec<String>,
    /// Read in a line delimited file of labels
    #[clap(long)]
    pub label_file: Vec<String>,
    /// Mount the container's root filesystem as read only
    #[clap(long)]
    pub read_only: bool,
    /// Restart policy to apply when a container exits
    #[clap(long, default_value = "")]
    pub restart: String,
    /// Signal to stop a container
    #[clap(long)]
    pub stop_signal: Option<String>,
    /// Sysctl options
    #[clap(long)]
    pub sysctl: Vec<String>,
    /// Allocate a pseudo-TTY
    #[clap(short, long)]
    pub tty: bool,
    /// Ulimit options
    #[clap(long)]
    pub ulimit: Vec<String>,
    /// Username or UID (format: <name|uid>[:<group|gid>])
    #[clap(short, long, default_value = "")]
    pub user: String,
    /// Working directory inside the container
    #[clap(short, long, default_value = "")]
    pub workdir: String,

    // Security
    /// Add Linux capabilities
    #[clap(long)]
    pub cap_add: Vec<String>,
    /// Drop Linux capabilities
    #[clap(long)]
    pub cap_drop: Vec<String>,
    /// Give extended privileges to this container
    #[clap(long)]
    pub privileged: bool,
    /// Security Options
    #[clap(long)]
    pub security_opt: Vec<String>,
    /// User namespace to use
    #[clap(long, default_value = "")]
    pub userns: String,

    // Network and port publishing
    /// Add a custom host-to-IP mapping (host:ip)
    #[clap(long)]
    pub add_host: Vec<String>,
    /// Set custom DNS servers
    #[clap(long)]
    pub dns: Vec<String>,
    /// Set DNS options
    #[clap(long)]
    pub dns_opt: Vec<String>,
    /// Set custom DNS search domains
    #[clap(long)]
    pub dns_search: Vec<String>,
    /// Expose a port or a range of ports
    #[clap(long)]
    pub expose: Vec<String>,
    /// Container IPv4 address (e.g. 172.30.100.104)
    #[clap(long, default_value = "")]
    pub ip: String,
    /// Container IPv6 address (e.g. 2001:db8::33)
    #[clap(long, default_value = "")]
    pub ip6: String,
    /// Add link to another container
    #[clap(long)]
    pub link: Vec<String>,
    /// Container IPv4/IPv6 link-local addresses
    #[clap(long)]
    pub link_local_ip: Vec<String>,
    /// Container MAC address (e.g. 92:d0:c6:0a:29:33)
    #[clap(long, default_value = "")]
    pub mac_address: String,
    /// Publish a container's port(s) to the host
    #[clap(short, long)]
    pub publish: Vec<String>,
    /// Publish all exposed ports to random ports
    #[clap(short = 'P', long)]
    pub publish_all: bool,
    /// Connect a container to a network (default "default")
    #[clap(long, visible_alias = "net")]
    pub network: Option<String>,
    /// Add network-scoped alias for the container
    #[clap(long, visible_alias = "net-alias")]
    pub network_alias: Vec<String>,

    // Logging and storage
    /// Logging driver for the container
    #[clap(long, default_value = "")]
    pub log_driver: String,
    /// Optional volume driver for the container
    #[clap(long, default_value = "")]
    pub volume_driver: String,
    /// Log driver options
    #[clap(long)]
    pub log_opt: Vec<String>,
    /// Storage driver options for the container
    #[clap(long)]
    pub storage_opt: Vec<String>,
    /// Mount a tmpfs directory
    #[clap(long)]
    pub tmpfs: Vec<String>,
    /// Mount volumes from the specified container(s)
    #[clap(long)]
    pub volumes_from: Vec<String>,
    /// Bind mount a volume
    #[clap(short, long)]
    pub volume: Vec<String>,

    // Health-checking
    /// Command to run to check health
    #[clap(long, default_value = "")]
    pub health_cmd: String,
    /// Time between running the check (e.g. 30s, 1m)
    #[clap(long, value_parser = parse_duration, allow_hyphen_values = true)]
    pub health_interval: Option<Duration>,
    /// Consecutive failures needed to report unhealthy
    #[clap(long, default_value = "0", allow_hyphen_values = true)]
    pub health_retries: i32,
    /// Maximum time to allow one check to run (e.g. 10s)
    #[clap(long, value_parser = parse_duration, allow_hyphen_values = true)]
    pub health_timeout: Option<Duration>,
    /// Disable any container-specified HEALTHCHECK
    #[clap(long)]
    pub no_healthcheck: bool,

    // Resource management
    /// Block IO (relative weight), between 10 and 1000
    #[clap(long, default_value = "0")]
    pub blkio_weight: u16,
    /// Block IO weight (relative device weight)
    #[clap(long)]
    pub blkio_weight_device: Vec<String>,
    /// Write the container ID to the file
    #[clap(long, default_value = "")]
    pub cidfile: String,
    /// CPUs in which to allow execution (0-3, 0,1)
    #[clap(long, default_value = "")]
    pub cpuset_cpus: String,
    /// MEMs in which to allow execution (0-3, 0,1)
    #[clap(long, default_value = "")]
    pub cpuset_mems: String,
    /// CPU percent (Windows only)
    #[clap(long, default_value = "0")]
    pub cpu_percent: i64,
    /// Limit CPU CFS (Completely Fair Scheduler) period
    #[clap(long, default_value = "0")]
    pub cpu_period: i64,
    /// Limit CPU CFS (Completely Fair Scheduler) quota
    #[clap(long, default_value = "0", allow_hyphen_values = true)]
    pub cpu_quota: i64,
    /// CPU shares (relative weight)
    #[clap(short = 'c', long, default_value = "0")]
    pub cpu_shares: i64,
    /// Limit read rate (bytes per second) from a device
    #[clap(long)]
    pub device_read_bps: Vec<String>,
    /// Limit read rate (IO per second) from a device
    #[clap(long)]
    pub device_read_iops: Vec<String>,
    /// Limit write rate (bytes per second) to a device
    #[clap(long)]
    pub device_write_bps: Vec<String>,
    /// Limit write rate (IO per second) to a device
    #[clap(long)]
    pub device_write_iops: Vec<String>,
    /// Maximum IO bandwidth limit for the system drive (Windows only)
    #[clap(long, default_value = "", allow_hyphen_values = true)]
    pub io_maxbandwidth: String,
    /// Maximum IOps limit for the system drive (Windows only)
    #[clap(long, default_value = "0")]
    pub io_maxiops: u64,
    /// Kernel memory limit
    #[clap(long, default_value = "")]
    pub kernel_memory: String,
    /// Memory limit
    #[clap(short, long, default_value = "")]
    pub memory: String,
    /// Memory soft limit
    #[clap(long, default_value = "")]
    pub memory_reservation: String,
    /// Swap limit equal to memory plus swap: '-1' to enable unlimited swap
    #[clap(long, default_value = "", allow_hyphen_values = true)]
    pub memory_swap: String,
    /// Tune container memory swappiness (0 to 100)
    #[clap(long, allow_hyphen_values = true)]
    pub memory_swappiness: Option<i64>,
    /// Disable OOM Killer
    #[clap(long)]
    pub oom_kill_disable: bool,
    /// Tune host's OOM preferences (-1000 to 1000)
    #[clap(long, default_value = "0", allow_hyphen_values = true)]
    pub oom_score_adj: i32,
    /// Tune container pids limit (set -1 for unlimited)
    #[clap(long, default_value = "0", allow_hyphen_values = true)]
    pub pids_limit: i64,

    // Low-level execution (cgroups, namespaces, ...)
    /// Optional parent cgroup for the container
    #[clap(long, default_value = "")]
    pub cgroup_parent: String,
    /// IPC namespace to use
    #[clap(long, default_value = "")]
    pub ipc: String,
    /// Container isolation technology
    #[clap(long, default_value = "")]
    pub isolation: String,
    /// PID namespace to use
    #[clap(long, default_value = "")]
    pub pid: String,
    /// Size of /dev/shm
    #[clap(long, default_value = "")]
    pub shm_size: String,
    /// UTS namespace to use
    #[clap(long, default_value = "")]
    pub uts: String,
    /// Runtime to use for this container
    #[clap(long, default_value = "")]
    pub runtime: String,

    /// Image the container is created from
    #[clap(required = true)]
    pub image: String,
    /// Command and arguments passed to the container
    #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl RawOptions {
    pub fn network(&self) -> &str {
        self.network.as_deref().unwrap_or(DEFAULT_NETWORK)
    }

    pub fn memory_swappiness(&self) -> i64 {
        self.memory_swappiness.unwrap_or(DEFAULT_SWAPPINESS)
    }

    pub fn health_interval(&self) -> Duration {
        self.health_interval.unwrap_or_else(Duration::zero)
    }

    pub fn health_timeout(&self) -> Duration {
        self.health_timeout.unwrap_or_else(Duration::zero)
    }
}

/// Parses a duration such as `30s`, `1m30s` or `-5s`. A bare `0` is accepted
/// without a unit.
pub fn parse_duration(s: &str) -> Result<Duration, Box<dyn Error + Send + Sync + 'static>> {
    let (negative, magnitude) = match s.strip_prefix('-') {
        Some(magnitude) => (true, magnitude),
        None => (false, s),
    };
    let duration = if magnitude == "0" {
        Duration::zero()
    } else {
        Duration::from_std(humantime::parse_duration(magnitude)?)?
    };
    Ok(if negative { -duration } else { duration })
}
