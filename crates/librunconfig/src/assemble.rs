//! Turns [`RawOptions`] into the three configuration objects of a container.
//!
//! [`parse`] runs a fixed sequence of steps. Several error messages depend on
//! which check runs first, and later steps reuse values derived by earlier
//! ones, so the order below is part of the contract:
//!
//! 1. collect the list options, validating every element
//! 2. MAC address
//! 3. attach streams
//! 4. byte sizes
//! 5. memory swappiness
//! 6. volumes and binds
//! 7. tmpfs mounts
//! 8. exposed and published ports
//! 9. devices, env and labels, namespace modes, restart policy, logging,
//!    security and storage options
//! 10. health check
//! 11. stop signal and the process and host configuration
//! 12. network endpoints
//! 13. stdin once
use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;

use crate::config::{
    AssembledConfig, Config, DeviceMapping, EndpointIpamConfig, HealthConfig, HostConfig,
    IpcMode, LogConfig, NetworkMode, NetworkingConfig, PidMode, Resources, ThrottleDevice,
    UsernsMode, UtsMode, WeightDevice, HEALTH_TEST_CMD_SHELL,
};
use crate::error::{ConfigError, Result};
use crate::host::Host;
use crate::mount::parse_tmpfs_options;
use crate::options::RawOptions;
use crate::opts::{
    read_kv_strings, validate_attach, validate_env, validate_sysctl,
    validate_throttle_bps_device, validate_throttle_iops_device, validate_weight_device,
    ListOpts, UlimitOpts,
};
use crate::parsers::{
    parse_device, parse_logging_opts, parse_restart_policy, parse_security_opts,
    parse_storage_opts, validate_device, validate_dns_search, validate_extra_host,
    validate_ip_address, validate_link, validate_mac_address, validate_volume,
};
use crate::ports::{parse_port_range, parse_port_specs, split_proto_port, Port, PortMap, PortSet};
use crate::signal::Signal;
use crate::split::volume_split_n;
use crate::units::ram_in_bytes;

/// Validates `opts` and builds the configuration of the container.
///
/// Files named by `--env-file`, `--label-file` and `--security-opt
/// seccomp=<path>` and the environment used to complete bare `NAME` entries
/// are read through `host`. The first invalid option aborts the whole parse.
pub fn parse(opts: &RawOptions, host: &dyn Host) -> Result<AssembledConfig> {
    let lists = ListOptions::collect(opts, host)?;
    tracing::debug!(image = %opts.image, "collected list options");

    validate_mac(opts)?;
    let attach = resolve_attach(opts, &lists.attach);
    let sizes = parse_sizes(opts)?;
    let swappiness = validate_swappiness(opts)?;
    let (volumes, binds) = partition_volumes(&lists.volumes);
    let tmpfs = parse_tmpfs(&opts.tmpfs)?;
    let (exposed_ports, port_bindings) = resolve_ports(&opts.publish, &opts.expose)?;

    let devices = parse_devices(&lists.devices)?;
    let env = read_kv_strings("env-file", &opts.env_file, lists.env.into_vec(), host)?;
    let labels = read_kv_strings("label-file", &opts.label_file, lists.labels.into_vec(), host)?;
    let namespaces = parse_namespace_modes(opts)?;
    let restart_policy = parse_restart_policy(&opts.restart)?;
    let log_opts = parse_logging_opts(&opts.log_driver, &opts.log_opt)?;
    let security_opt = parse_security_opts(&opts.security_opt, host)?;
    let storage_opt = parse_storage_opts(&opts.storage_opt)?;
    tracing::debug!(
        devices = devices.len(),
        env = env.len(),
        labels = labels.len(),
        restart = %restart_policy.name,
        "parsed container options"
    );

    let healthcheck = resolve_healthcheck(opts)?;
    let stop_signal = resolve_stop_signal(opts)?;

    let resources = Resources {
        cgroup_parent: opts.cgroup_parent.clone(),
        blkio_weight: opts.blkio_weight,
        blkio_weight_device: lists.blkio_weight_device,
        blkio_device_read_bps: lists.device_read_bps,
        blkio_device_write_bps: lists.device_write_bps,
        blkio_device_read_iops: lists.device_read_iops,
        blkio_device_write_iops: lists.device_write_iops,
        cpu_period: opts.cpu_period,
        cpu_quota: opts.cpu_quota,
        cpu_shares: opts.cpu_shares,
        cpu_percent: opts.cpu_percent,
        cpuset_cpus: opts.cpuset_cpus.clone(),
        cpuset_mems: opts.cpuset_mems.clone(),
        devices,
        kernel_memory: sizes.kernel_memory,
        memory: sizes.memory,
        memory_reservation: sizes.memory_reservation,
        memory_swap: sizes.memory_swap,
        memory_swappiness: Some(swappiness),
        oom_kill_disable: Some(opts.oom_kill_disable),
        pids_limit: opts.pids_limit,
        ulimits: lists.ulimits.get_list(),
        io_maximum_iops: opts.io_maxiops,
        io_maximum_bandwidth: sizes.io_maximum_bandwidth,
    };

    let mut config = Config {
        hostname: opts.hostname.clone(),
        user: opts.user.clone(),
        attach_stdin: attach.stdin,
        attach_stdout: attach.stdout,
        attach_stderr: attach.stderr,
        exposed_ports,
        tty: opts.tty,
        open_stdin: opts.interactive,
        stdin_once: false,
        env,
        cmd: (!opts.args.is_empty()).then(|| opts.args.clone()),
        healthcheck,
        image: opts.image.clone(),
        volumes,
        working_dir: opts.workdir.clone(),
        entrypoint: (!opts.entrypoint.is_empty()).then(|| vec![opts.entrypoint.clone()]),
        network_disabled: false,
        mac_address: opts.mac_address.clone(),
        labels: crate::parsers::convert_kv_strings_to_map(&labels),
        stop_signal,
    };

    let host_config = HostConfig {
        binds,
        container_id_file: opts.cidfile.clone(),
        log_config: LogConfig {
            driver: opts.log_driver.clone(),
            config: log_opts,
        },
        network_mode: NetworkMode::from(opts.network()),
        port_bindings,
        restart_policy,
        volume_driver: opts.volume_driver.clone(),
        volumes_from: opts.volumes_from.clone(),
        cap_add: opts.cap_add.clone(),
        cap_drop: opts.cap_drop.clone(),
        dns: lists.dns.into_vec(),
        dns_options: opts.dns_opt.clone(),
        dns_search: lists.dns_search.into_vec(),
        extra_hosts: lists.extra_hosts.into_vec(),
        group_add: opts.group_add.clone(),
        ipc_mode: namespaces.ipc,
        links: lists.links.into_vec(),
        oom_score_adj: opts.oom_score_adj,
        pid_mode: namespaces.pid,
        privileged: opts.privileged,
        publish_all_ports: opts.publish_all,
        readonly_rootfs: opts.read_only,
        security_opt,
        storage_opt,
        tmpfs,
        uts_mode: namespaces.uts,
        userns_mode: namespaces.userns,
        shm_size: sizes.shm_size,
        sysctls: lists.sysctls.get_map(),
        runtime: opts.runtime.clone(),
        isolation: opts.isolation.clone(),
        resources,
    };

    let networking_config = build_networking_config(opts, &host_config)?;

    if config.open_stdin && config.attach_stdin {
        config.stdin_once = true;
    }

    tracing::debug!(
        network = %host_config.network_mode.as_str(),
        endpoints = networking_config.endpoints_config.len(),
        "assembled container configuration"
    );
    Ok(AssembledConfig {
        config,
        host_config,
        networking_config,
    })
}

/// The repeatable options after per-element validation, the way a flag
/// binding layer with validating list values would hand them over.
struct ListOptions<'a> {
    attach: ListOpts<'a>,
    volumes: ListOpts<'a>,
    devices: ListOpts<'a>,
    env: ListOpts<'a>,
    labels: ListOpts<'a>,
    links: ListOpts<'a>,
    dns: ListOpts<'a>,
    dns_search: ListOpts<'a>,
    extra_hosts: ListOpts<'a>,
    sysctls: ListOpts<'a>,
    ulimits: UlimitOpts,
    blkio_weight_device: Vec<WeightDevice>,
    device_read_bps: Vec<ThrottleDevice>,
    device_write_bps: Vec<ThrottleDevice>,
    device_read_iops: Vec<ThrottleDevice>,
    device_write_iops: Vec<ThrottleDevice>,
}

impl<'a> ListOptions<'a> {
    fn collect(opts: &RawOptions, host: &'a dyn Host) -> Result<Self> {
        let bps = |option: &'static str, values: &[String]| {
            values
                .iter()
                .map(|val| validate_throttle_bps_device(option, val))
                .collect::<Result<Vec<_>>>()
        };
        let iops = |option: &'static str, values: &[String]| {
            values
                .iter()
                .map(|val| validate_throttle_iops_device(option, val))
                .collect::<Result<Vec<_>>>()
        };

        Ok(ListOptions {
            attach: ListOpts::from_values(validate_attach, &opts.attach)?,
            volumes: ListOpts::from_values(validate_volume, &opts.volume)?,
            devices: ListOpts::from_values(validate_device, &opts.device)?,
            env: ListOpts::from_values(move |val: &str| validate_env(val, host), &opts.env)?,
            labels: ListOpts::from_values(move |val: &str| validate_env(val, host), &opts.label)?,
            links: ListOpts::from_values(validate_link, &opts.link)?,
            dns: ListOpts::from_values(|val: &str| validate_ip_address("dns", val), &opts.dns)?,
            dns_search: ListOpts::from_values(validate_dns_search, &opts.dns_search)?,
            extra_hosts: ListOpts::from_values(validate_extra_host, &opts.add_host)?,
            sysctls: ListOpts::from_values(validate_sysctl, &opts.sysctl)?,
            ulimits: UlimitOpts::from_values(&opts.ulimit)?,
            blkio_weight_device: opts
                .blkio_weight_device
                .iter()
                .map(|val| validate_weight_device(val))
                .collect::<Result<Vec<_>>>()?,
            device_read_bps: bps("device-read-bps", &opts.device_read_bps)?,
            device_write_bps: bps("device-write-bps", &opts.device_write_bps)?,
            device_read_iops: iops("device-read-iops", &opts.device_read_iops)?,
            device_write_iops: iops("device-write-iops", &opts.device_write_iops)?,
        })
    }
}

fn validate_mac(opts: &RawOptions) -> Result<()> {
    if !opts.mac_address.is_empty() {
        validate_mac_address(&opts.mac_address)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AttachStreams {
    stdin: bool,
    stdout: bool,
    stderr: bool,
}

/// Without `--attach` stdout and stderr are attached; `--interactive` always
/// attaches stdin.
fn resolve_attach(opts: &RawOptions, attach: &ListOpts) -> AttachStreams {
    let mut streams = AttachStreams {
        stdin: attach.contains("stdin"),
        stdout: attach.contains("stdout"),
        stderr: attach.contains("stderr"),
    };
    if opts.interactive {
        streams.stdin = true;
    }
    if attach.is_empty() {
        streams.stdout = true;
        streams.stderr = true;
    }
    streams
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Sizes {
    memory: i64,
    memory_reservation: i64,
    memory_swap: i64,
    kernel_memory: i64,
    shm_size: i64,
    io_maximum_bandwidth: u64,
}

/// Size in bytes of an optional byte size option, 0 when unset.
fn parse_size(option: &'static str, value: &str) -> Result<i64> {
    if value.is_empty() {
        return Ok(0);
    }
    ram_in_bytes(value).map_err(|err| ConfigError::invalid(option, value, err))
}

fn parse_sizes(opts: &RawOptions) -> Result<Sizes> {
    let memory = parse_size("memory", &opts.memory)?;
    let memory_reservation = parse_size("memory-reservation", &opts.memory_reservation)?;
    let memory_swap = match opts.memory_swap.as_str() {
        "-1" => -1,
        swap => parse_size("memory-swap", swap)?,
    };
    let kernel_memory = parse_size("kernel-memory", &opts.kernel_memory)?;
    let shm_size = parse_size("shm-size", &opts.shm_size)?;
    let io_maximum_bandwidth = parse_size("io-maxbandwidth", &opts.io_maxbandwidth)?;
    let io_maximum_bandwidth = u64::try_from(io_maximum_bandwidth).map_err(|_| {
        ConfigError::invalid(
            "io-maxbandwidth",
            opts.io_maxbandwidth.as_str(),
            "maximum IO bandwidth must be positive",
        )
    })?;

    Ok(Sizes {
        memory,
        memory_reservation,
        memory_swap,
        kernel_memory,
        shm_size,
        io_maximum_bandwidth,
    })
}

fn validate_swappiness(opts: &RawOptions) -> Result<i64> {
    let swappiness = opts.memory_swappiness();
    if swappiness != -1 && !(0..=100).contains(&swappiness) {
        return Err(ConfigError::invalid(
            "memory-swappiness",
            swappiness.to_string(),
            "valid memory swappiness range is 0-100",
        ));
    }
    Ok(swappiness)
}

/// Splits the volumes into anonymous volumes and binds. Every entry with a
/// source, host path or volume name, is a bind and must not end up in the
/// image level volume set.
fn partition_volumes(volumes: &ListOpts) -> (BTreeSet<String>, Vec<String>) {
    let (binds, volumes): (BTreeSet<String>, BTreeSet<String>) = volumes
        .get_set()
        .into_iter()
        .partition(|volume| volume_split_n(volume, 2).map_or(false, |parts| parts.len() > 1));

    for bind in &binds {
        tracing::trace!(bind = %bind, "volume has a source, treating it as a bind");
    }
    (volumes, binds.into_iter().collect())
}

/// Maps each tmpfs mount point to its options. The options are checked the
/// way they will be at mount time.
fn parse_tmpfs(values: &[String]) -> Result<BTreeMap<String, String>> {
    let mut tmpfs = BTreeMap::new();
    for value in values {
        match value.split_once(':') {
            Some((path, options)) => {
                let mount = parse_tmpfs_options(options)
                    .map_err(|err| ConfigError::invalid("tmpfs", value.as_str(), err))?;
                tracing::trace!(
                    path,
                    flags = ?mount.flags,
                    data = %mount.data,
                    "validated tmpfs mount"
                );
                tmpfs.insert(path.to_owned(), options.to_owned());
            }
            None => {
                tmpfs.insert(value.clone(), String::new());
            }
        }
    }
    Ok(tmpfs)
}

/// Collects the published ports and their bindings, then adds the exposed
/// ports that were not published.
fn resolve_ports(publish: &[String], expose: &[String]) -> Result<(PortSet, PortMap)> {
    let mut exposed = PortSet::new();
    let mut bindings = PortMap::new();
    for spec in publish {
        let (ports, port_bindings) = parse_port_specs(std::slice::from_ref(spec))
            .map_err(|err| ConfigError::invalid("publish", spec.as_str(), err))?;
        exposed.extend(ports);
        for (port, port_bindings) in port_bindings {
            bindings.entry(port).or_default().extend(port_bindings);
        }
    }

    for spec in expose {
        if spec.contains(':') {
            return Err(ConfigError::malformed("expose", spec.as_str()));
        }
        let (proto, port) = split_proto_port(spec);
        let (start, end) = parse_port_range(port)
            .map_err(|err| ConfigError::invalid("expose", spec.as_str(), err))?;
        for number in start..=end {
            let port = Port::new(proto, &number.to_string())
                .map_err(|err| ConfigError::invalid("expose", spec.as_str(), err))?;
            exposed.insert(port);
        }
    }

    Ok((exposed, bindings))
}

fn parse_devices(devices: &ListOpts) -> Result<Vec<DeviceMapping>> {
    devices.get_all().iter().map(|device| parse_device(device)).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct NamespaceModes {
    ipc: IpcMode,
    pid: PidMode,
    uts: UtsMode,
    userns: UsernsMode,
}

fn parse_namespace_modes(opts: &RawOptions) -> Result<NamespaceModes> {
    let ipc = IpcMode::from(opts.ipc.as_str());
    if !ipc.valid() {
        return Err(ConfigError::invalid("ipc", opts.ipc.as_str(), "invalid IPC mode"));
    }
    let pid = PidMode::from(opts.pid.as_str());
    if !pid.valid() {
        return Err(ConfigError::invalid("pid", opts.pid.as_str(), "invalid PID mode"));
    }
    let uts = UtsMode::from(opts.uts.as_str());
    if !uts.valid() {
        return Err(ConfigError::invalid("uts", opts.uts.as_str(), "invalid UTS mode"));
    }
    let userns = UsernsMode::from(opts.userns.as_str());
    if !userns.valid() {
        return Err(ConfigError::invalid(
            "userns",
            opts.userns.as_str(),
            "invalid USER mode",
        ));
    }
    Ok(NamespaceModes {
        ipc,
        pid,
        uts,
        userns,
    })
}

/// `--no-healthcheck` disables the check of the image and cannot be mixed
/// with the `--health-*` options. Without any of them the check of the image
/// is kept.
fn resolve_healthcheck(opts: &RawOptions) -> Result<Option<HealthConfig>> {
    let interval = opts.health_interval();
    let timeout = opts.health_timeout();
    let have_health_settings = !opts.health_cmd.is_empty()
        || interval != Duration::zero()
        || timeout != Duration::zero()
        || opts.health_retries != 0;

    if opts.no_healthcheck {
        if have_health_settings {
            return Err(ConfigError::conflict(
                "no-healthcheck",
                "conflicts with --health-* options",
            ));
        }
        return Ok(Some(HealthConfig::disabled()));
    }
    if !have_health_settings {
        return Ok(None);
    }

    if interval < Duration::zero() {
        return Err(ConfigError::invalid(
            "health-interval",
            interval.to_string(),
            "cannot be negative",
        ));
    }
    if timeout < Duration::zero() {
        return Err(ConfigError::invalid(
            "health-timeout",
            timeout.to_string(),
            "cannot be negative",
        ));
    }

    let test = if opts.health_cmd.is_empty() {
        Vec::new()
    } else {
        vec![HEALTH_TEST_CMD_SHELL.to_owned(), opts.health_cmd.clone()]
    };
    Ok(Some(HealthConfig {
        test,
        interval,
        timeout,
        retries: opts.health_retries,
    }))
}

/// The stop signal is only recorded when it was given, so the default of the
/// image still applies otherwise.
fn resolve_stop_signal(opts: &RawOptions) -> Result<Option<String>> {
    let Some(stop_signal) = &opts.stop_signal else {
        return Ok(None);
    };
    Signal::try_from(stop_signal.as_str())
        .map_err(|err| ConfigError::invalid("stop-signal", stop_signal.as_str(), err))?;
    Ok(Some(stop_signal.clone()))
}

/// Endpoint settings of the network the container joins: requested
/// addresses, plus links and network scoped aliases on user defined networks.
fn build_networking_config(
    opts: &RawOptions,
    host_config: &HostConfig,
) -> Result<NetworkingConfig> {
    let network_mode = &host_config.network_mode;
    let mut networking_config = NetworkingConfig::default();

    if !opts.ip.is_empty() || !opts.ip6.is_empty() || !opts.link_local_ip.is_empty() {
        let ipv4_address = match opts.ip.as_str() {
            "" => String::new(),
            ip => validate_ip_address("ip", ip)?,
        };
        let ipv6_address = match opts.ip6.as_str() {
            "" => String::new(),
            ip => validate_ip_address("ip6", ip)?,
        };
        let link_local_ips = opts
            .link_local_ip
            .iter()
            .map(|ip| validate_ip_address("link-local-ip", ip))
            .collect::<Result<Vec<_>>>()?;

        networking_config
            .endpoint_mut(network_mode.as_str())
            .ipam_config = Some(EndpointIpamConfig {
            ipv4_address,
            ipv6_address,
            link_local_ips,
        });
    }

    if network_mode.is_user_defined() && !host_config.links.is_empty() {
        networking_config.endpoint_mut(network_mode.as_str()).links = host_config.links.clone();
    }

    if network_mode.is_user_defined() && !opts.network_alias.is_empty() {
        networking_config.endpoint_mut(network_mode.as_str()).aliases =
            opts.network_alias.clone();
    }

    Ok(networking_config)
}
