use anyhow::Result;
use librunconfig::host::test::TestHelperHost;
use librunconfig::parsers::convert_kv_strings_to_map;
use librunconfig::{parse, ConfigError, RawOptions};
use quickcheck::{quickcheck, TestResult};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn options() -> RawOptions {
    RawOptions {
        image: "ubuntu:22.04".to_owned(),
        ..Default::default()
    }
}

fn full_options() -> RawOptions {
    RawOptions {
        attach: strings(&["stdin", "STDOUT"]),
        interactive: true,
        tty: true,
        env: strings(&["A=inline", "HOME"]),
        env_file: strings(&["/etc/app.env"]),
        label: strings(&["tier=web"]),
        label_file: strings(&["/etc/app.labels"]),
        volume: strings(&["/var/lib/data", "/srv:/srv:ro", "logs:/var/log"]),
        tmpfs: strings(&["/run:rw,size=64m"]),
        publish: strings(&["127.0.0.1:8080:80", "53:53/udp"]),
        expose: strings(&["9000-9001"]),
        device: strings(&["/dev/fuse"]),
        memory: "1g".to_owned(),
        memory_swap: "-1".to_owned(),
        memory_swappiness: Some(10),
        ulimit: strings(&["nofile=1024:2048"]),
        sysctl: strings(&["net.core.somaxconn=1024"]),
        restart: "on-failure:3".to_owned(),
        security_opt: strings(&["seccomp=/etc/seccomp.json", "no-new-privileges"]),
        storage_opt: strings(&["size=10G"]),
        log_driver: "json-file".to_owned(),
        log_opt: strings(&["max-size=10m"]),
        health_cmd: "curl -f http://localhost/".to_owned(),
        health_retries: 3,
        stop_signal: Some("SIGINT".to_owned()),
        network: Some("backend".to_owned()),
        ip: "10.0.0.5".to_owned(),
        link: strings(&["db:database"]),
        network_alias: strings(&["web"]),
        dns: strings(&["8.8.8.8"]),
        args: strings(&["nginx", "-g", "daemon off;"]),
        ..options()
    }
}

fn host() -> TestHelperHost {
    TestHelperHost::default()
        .with_file("/etc/app.env", "# defaults\nA=file\nB=file\n")
        .with_file("/etc/app.labels", "tier=db\nowner=ops\n")
        .with_file("/etc/seccomp.json", "{\n  \"defaultAction\": \"SCMP_ACT_ALLOW\"\n}\n")
        .with_env("HOME", "/root")
}

#[test]
fn test_parse_full_options() -> Result<()> {
    let assembled = parse(&full_options(), &host())?;
    let config = &assembled.config;
    let host_config = &assembled.host_config;

    assert!(config.attach_stdin && config.attach_stdout && !config.attach_stderr);
    assert!(config.open_stdin && config.stdin_once && config.tty);
    assert_eq!(
        config.env,
        vec!["A=file", "B=file", "A=inline", "HOME=/root"]
    );
    assert_eq!(config.labels["tier"], "web");
    assert_eq!(config.labels["owner"], "ops");
    assert_eq!(config.cmd, Some(strings(&["nginx", "-g", "daemon off;"])));
    assert_eq!(config.stop_signal.as_deref(), Some("SIGINT"));
    assert_eq!(
        config.healthcheck.as_ref().map(|health| health.test.clone()),
        Some(strings(&["CMD-SHELL", "curl -f http://localhost/"]))
    );

    let exposed: Vec<String> = config.exposed_ports.iter().map(|p| p.to_string()).collect();
    assert_eq!(exposed, vec!["53/udp", "80/tcp", "9000/tcp", "9001/tcp"]);

    assert_eq!(host_config.resources.memory, 1024 * 1024 * 1024);
    assert_eq!(host_config.resources.memory_swap, -1);
    assert_eq!(host_config.resources.memory_swappiness, Some(10));
    assert_eq!(host_config.resources.devices[0].cgroup_permissions, "rwm");
    assert_eq!(host_config.resources.ulimits[0].hard, 2048);
    assert_eq!(host_config.restart_policy.maximum_retry_count, 3);
    assert_eq!(
        host_config.security_opt,
        vec![
            r#"seccomp={"defaultAction":"SCMP_ACT_ALLOW"}"#,
            "no-new-privileges"
        ]
    );
    assert_eq!(host_config.storage_opt["size"], "10G");
    assert_eq!(host_config.log_config.config["max-size"], "10m");
    assert_eq!(host_config.tmpfs["/run"], "rw,size=64m");
    assert_eq!(host_config.sysctls["net.core.somaxconn"], "1024");
    assert_eq!(host_config.dns, vec!["8.8.8.8"]);
    assert!(host_config.dns_search.is_empty());

    let endpoint = &assembled.networking_config.endpoints_config["backend"];
    assert_eq!(endpoint.links, vec!["db:database"]);
    assert_eq!(endpoint.aliases, vec!["web"]);
    Ok(())
}

#[test]
fn test_parse_is_idempotent() -> Result<()> {
    let opts = full_options();
    let host = host();
    assert_eq!(parse(&opts, &host)?, parse(&opts, &host)?);
    Ok(())
}

#[test]
fn test_volumes_with_source_become_binds() -> Result<()> {
    let assembled = parse(&full_options(), &host())?;
    let volumes: Vec<&String> = assembled.config.volumes.iter().collect();
    assert_eq!(volumes, vec!["/var/lib/data"]);
    assert_eq!(
        assembled.host_config.binds,
        vec!["/srv:/srv:ro", "logs:/var/log"]
    );
    Ok(())
}

#[test]
fn test_inline_env_overrides_env_file_when_folded() -> Result<()> {
    let assembled = parse(&full_options(), &host())?;
    // the list keeps every entry in order, consumers fold it last write wins
    let env = convert_kv_strings_to_map(&assembled.config.env);
    assert_eq!(env["A"], "inline");
    assert_eq!(env["B"], "file");
    assert_eq!(env["HOME"], "/root");
    assert_eq!(env.len(), 3);
    Ok(())
}

#[test]
fn test_health_options_conflict_with_no_healthcheck() {
    let opts = RawOptions {
        no_healthcheck: true,
        health_cmd: "true".to_owned(),
        ..options()
    };
    assert!(matches!(
        parse(&opts, &TestHelperHost::default()),
        Err(ConfigError::Conflict { option: "no-healthcheck", .. })
    ));
}

#[test]
fn test_missing_env_file() {
    let opts = RawOptions {
        env_file: strings(&["/does/not/exist"]),
        ..options()
    };
    assert!(matches!(
        parse(&opts, &TestHelperHost::default()),
        Err(ConfigError::ExternalResource { option: "env-file", .. })
    ));
}

#[test]
fn test_first_error_wins() {
    // both the device and the restart policy are invalid, devices are
    // checked first
    let opts = RawOptions {
        device: strings(&["/dev/sda:relative"]),
        restart: "always:1".to_owned(),
        ..options()
    };
    let err = parse(&opts, &TestHelperHost::default()).expect_err("device is invalid");
    assert_eq!(err.option(), "device");
}

#[test]
fn test_serialized_field_names() -> Result<()> {
    let assembled = parse(&full_options(), &host())?;
    let json = serde_json::to_value(&assembled)?;

    assert_eq!(json["Config"]["Image"], "ubuntu:22.04");
    assert_eq!(json["Config"]["StopSignal"], "SIGINT");
    assert!(json["Config"]["ExposedPorts"]["80/tcp"].is_object());
    assert_eq!(json["Config"]["Healthcheck"]["Retries"], 3);
    assert_eq!(json["HostConfig"]["Memory"], 1024 * 1024 * 1024);
    assert_eq!(json["HostConfig"]["RestartPolicy"]["Name"], "on-failure");
    assert_eq!(json["HostConfig"]["LogConfig"]["Type"], "json-file");
    assert_eq!(
        json["HostConfig"]["PortBindings"]["80/tcp"][0]["HostIp"],
        "127.0.0.1"
    );
    assert_eq!(json["HostConfig"]["DnsSearch"], serde_json::json!([]));
    assert_eq!(
        json["NetworkingConfig"]["EndpointsConfig"]["backend"]["IPAMConfig"]["IPv4Address"],
        "10.0.0.5"
    );
    Ok(())
}

quickcheck! {
    fn prop_parse_is_deterministic(env: Vec<String>, volumes: Vec<String>) -> TestResult {
        let opts = RawOptions {
            env,
            volume: volumes,
            ..options()
        };
        let host = TestHelperHost::default();
        match (parse(&opts, &host), parse(&opts, &host)) {
            (Ok(first), Ok(second)) => TestResult::from_bool(first == second),
            (Err(first), Err(second)) => TestResult::from_bool(first.to_string() == second.to_string()),
            _ => TestResult::failed(),
        }
    }
}
