//! Port specifications used by `--publish` and `--expose`.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::IpAddr;

use serde::{Serialize, Serializer};

const DEFAULT_PROTO: &str = "tcp";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PortError {
    #[error("empty string specified for ports")]
    Empty,
    #[error("invalid port number: {0}")]
    InvalidNumber(String),
    #[error("invalid range specified for the port: {0}")]
    InvalidRange(String),
    #[error("invalid format to parse: {0} should match template ip:hostPort:containerPort")]
    InvalidFormat(String),
    #[error("invalid ip address: {0}")]
    InvalidIp(String),
    #[error("no port specified: {0}<empty>")]
    NoPort(String),
    #[error("invalid containerPort: {0}")]
    InvalidContainerPort(String),
    #[error("invalid hostPort: {0}")]
    InvalidHostPort(String),
    #[error("invalid ranges specified for container and host ports: {container} and {host}")]
    MismatchedRanges { container: String, host: String },
    #[error("invalid proto: {0}")]
    InvalidProto(String),
}

/// A container port (or port range) together with its protocol, rendered as
/// `80/tcp` or `8000-8010/udp`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port {
    port: String,
    proto: String,
}

impl Port {
    pub fn new(proto: &str, port: &str) -> Result<Self, PortError> {
        let (start, end) = parse_port_range(port)?;
        let port = if start == end {
            start.to_string()
        } else {
            format!("{start}-{end}")
        };
        Ok(Port {
            port,
            proto: proto.to_owned(),
        })
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.proto)
    }
}

impl Serialize for Port {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Host side of a published port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortBinding {
    #[serde(rename = "HostIp")]
    pub host_ip: String,
    pub host_port: String,
}

pub type PortSet = BTreeSet<Port>;
pub type PortMap = BTreeMap<Port, Vec<PortBinding>>;

/// Splits `port[/proto]`, defaulting the protocol to tcp.
pub fn split_proto_port(raw: &str) -> (&str, &str) {
    let mut parts = raw.splitn(2, '/');
    let port = parts.next().unwrap_or_default();
    if port.is_empty() {
        return ("", "");
    }
    match parts.next() {
        None | Some("") => (DEFAULT_PROTO, port),
        Some(proto) => (proto, port),
    }
}

fn parse_port_number(raw: &str) -> Result<u16, PortError> {
    raw.parse::<u16>()
        .map_err(|_| PortError::InvalidNumber(raw.to_owned()))
}

/// Parses `port` or `start-end` into an inclusive range.
pub fn parse_port_range(ports: &str) -> Result<(u16, u16), PortError> {
    if ports.is_empty() {
        return Err(PortError::Empty);
    }
    match ports.split_once('-') {
        None => {
            let port = parse_port_number(ports)?;
            Ok((port, port))
        }
        Some((start, end)) => {
            let start = parse_port_number(start)?;
            let end = parse_port_number(end)?;
            if end < start {
                return Err(PortError::InvalidRange(ports.to_owned()));
            }
            Ok((start, end))
        }
    }
}

fn validate_proto(proto: &str) -> bool {
    matches!(proto, "tcp" | "udp")
}

/// Parses `--publish` values of the form
/// `[[ip:][hostPort]:]containerPort[/proto]`, where both ports may be ranges.
///
/// Returns the exposed ports together with the host bindings of each.
pub fn parse_port_specs(specs: &[String]) -> Result<(PortSet, PortMap), PortError> {
    let mut exposed = PortSet::new();
    let mut bindings = PortMap::new();

    for spec in specs {
        let (raw, proto) = match spec.rfind('/') {
            Some(i) => (&spec[..i], &spec[i + 1..]),
            None => (spec.as_str(), DEFAULT_PROTO),
        };

        let parts: Vec<&str> = raw.split(':').collect();
        let (raw_ip, host_port, container_port) = match parts.as_slice() {
            [container] => ("", "", *container),
            [host, container] => ("", *host, *container),
            [ip, host, container] => (*ip, *host, *container),
            _ => return Err(PortError::InvalidFormat(raw.to_owned())),
        };

        if !raw_ip.is_empty() && raw_ip.parse::<IpAddr>().is_err() {
            return Err(PortError::InvalidIp(raw_ip.to_owned()));
        }
        if container_port.is_empty() {
            return Err(PortError::NoPort(raw.to_owned()));
        }

        let (start, end) = parse_port_range(container_port)
            .map_err(|_| PortError::InvalidContainerPort(container_port.to_owned()))?;

        let (host_start, host_end) = if host_port.is_empty() {
            (0, 0)
        } else {
            parse_port_range(host_port)
                .map_err(|_| PortError::InvalidHostPort(host_port.to_owned()))?
        };

        // a host range with a single container port is a pool to allocate from
        if !host_port.is_empty() && end - start != host_end - host_start && end != start {
            return Err(PortError::MismatchedRanges {
                container: container_port.to_owned(),
                host: host_port.to_owned(),
            });
        }

        let proto = proto.to_lowercase();
        if !validate_proto(&proto) {
            return Err(PortError::InvalidProto(proto));
        }

        for offset in 0..=(end - start) {
            let mut host = if host_port.is_empty() {
                String::new()
            } else {
                (host_start + offset).to_string()
            };
            if start == end && host_start != host_end {
                host = format!("{host}-{host_end}");
            }

            let port = Port::new(&proto, &(start + offset).to_string())?;
            exposed.insert(port.clone());
            bindings.entry(port).or_default().push(PortBinding {
                host_ip: raw_ip.to_owned(),
                host_port: host,
            });
        }
    }

    Ok((exposed, bindings))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;

    fn specs(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn binding(ip: &str, port: &str) -> PortBinding {
        PortBinding {
            host_ip: ip.to_owned(),
            host_port: port.to_owned(),
        }
    }

    #[test]
    fn test_split_proto_port() {
        assert_eq!(split_proto_port("80"), ("tcp", "80"));
        assert_eq!(split_proto_port("80/"), ("tcp", "80"));
        assert_eq!(split_proto_port("53/udp"), ("udp", "53"));
        assert_eq!(split_proto_port("8000-8010/udp"), ("udp", "8000-8010"));
        assert_eq!(split_proto_port(""), ("", ""));
        assert_eq!(split_proto_port("/udp"), ("", ""));
    }

    #[test]
    fn test_parse_port_range() {
        assert_eq!(parse_port_range("80"), Ok((80, 80)));
        assert_eq!(parse_port_range("8000-8010"), Ok((8000, 8010)));
        assert_eq!(parse_port_range(""), Err(PortError::Empty));
        assert_eq!(
            parse_port_range("8010-8000"),
            Err(PortError::InvalidRange("8010-8000".to_owned()))
        );
        assert!(parse_port_range("http").is_err());
        assert!(parse_port_range("70000").is_err());
        assert!(parse_port_range("1-2-3").is_err());
    }

    #[test]
    fn test_port_display() -> Result<()> {
        assert_eq!(Port::new("tcp", "80")?.to_string(), "80/tcp");
        assert_eq!(Port::new("udp", "1000-1002")?.to_string(), "1000-1002/udp");
        assert_eq!(Port::new("tcp", "5-5")?.to_string(), "5/tcp");
        Ok(())
    }

    #[test]
    fn test_parse_port_specs() -> Result<()> {
        let (exposed, bindings) =
            parse_port_specs(&specs(&["1234/tcp", "2345/udp", "127.0.0.1:8080:80"]))?;

        let tcp = Port::new("tcp", "1234")?;
        let udp = Port::new("udp", "2345")?;
        let http = Port::new("tcp", "80")?;
        assert_eq!(exposed.len(), 3);
        assert!(exposed.contains(&tcp) && exposed.contains(&udp) && exposed.contains(&http));
        assert_eq!(bindings[&tcp], vec![binding("", "")]);
        assert_eq!(bindings[&udp], vec![binding("", "")]);
        assert_eq!(bindings[&http], vec![binding("127.0.0.1", "8080")]);
        Ok(())
    }

    #[test]
    fn test_parse_port_specs_with_ranges() -> Result<()> {
        let (exposed, bindings) = parse_port_specs(&specs(&["8000-8001:9000-9001/udp"]))?;
        assert_eq!(exposed.len(), 2);
        assert_eq!(
            bindings[&Port::new("udp", "9000")?],
            vec![binding("", "8000")]
        );
        assert_eq!(
            bindings[&Port::new("udp", "9001")?],
            vec![binding("", "8001")]
        );

        // host range used as an allocation pool for a single container port
        let (_, bindings) = parse_port_specs(&specs(&["8000-8010:80"]))?;
        assert_eq!(
            bindings[&Port::new("tcp", "80")?],
            vec![binding("", "8000-8010")]
        );
        Ok(())
    }

    #[test]
    fn test_parse_port_specs_appends_bindings() -> Result<()> {
        let (exposed, bindings) = parse_port_specs(&specs(&["8080:80", "8081:80"]))?;
        assert_eq!(exposed.len(), 1);
        assert_eq!(
            bindings[&Port::new("tcp", "80")?],
            vec![binding("", "8080"), binding("", "8081")]
        );
        Ok(())
    }

    #[test]
    fn test_parse_port_specs_invalid() {
        let cases = vec![
            ("localhost:1234:80", PortError::InvalidIp("localhost".to_owned())),
            ("1:2:3:4", PortError::InvalidFormat("1:2:3:4".to_owned())),
            ("8080:", PortError::NoPort("8080:".to_owned())),
            ("abc", PortError::InvalidContainerPort("abc".to_owned())),
            ("abc:80", PortError::InvalidHostPort("abc".to_owned())),
            (
                "8000-8002:80-81",
                PortError::MismatchedRanges {
                    container: "80-81".to_owned(),
                    host: "8000-8002".to_owned(),
                },
            ),
            ("80/sctp", PortError::InvalidProto("sctp".to_owned())),
        ];
        for (spec, expected) in cases {
            assert_eq!(
                parse_port_specs(&specs(&[spec])),
                Err(expected),
                "parsing {spec}"
            );
        }
    }
}
