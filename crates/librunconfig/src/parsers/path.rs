//! `[source:]destination[:mode]` specifications of `--device` and `--volume`.
use std::path::{Component, Path, PathBuf};

use crate::config::DeviceMapping;
use crate::error::{ConfigError, Result};
use crate::split::volume_split_n;

/// Permission letters a device cgroup rule may hold: read, write and mknod.
pub const DEVICE_MODES: [char; 3] = ['r', 'w', 'm'];

/// Permissions granted when a device is mapped without a mode.
pub const DEFAULT_DEVICE_PERMISSIONS: &str = "rwm";

const VOLUME_ACCESS_MODES: [&str; 2] = ["rw", "ro"];
const VOLUME_LABEL_MODES: [&str; 2] = ["z", "Z"];
const VOLUME_PROPAGATION_MODES: [&str; 6] =
    ["shared", "rshared", "slave", "rslave", "private", "rprivate"];
const VOLUME_COPY_MODES: [&str; 1] = ["nocopy"];

/// Decides whether a trailing field is a mode or a path.
pub type ModeValidator = fn(&str) -> bool;

/// A parsed `[source:]destination[:mode]` specification.
///
/// `source` is only set when the value named one, even if it equals the
/// destination: `/data:/data` is a bind, `/data` is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec {
    pub source: Option<String>,
    pub destination: String,
    pub mode: Option<String>,
}

impl MountSpec {
    /// Renders the specification back with a cleaned destination path.
    pub fn to_spec_string(&self) -> String {
        let mut spec = match &self.source {
            Some(source) => format!("{}:{}", source, self.destination),
            None => self.destination.clone(),
        };
        if let Some(mode) = &self.mode {
            spec.push(':');
            spec.push_str(mode);
        }
        spec
    }

    /// Host side of the mapping, the destination itself when no source was given.
    pub fn source_or_destination(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.destination)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Splitter {
    /// Every colon separates, at most three fields.
    Plain,
    /// Drive letter colons are kept, see [`volume_split_n`].
    Volume,
}

/// A mode made of `r`, `w` and `m`, each at most once.
pub fn valid_device_mode(mode: &str) -> bool {
    if mode.is_empty() {
        return false;
    }
    let mut seen = Vec::with_capacity(DEVICE_MODES.len());
    for c in mode.chars() {
        if !DEVICE_MODES.contains(&c) || seen.contains(&c) {
            return false;
        }
        seen.push(c);
    }
    true
}

/// A comma separated volume mode with at most one access mode, one relabel
/// mode, one propagation mode and `nocopy`.
pub fn valid_volume_mode(mode: &str) -> bool {
    if mode.is_empty() {
        return false;
    }
    let groups: [&[&str]; 4] = [
        &VOLUME_ACCESS_MODES,
        &VOLUME_LABEL_MODES,
        &VOLUME_PROPAGATION_MODES,
        &VOLUME_COPY_MODES,
    ];
    let mut used = [false; 4];
    for option in mode.split(',') {
        let Some(group) = groups.iter().position(|group| group.contains(&option)) else {
            return false;
        };
        if used[group] {
            return false;
        }
        used[group] = true;
    }
    true
}

/// An absolute POSIX path, or an absolute Windows path such as `C:\data`.
pub fn is_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/')
        || (bytes.len() >= 3
            && bytes[0].is_ascii_alphabetic()
            && bytes[1] == b':'
            && matches!(bytes[2], b'\\' | b'/'))
}

/// Lexically cleans a POSIX path: repeated separators, `.` and `..` are
/// resolved without touching the filesystem.
fn clean_path(path: &str) -> String {
    if !path.starts_with('/') {
        return path.to_owned();
    }
    let mut cleaned = PathBuf::from("/");
    for component in Path::new(path).components() {
        match component {
            Component::ParentDir => {
                cleaned.pop();
            }
            Component::Normal(c) => cleaned.push(c),
            Component::RootDir | Component::CurDir | Component::Prefix(..) => {}
        }
    }
    cleaned.to_string_lossy().into_owned()
}

fn split_spec<'a>(option: &'static str, val: &'a str, splitter: Splitter) -> Result<Vec<&'a str>> {
    match splitter {
        Splitter::Plain => {
            if val.matches(':').count() > 2 {
                return Err(ConfigError::malformed(option, val));
            }
            Ok(val.splitn(3, ':').collect())
        }
        Splitter::Volume => {
            volume_split_n(val, 3).ok_or_else(|| ConfigError::malformed(option, val))
        }
    }
}

fn validate_path(
    option: &'static str,
    val: &str,
    validator: ModeValidator,
    splitter: Splitter,
) -> Result<MountSpec> {
    let fields = split_spec(option, val, splitter)?;
    if fields.first().map_or(true, |source| source.is_empty()) {
        return Err(ConfigError::malformed(option, val));
    }

    let (source, destination, mode) = match fields.as_slice() {
        [destination] => (None, *destination, None),
        [destination, second] if validator(second) => (None, *destination, Some(*second)),
        [source, destination] => (Some(*source), *destination, None),
        [source, destination, mode] => {
            if !validator(mode) {
                return Err(ConfigError::invalid(option, val, format!("bad mode specified: {mode}")));
            }
            (Some(*source), *destination, Some(*mode))
        }
        _ => return Err(ConfigError::malformed(option, val)),
    };

    if !is_absolute(destination) {
        return Err(ConfigError::invalid(
            option,
            val,
            format!("{destination} is not an absolute path"),
        ));
    }

    tracing::trace!(option, ?source, destination, ?mode, "parsed path specification");
    Ok(MountSpec {
        source: source.map(str::to_owned),
        destination: clean_path(destination),
        mode: mode.map(str::to_owned),
    })
}

/// Validates a `--device` value of the form `host[:container][:mode]`.
pub fn validate_device(val: &str) -> Result<String> {
    validate_path("device", val, valid_device_mode, Splitter::Plain).map(|spec| spec.to_spec_string())
}

/// Validates a `--volume` value of the form `[source:]destination[:mode]`.
pub fn validate_volume(val: &str) -> Result<String> {
    validate_path("volume", val, valid_volume_mode, Splitter::Volume).map(|spec| spec.to_spec_string())
}

/// Parses a `--volume` value into its parts.
pub fn parse_mount_spec(val: &str) -> Result<MountSpec> {
    validate_path("volume", val, valid_volume_mode, Splitter::Volume)
}

/// Parses a `--device` value into a device mapping. The container path
/// defaults to the host path and the permissions to `rwm`.
pub fn parse_device(device: &str) -> Result<DeviceMapping> {
    let spec = validate_path("device", device, valid_device_mode, Splitter::Plain)?;
    Ok(DeviceMapping {
        path_on_host: spec.source_or_destination().to_owned(),
        path_in_container: spec.destination,
        cgroup_permissions: spec
            .mode
            .unwrap_or_else(|| DEFAULT_DEVICE_PERMISSIONS.to_owned()),
    })
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;

    fn device(host: &str, container: &str, permissions: &str) -> DeviceMapping {
        DeviceMapping {
            path_on_host: host.to_owned(),
            path_in_container: container.to_owned(),
            cgroup_permissions: permissions.to_owned(),
        }
    }

    #[test]
    fn test_parse_device() -> Result<()> {
        let cases = vec![
            ("/dev/snd", device("/dev/snd", "/dev/snd", "rwm")),
            ("/dev/snd:rw", device("/dev/snd", "/dev/snd", "rw")),
            ("/dev/snd:/something", device("/dev/snd", "/something", "rwm")),
            ("/dev/snd:/something:rw", device("/dev/snd", "/something", "rw")),
            ("/dev/snd:/something:m", device("/dev/snd", "/something", "m")),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_device(input)?, expected, "parsing {input}");
        }
        Ok(())
    }

    #[test]
    fn test_parse_device_invalid() {
        for input in [
            "",
            ":/dev/snd",
            "/dev/snd:relative",
            "/dev/snd:/something:rwx",
            "/dev/snd:/something:rr",
            "/dev/snd:/something:rw:extra",
        ] {
            assert!(parse_device(input).is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn test_valid_device_mode() {
        for mode in ["r", "w", "m", "rw", "wr", "rwm", "mrw"] {
            assert!(valid_device_mode(mode), "{mode} should be valid");
        }
        for mode in ["", "a", "rwa", "rr", "rwmr", "RW"] {
            assert!(!valid_device_mode(mode), "{mode} should be invalid");
        }
    }

    #[test]
    fn test_valid_volume_mode() {
        for mode in ["rw", "ro", "z", "Z", "ro,Z", "rw,shared,nocopy", "rslave"] {
            assert!(valid_volume_mode(mode), "{mode} should be valid");
        }
        for mode in ["", "rw,ro", "z,Z", "shared,slave", "bogus", "ro,", "/data"] {
            assert!(!valid_volume_mode(mode), "{mode} should be invalid");
        }
    }

    #[test]
    fn test_validate_device() -> Result<()> {
        assert_eq!(validate_device("/dev/sda")?, "/dev/sda");
        assert_eq!(validate_device("/dev/sda/")?, "/dev/sda");
        assert_eq!(validate_device("/dev/sda:rw")?, "/dev/sda:rw");
        assert_eq!(validate_device("/dev/sda:/dev/xvdc/../xvdd")?, "/dev/sda:/dev/xvdd");
        assert_eq!(validate_device("/dev/sda:/dev/xvdc:rwm")?, "/dev/sda:/dev/xvdc:rwm");
        Ok(())
    }

    #[test]
    fn test_validate_volume() -> Result<()> {
        assert_eq!(validate_volume("/data")?, "/data");
        assert_eq!(validate_volume("/data:ro")?, "/data:ro");
        assert_eq!(validate_volume("cache:/data//x/")?, "cache:/data/x");
        assert_eq!(validate_volume("/host:/data:rw,Z")?, "/host:/data:rw,Z");
        assert_eq!(
            validate_volume(r"C:\host:D:\data:ro")?,
            r"C:\host:D:\data:ro"
        );

        assert!(validate_volume("").is_err());
        assert!(validate_volume(":/data").is_err());
        assert!(validate_volume("/host:data").is_err());
        assert!(validate_volume("/host:/data:rx").is_err());
        Ok(())
    }

    #[test]
    fn test_validate_volume_keeps_source_equal_to_destination() -> Result<()> {
        assert_eq!(validate_volume("/data:/data")?, "/data:/data");
        assert_eq!(validate_volume("/srv:/srv:ro")?, "/srv:/srv:ro");
        assert_eq!(validate_volume("/srv:/srv/:ro")?, "/srv:/srv:ro");
        assert_eq!(validate_device("/dev/sda:/dev/sda")?, "/dev/sda:/dev/sda");
        assert_eq!(
            parse_device("/dev/sda:/dev/sda:r")?,
            device("/dev/sda", "/dev/sda", "r")
        );
        Ok(())
    }

    #[test]
    fn test_parse_mount_spec() -> Result<()> {
        assert_eq!(
            parse_mount_spec(r"C:\foo:D:\bar:rw")?,
            MountSpec {
                source: Some(r"C:\foo".to_owned()),
                destination: r"D:\bar".to_owned(),
                mode: Some("rw".to_owned()),
            }
        );
        assert_eq!(
            parse_mount_spec("/tmp/q:/foo")?,
            MountSpec {
                source: Some("/tmp/q".to_owned()),
                destination: "/foo".to_owned(),
                mode: None,
            }
        );
        assert_eq!(
            parse_mount_spec("/data:ro")?,
            MountSpec {
                source: None,
                destination: "/data".to_owned(),
                mode: Some("ro".to_owned()),
            }
        );
        Ok(())
    }

    #[test]
    fn test_is_absolute() {
        for path in ["/", "/data", r"C:\data", "c:/data"] {
            assert!(is_absolute(path), "{path}");
        }
        for path in ["", "data", "./data", "C:", "C:data", r"\data"] {
            assert!(!is_absolute(path), "{path}");
        }
    }
}
