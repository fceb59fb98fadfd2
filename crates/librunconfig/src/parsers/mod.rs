//! Parsers for the small colon and equals separated grammars of the
//! individual options. Each one is a pure function of its input text, apart
//! from the seccomp profile lookup which goes through [`crate::host::Host`].

pub mod address;
pub mod kv;
pub mod link;
pub mod path;
pub mod restart;
pub mod security;

pub use address::{validate_dns_search, validate_extra_host, validate_ip_address, validate_mac_address};
pub use kv::{convert_kv_strings_to_map, parse_logging_opts, parse_storage_opts};
pub use link::{parse_link, validate_link};
pub use path::{
    is_absolute, parse_device, parse_mount_spec, valid_device_mode, valid_volume_mode,
    validate_device, validate_volume, MountSpec,
};
pub use restart::parse_restart_policy;
pub use security::parse_security_opts;
