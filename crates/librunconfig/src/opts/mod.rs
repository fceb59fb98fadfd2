//! Collection of repeatable options: per-element validation, file backed
//! `key=value` lists and the typed device and ulimit lists.

pub mod blkio;
pub mod envfile;
pub mod list;
pub mod ulimit;
pub mod validators;

pub use blkio::{validate_throttle_bps_device, validate_throttle_iops_device, validate_weight_device};
pub use envfile::{parse_env_file, read_kv_strings};
pub use list::{ListOpts, Validator};
pub use ulimit::{parse_ulimit, UlimitOpts};
pub use validators::{validate_attach, validate_env, validate_sysctl};
