//! Access to the few host resources option parsing depends on: files named
//! by `--env-file`, `--label-file` and `--security-opt seccomp=...`, and the
//! process environment used to complete bare `NAME` entries.

#[allow(clippy::module_inception)]
pub mod host;
pub mod linux;

pub use host::{create_host, Host, HostType};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("{0:?} does not exist")]
    NotFound(std::path::PathBuf),
    #[error("failed to read {path:?}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("{0:?} is not valid utf8")]
    InvalidUtf8(std::path::PathBuf),
}

type Result<T> = std::result::Result<T, HostError>;
