//! Host implementation backed by the real filesystem and environment
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::host::{Host, HostError, Result};

#[derive(Clone, Copy, Debug, Default)]
pub struct LinuxHost;

impl Host for LinuxHost {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        tracing::trace!(?path, "reading file");
        fs::read(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => HostError::NotFound(path.to_path_buf()),
            _ => HostError::Read {
                path: path.to_path_buf(),
                source: err,
            },
        })
    }

    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}
