//! An interface trait so that the parsers can read files and environment
//! variables without caring where they come from
use std::path::Path;

use crate::host::linux::LinuxHost;
use crate::host::test::TestHelperHost;
use crate::host::{HostError, Result};

pub trait Host {
    /// Returns the whole content of the file at `path`.
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    /// Returns the lines of the file at `path`, without line terminators.
    fn read_lines(&self, path: &Path) -> Result<Vec<String>> {
        let content = self.read_bytes(path)?;
        let content =
            String::from_utf8(content).map_err(|_| HostError::InvalidUtf8(path.to_path_buf()))?;
        Ok(content.lines().map(str::to_owned).collect())
    }

    /// Looks up a variable of the calling process environment.
    fn env_var(&self, name: &str) -> Option<String>;
}

#[derive(Clone, Copy)]
pub enum HostType {
    Linux,
    Test,
}

impl Default for HostType {
    fn default() -> Self {
        if cfg!(test) {
            HostType::Test
        } else {
            HostType::Linux
        }
    }
}

impl HostType {
    pub fn create_host(&self) -> Box<dyn Host> {
        match self {
            HostType::Linux => Box::new(LinuxHost),
            HostType::Test => Box::<TestHelperHost>::default(),
        }
    }
}

pub fn create_host() -> Box<dyn Host> {
    HostType::default().create_host()
}
