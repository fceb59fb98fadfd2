pub mod assemble;
pub mod config;
pub mod error;
pub mod host;
pub mod mount;
pub mod options;
pub mod opts;
pub mod parsers;
pub mod ports;
pub mod signal;
pub mod split;
pub mod units;

pub use assemble::parse;
pub use config::AssembledConfig;
pub use error::{ConfigError, Result};
pub use options::RawOptions;
