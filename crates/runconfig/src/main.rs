//! # runconfig
//! Translates `docker run` style flags into the container, host and network
//! configuration a container engine creates the container from, and prints
//! them as JSON.
mod observability;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{crate_version, Parser};
use librunconfig::host::create_host;
use librunconfig::RawOptions;

// Flags that configure the tool itself rather than the container
#[derive(Parser, Debug)]
pub struct GlobalOpts {
    /// set the log file to write runconfig logs to (default is '/dev/stderr')
    #[clap(long, overrides_with("log"))]
    pub log: Option<PathBuf>,
    /// change log level to debug, but the `log-level` flag takes precedence
    #[clap(long)]
    pub debug: bool,
    /// set the log format ('text' (default), or 'json') (default: "text")
    #[clap(long)]
    pub log_format: Option<String>,
    /// set the log level (default: 'error')
    #[clap(long)]
    pub log_level: Option<String>,
    /// print the configuration on a single line
    #[clap(long)]
    pub compact: bool,
}

#[derive(Parser, Debug)]
#[clap(version = crate_version!(), author = env!("CARGO_PKG_AUTHORS"))]
struct Opts {
    #[clap(flatten)]
    global: GlobalOpts,

    #[clap(flatten)]
    container: RawOptions,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    if let Err(e) = observability::init(&opts) {
        eprintln!("log init failed: {e:?}");
    }

    tracing::debug!(args = ?std::env::args_os().collect::<Vec<_>>(), "started");

    let host = create_host();
    let assembled = librunconfig::parse(&opts.container, host.as_ref())
        .with_context(|| format!("failed to parse options for image {}", opts.container.image))?;

    let json = if opts.global.compact {
        serde_json::to_string(&assembled)
    } else {
        serde_json::to_string_pretty(&assembled)
    }
    .context("failed to serialize configuration")?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").context("failed to write configuration")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_is_well_formed() {
        Opts::command().debug_assert();
    }

    #[test]
    fn test_parse_command_line() -> Result<()> {
        let opts = Opts::try_parse_from([
            "runconfig",
            "--log-level",
            "info",
            "--compact",
            "-l",
            "app=web",
            "-v",
            "/srv:/srv:ro",
            "nginx",
        ])?;
        assert_eq!(opts.global.log_level.as_deref(), Some("info"));
        assert!(opts.global.compact);
        assert_eq!(opts.container.label, vec!["app=web"]);
        assert_eq!(opts.container.volume, vec!["/srv:/srv:ro"]);
        assert_eq!(opts.container.image, "nginx");
        Ok(())
    }
}
