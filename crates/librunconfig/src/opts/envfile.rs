//! `--env-file` and `--label-file` reading.
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::host::{Host, HostError};

const UTF8_BOM: char = '\u{feff}';
const WHITESPACE: [char; 2] = [' ', '\t'];

/// Reads `KEY=value` lines from the file at `path`.
///
/// Leading whitespace is trimmed, empty lines and `#` comments are skipped
/// and values are kept verbatim. A line holding only a name takes its value
/// from the environment of `host`, empty when the variable is not set.
pub fn parse_env_file(option: &'static str, path: &str, host: &dyn Host) -> Result<Vec<String>> {
    let lines = host.read_lines(Path::new(path)).map_err(|err| match err {
        HostError::InvalidUtf8(path) => ConfigError::MalformedFile {
            option,
            path,
            reason: "file contains invalid utf8 bytes".to_owned(),
        },
        source => ConfigError::ExternalResource {
            option,
            path: path.into(),
            source,
        },
    })?;

    let mut entries = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let line = if index == 0 {
            line.trim_start_matches(UTF8_BOM)
        } else {
            line.as_str()
        };
        let line = line.trim_start_matches(WHITESPACE);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (name, value) = match line.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (line, None),
        };
        if name.contains(WHITESPACE) {
            return Err(ConfigError::MalformedFile {
                option,
                path: path.into(),
                reason: format!("variable '{name}' has white spaces on line {}", index + 1),
            });
        }

        entries.push(match value {
            Some(value) => format!("{name}={value}"),
            None => {
                let value = host.env_var(name).unwrap_or_default();
                format!("{name}={value}")
            }
        });
    }

    tracing::trace!(option, path, count = entries.len(), "read key value file");
    Ok(entries)
}

/// Reads the given files, then appends the inline entries. Later entries win
/// when the result is folded into a map, so inline values override files.
pub fn read_kv_strings(
    option: &'static str,
    files: &[String],
    inline: Vec<String>,
    host: &dyn Host,
) -> Result<Vec<String>> {
    let mut entries = Vec::new();
    for file in files {
        entries.extend(parse_env_file(option, file, host)?);
    }
    entries.extend(inline);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::host::test::TestHelperHost;

    #[test]
    fn test_parse_env_file() -> Result<()> {
        let content = "\u{feff}# comment\n\n  FOO=bar\nBAZ= spaced value \nEMPTY=\n\tPASSED\nUNSET\nURL=a=b\n";
        let host = TestHelperHost::default()
            .with_file("/env", content)
            .with_env("PASSED", "through");

        assert_eq!(
            parse_env_file("env-file", "/env", &host)?,
            vec![
                "FOO=bar",
                "BAZ= spaced value ",
                "EMPTY=",
                "PASSED=through",
                "UNSET=",
                "URL=a=b",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_parse_env_file_errors() {
        let host = TestHelperHost::default()
            .with_file("/spaces", "f  =  b\n")
            .with_file("/binary", vec![0x46, 0x3d, 0xff, 0xfe]);

        assert!(matches!(
            parse_env_file("env-file", "/missing", &host),
            Err(ConfigError::ExternalResource { option: "env-file", .. })
        ));
        assert!(matches!(
            parse_env_file("env-file", "/spaces", &host),
            Err(ConfigError::MalformedFile { option: "env-file", .. })
        ));
        assert!(matches!(
            parse_env_file("label-file", "/binary", &host),
            Err(ConfigError::MalformedFile { option: "label-file", .. })
        ));
    }

    #[test]
    fn test_read_kv_strings_appends_inline_last() -> Result<()> {
        let host = TestHelperHost::default()
            .with_file("/a", "A=1\nB=1\n")
            .with_file("/b", "B=2\n");
        let entries = read_kv_strings(
            "env-file",
            &["/a".to_owned(), "/b".to_owned()],
            vec!["A=3".to_owned()],
            &host,
        )?;
        assert_eq!(entries, vec!["A=1", "B=1", "B=2", "A=3"]);
        Ok(())
    }
}
