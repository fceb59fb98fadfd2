use crate::error::{ConfigError, Result};

/// Parses a `--link` value of the form `name[:alias]`.
///
/// The legacy `/container/name:/container/alias` form is accepted too: the
/// leading slash is dropped from the name and the alias is the last path
/// component.
pub fn parse_link(val: &str) -> Result<(String, String)> {
    if val.is_empty() {
        return Err(ConfigError::invalid("link", val, "empty string specified for links"));
    }
    let parts: Vec<&str> = val.split(':').collect();
    let (name, alias) = match parts.as_slice() {
        &[name] => (name, name),
        &[name, alias] => match name.strip_prefix('/') {
            Some(name) => (name, alias.rsplit('/').next().unwrap_or(alias)),
            None => (name, alias),
        },
        _ => return Err(ConfigError::malformed("link", val)),
    };
    if name.is_empty() || alias.is_empty() {
        return Err(ConfigError::malformed("link", val));
    }
    Ok((name.to_owned(), alias.to_owned()))
}

/// Validates a `--link` value, returning it unchanged.
pub fn validate_link(val: &str) -> Result<String> {
    parse_link(val)?;
    Ok(val.to_owned())
}
