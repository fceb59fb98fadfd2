//! Mount option grammar shared with the code that performs the mounts.
use nix::mount::MsFlags;

/// Data options tmpfs understands, with or without a `=value` part.
const TMPFS_DATA_OPTIONS: &[&str] = &["size", "mode", "uid", "gid", "nr_inodes", "nr_blocks", "mpol"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MountOptionError {
    #[error("invalid tmpfs option {0:?}")]
    InvalidTmpfsOption(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountOptionConfig {
    /// Mount Flags.
    pub flags: MsFlags,

    /// Mount data applied to the mount.
    pub data: String,
}

fn option_flag(option: &str) -> Option<(bool, MsFlags)> {
    match option {
        "defaults" => Some((false, MsFlags::empty())),
        "ro" => Some((false, MsFlags::MS_RDONLY)),
        "rw" => Some((true, MsFlags::MS_RDONLY)),
        "suid" => Some((true, MsFlags::MS_NOSUID)),
        "nosuid" => Some((false, MsFlags::MS_NOSUID)),
        "dev" => Some((true, MsFlags::MS_NODEV)),
        "nodev" => Some((false, MsFlags::MS_NODEV)),
        "exec" => Some((true, MsFlags::MS_NOEXEC)),
        "noexec" => Some((false, MsFlags::MS_NOEXEC)),
        "sync" => Some((false, MsFlags::MS_SYNCHRONOUS)),
        "async" => Some((true, MsFlags::MS_SYNCHRONOUS)),
        "dirsync" => Some((false, MsFlags::MS_DIRSYNC)),
        "remount" => Some((false, MsFlags::MS_REMOUNT)),
        "mand" => Some((false, MsFlags::MS_MANDLOCK)),
        "nomand" => Some((true, MsFlags::MS_MANDLOCK)),
        "atime" => Some((true, MsFlags::MS_NOATIME)),
        "noatime" => Some((false, MsFlags::MS_NOATIME)),
        "diratime" => Some((true, MsFlags::MS_NODIRATIME)),
        "nodiratime" => Some((false, MsFlags::MS_NODIRATIME)),
        "bind" => Some((false, MsFlags::MS_BIND)),
        "rbind" => Some((false, MsFlags::MS_BIND | MsFlags::MS_REC)),
        "unbindable" => Some((false, MsFlags::MS_UNBINDABLE)),
        "runbindable" => Some((false, MsFlags::MS_UNBINDABLE | MsFlags::MS_REC)),
        "private" => Some((false, MsFlags::MS_PRIVATE)),
        "rprivate" => Some((false, MsFlags::MS_PRIVATE | MsFlags::MS_REC)),
        "shared" => Some((false, MsFlags::MS_SHARED)),
        "rshared" => Some((false, MsFlags::MS_SHARED | MsFlags::MS_REC)),
        "slave" => Some((false, MsFlags::MS_SLAVE)),
        "rslave" => Some((false, MsFlags::MS_SLAVE | MsFlags::MS_REC)),
        "relatime" => Some((false, MsFlags::MS_RELATIME)),
        "norelatime" => Some((true, MsFlags::MS_RELATIME)),
        "strictatime" => Some((false, MsFlags::MS_STRICTATIME)),
        "nostrictatime" => Some((true, MsFlags::MS_STRICTATIME)),
        _ => None,
    }
}

/// Splits a comma separated option string into mount flags and the data
/// string passed to the filesystem.
pub fn parse_options(options: &str) -> MountOptionConfig {
    let mut flags = MsFlags::empty();
    let mut data = Vec::new();

    for option in options.split(',') {
        match option_flag(option) {
            Some((true, flag)) => flags &= !flag,
            Some((false, flag)) => flags |= flag,
            None => data.push(option),
        }
    }

    MountOptionConfig {
        flags,
        data: data.join(","),
    }
}

/// Validates a `--tmpfs` option string. Anything that is not a mount flag
/// must be one of the data options tmpfs accepts.
pub fn parse_tmpfs_options(options: &str) -> Result<MountOptionConfig, MountOptionError> {
    let config = parse_options(options);
    for option in config.data.split(',') {
        let key = option.split_once('=').map_or(option, |(key, _)| key);
        if !key.is_empty() && !TMPFS_DATA_OPTIONS.contains(&key) {
            return Err(MountOptionError::InvalidTmpfsOption(option.to_owned()));
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let config = parse_options("ro,nosuid,size=64m,mode=1777");
        assert_eq!(
            config,
            MountOptionConfig {
                flags: MsFlags::MS_RDONLY | MsFlags::MS_NOSUID,
                data: "size=64m,mode=1777".to_owned(),
            }
        );

        let config = parse_options("ro,rw,exec");
        assert_eq!(config.flags, MsFlags::empty());
        assert_eq!(config.data, "");
    }

    #[test]
    fn test_parse_tmpfs_options() {
        assert!(parse_tmpfs_options("").is_ok());
        assert!(parse_tmpfs_options("rw,noexec,nosuid,size=65536k").is_ok());
        assert!(parse_tmpfs_options("uid=1000,gid=1000,mode=700,nr_inodes=1k,mpol=default").is_ok());

        assert_eq!(
            parse_tmpfs_options("rw,foo=bar"),
            Err(MountOptionError::InvalidTmpfsOption("foo=bar".to_owned()))
        );
        assert_eq!(
            parse_tmpfs_options("exec,bogus"),
            Err(MountOptionError::InvalidTmpfsOption("bogus".to_owned()))
        );
    }
}
