//! Validation of the `--stop-signal` value

use std::convert::TryFrom;

use nix::sys::signal::Signal as NixSignal;

/// POSIX Signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal(NixSignal);

#[derive(Debug, thiserror::Error)]
pub enum SignalError<T> {
    #[error("invalid signal: {0}")]
    InvalidSignal(T),
}

impl TryFrom<&str> for Signal {
    type Error = SignalError<String>;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let upper = s.to_ascii_uppercase();

        if let Ok(number) = upper.parse::<i32>() {
            return NixSignal::try_from(number)
                .map(Signal)
                .map_err(|_| SignalError::InvalidSignal(s.to_owned()));
        }

        let name = if upper.starts_with("SIG") {
            upper
        } else {
            format!("SIG{upper}")
        };
        // aliases nix does not know about
        let name = match name.as_str() {
            "SIGIOT" => "SIGABRT",
            "SIGCLD" => "SIGCHLD",
            "SIGPOLL" => "SIGIO",
            other => other,
        };

        name.parse::<NixSignal>()
            .map(Signal)
            .map_err(|_| SignalError::InvalidSignal(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use nix::sys::signal::Signal::*;

    use super::*;

    #[test]
    fn test_conversion_from_string() {
        let mut test_sets = HashMap::new();
        test_sets.insert(SIGHUP, vec!["1", "HUP", "SIGHUP", "hup"]);
        test_sets.insert(SIGINT, vec!["2", "INT", "SIGINT"]);
        test_sets.insert(SIGQUIT, vec!["3", "QUIT", "SIGQUIT"]);
        test_sets.insert(SIGABRT, vec!["6", "ABRT", "IOT", "SIGABRT", "SIGIOT"]);
        test_sets.insert(SIGKILL, vec!["9", "KILL", "SIGKILL", "sigkill"]);
        test_sets.insert(SIGUSR1, vec!["10", "USR1", "SIGUSR1"]);
        test_sets.insert(SIGUSR2, vec!["12", "USR2", "SIGUSR2"]);
        test_sets.insert(SIGTERM, vec!["15", "TERM", "SIGTERM", "term"]);
        test_sets.insert(SIGCHLD, vec!["17", "CHLD", "SIGCHLD", "CLD"]);
        test_sets.insert(SIGSTOP, vec!["19", "STOP", "SIGSTOP"]);
        test_sets.insert(SIGWINCH, vec!["28", "WINCH", "SIGWINCH"]);
        test_sets.insert(SIGIO, vec!["29", "IO", "SIGIO", "POLL"]);
        test_sets.insert(SIGPWR, vec!["30", "PWR", "SIGPWR"]);
        for (signal, strings) in test_sets {
            for s in strings {
                assert_eq!(Signal(signal), Signal::try_from(s).unwrap());
            }
        }
    }

    #[test]
    fn test_conversion_from_string_should_be_failed() {
        assert!(Signal::try_from("invalid").is_err());
        assert!(Signal::try_from("0").is_err());
        assert!(Signal::try_from("99").is_err());
        assert!(Signal::try_from("").is_err());
    }
}
