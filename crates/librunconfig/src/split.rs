//! Splitting of colon separated volume specifications.

/// Splits `raw` into at most `n` parts separated by a separator colon.
///
/// A colon is *not* a separator when it follows a single letter which is
/// itself preceded by `:` or `\` (or starts the string): that is a drive
/// letter such as `C:` or the `\\?\C:` form. A `/` before the letter does not
/// protect it, so `/tmp/q:/foo` still splits. This allows strings such as
/// `C:\foo:D:\:rw` and `/tmp/q:/foo` to be split correctly.
///
/// Once `n` parts are closed, the rest of `raw`, starting at the colon that
/// closed the last part, is appended to that part without further parsing.
///
/// Returns `None` when `raw` is empty or starts with a colon.
pub fn volume_split_n(raw: &str, n: usize) -> Option<Vec<&str>> {
    let bytes = raw.as_bytes();
    if bytes.is_empty() || bytes[0] == b':' {
        return None;
    }
    if n == 0 {
        return Some(Vec::new());
    }

    let mut parts = Vec::with_capacity(n);
    // start of the part currently being scanned
    let mut left = 0;
    // start of the most recently closed part
    let mut last_start = 0;

    // index 0 was checked above, it can never be a separator
    for right in 1..bytes.len() {
        if parts.len() >= n {
            break;
        }
        if bytes[right] != b':' {
            continue;
        }

        let is_separator = if bytes[right - 1].is_ascii_alphabetic() {
            // `C:` at the very beginning is a drive letter
            right > 1 && !matches!(bytes[right - 2], b':' | b'\\')
        } else {
            true
        };

        if is_separator {
            parts.push(&raw[left..right]);
            last_start = left;
            left = right + 1;
        }
    }

    if left < bytes.len() {
        if parts.len() >= n {
            parts[n - 1] = &raw[last_start..];
        } else {
            parts.push(&raw[left..]);
        }
    }

    Some(parts)
}

#[cfg(test)]
mod tests {
    use quickcheck::{quickcheck, TestResult};

    use super::*;

    #[test]
    fn test_volume_split_n() {
        let cases: Vec<(&str, usize, Option<Vec<&str>>)> = vec![
            (r"C:\foo:D:\bar:rw", 3, Some(vec![r"C:\foo", r"D:\bar", "rw"])),
            ("/tmp/q:/foo", 2, Some(vec!["/tmp/q", "/foo"])),
            ("/tmp/q:/foo", 1, Some(vec!["/tmp/q:/foo"])),
            (r"C:\foo:D:\:rw", 3, Some(vec![r"C:\foo", r"D:\", "rw"])),
            (r"C:\", 2, Some(vec![r"C:\"])),
            ("c:", 2, Some(vec!["c:"])),
            ("/data", 2, Some(vec!["/data"])),
            ("name:/data:ro", 2, Some(vec!["name", "/data:ro"])),
            ("name:/data:ro", 3, Some(vec!["name", "/data", "ro"])),
            (r"\\?\C:\Windows:/data", 2, Some(vec![r"\\?\C:\Windows", "/data"])),
            ("/path/c:/foo", 2, Some(vec!["/path/c", "/foo"])),
            ("ab:", 2, Some(vec!["ab"])),
            ("a:", 2, Some(vec!["a:"])),
            ("", 2, None),
            (":/foo", 2, None),
        ];

        for (raw, n, expected) in cases {
            assert_eq!(volume_split_n(raw, n), expected, "splitting {raw:?} in {n}");
        }
    }

    #[test]
    fn test_volume_split_n_keeps_remainder_verbatim() {
        assert_eq!(
            volume_split_n("/a:/b:/c:/d", 2),
            Some(vec!["/a", "/b:/c:/d"])
        );
    }

    quickcheck! {
        fn prop_parts_are_bounded(raw: String, n: u8) -> TestResult {
            let n = n as usize % 5 + 1;
            match volume_split_n(&raw, n) {
                None => TestResult::from_bool(raw.is_empty() || raw.starts_with(':')),
                Some(parts) => TestResult::from_bool(!parts.is_empty() && parts.len() <= n),
            }
        }

        fn prop_parts_rejoin_to_input(raw: String, n: u8) -> TestResult {
            let n = n as usize % 5 + 1;
            let Some(parts) = volume_split_n(&raw, n) else {
                return TestResult::discard();
            };
            let joined = parts.join(":");
            TestResult::from_bool(joined == raw || format!("{joined}:") == raw)
        }

        fn prop_colon_free_input_is_one_part(raw: String) -> TestResult {
            if raw.is_empty() || raw.contains(':') {
                return TestResult::discard();
            }
            TestResult::from_bool(volume_split_n(&raw, 3) == Some(vec![raw.as_str()]))
        }
    }
}
