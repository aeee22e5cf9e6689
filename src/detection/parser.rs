//! Version output parsing with regex extraction.

use crate::ProbeError;
use regex::Regex;
use semver::Version;
use std::sync::OnceLock;

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("Invalid regex pattern"))
}

/// Parse a version from a tool's `--version` banner.
///
/// The first `major.minor[.patch]` group wins; a missing patch is read
/// as zero. Handles formats such as:
///
/// - `gcc (GCC) 13.2.0` -> 13.2.0
/// - `Docker version 24.0.7, build afdd53b` -> 24.0.7
/// - `GNU Make 4.3` -> 4.3.0
pub(crate) fn parse_version(output: &str) -> Result<Version, ProbeError> {
    let caps = version_regex()
        .captures(output)
        .ok_or(ProbeError::VersionParseFailed)?;

    let number = |idx: usize| -> Result<u64, ProbeError> {
        match caps.get(idx) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| ProbeError::VersionParseFailed),
            None => Ok(0),
        }
    };

    Ok(Version::new(number(1)?, number(2)?, number(3)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gcc_version() {
        let output = "gcc (GCC) 13.2.0\nCopyright (C) 2023 Free Software Foundation, Inc.";
        assert_eq!(parse_version(output).unwrap(), Version::new(13, 2, 0));
    }

    #[test]
    fn test_parse_apple_clang_gcc_shim() {
        let output = "Apple clang version 15.0.0 (clang-1500.3.9.4)";
        assert_eq!(parse_version(output).unwrap(), Version::new(15, 0, 0));
    }

    #[test]
    fn test_parse_docker_version() {
        let output = "Docker version 24.0.7, build afdd53b";
        assert_eq!(parse_version(output).unwrap(), Version::new(24, 0, 7));
    }

    #[test]
    fn test_parse_two_component_version() {
        let output = "GNU Make 4.3\nBuilt for x86_64-pc-linux-gnu";
        assert_eq!(parse_version(output).unwrap(), Version::new(4, 3, 0));
    }

    #[test]
    fn test_parse_version_no_match() {
        let result = parse_version("no version here");
        assert!(matches!(result, Err(ProbeError::VersionParseFailed)));
    }

    #[test]
    fn test_parse_version_overflow() {
        let result = parse_version("99999999999999999999999.1");
        assert!(matches!(result, Err(ProbeError::VersionParseFailed)));
    }
}
