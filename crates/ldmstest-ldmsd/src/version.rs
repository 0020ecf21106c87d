//! ldmsd version detection.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::DaemonError;

static STRING_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"LDMSD_VERSION (\d+)\.(\d+)\.(\d+)").expect("valid version regex"));
static EXE_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"LDMSD Version: (\d+)\.(\d+)\.(\d+)").expect("valid version regex"));
static PLAIN_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)").expect("valid version regex"));

/// `major.minor.patch` of an ldmsd build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LdmsdVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl LdmsdVersion {
    /// First version driving samplers through `smplr_add`/`smplr_start`.
    pub const SMPLR_API: LdmsdVersion = LdmsdVersion::new(4, 100, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Find the version in `strings ldmsd` or `ldmsd -V` output.
    pub fn from_output(text: &str) -> Result<Self, DaemonError> {
        [&*STRING_VERSION_RE, &*EXE_VERSION_RE]
            .into_iter()
            .find_map(|re| re.captures(text))
            .and_then(|caps| Self::from_parts(&caps[1], &caps[2], &caps[3]))
            .ok_or_else(|| DaemonError::BadVersion(first_line(text).to_string()))
    }

    /// Versions before the 4.100 sampler API.
    pub fn is_v4(&self) -> bool {
        *self < Self::SMPLR_API
    }

    fn from_parts(major: &str, minor: &str, patch: &str) -> Option<Self> {
        Some(Self::new(major.parse().ok()?, minor.parse().ok()?, patch.parse().ok()?))
    }
}

impl Default for LdmsdVersion {
    fn default() -> Self {
        Self::SMPLR_API
    }
}

impl FromStr for LdmsdVersion {
    type Err = DaemonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PLAIN_VERSION_RE
            .captures(s.trim())
            .and_then(|caps| Self::from_parts(&caps[1], &caps[2], &caps[3]))
            .ok_or_else(|| DaemonError::BadVersion(s.to_string()))
    }
}

impl fmt::Display for LdmsdVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
