use crate::error::MtrError;
use serde::Serialize;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// IP version of a trace target. Decides the `-4`/`-6` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// The mtr flag restricting probes to this family.
    pub fn flag(self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "-4",
            AddressFamily::Ipv6 => "-6",
        }
    }
}

/// Address handed to mtr as the trace destination.
///
/// Only literal IPv4 and IPv6 addresses are accepted. Hostnames are rejected
/// at construction so no process is ever started for an unusable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Target(IpAddr);

impl Target {
    /// Parses and classifies a textual address.
    ///
    /// # Example
    ///
    /// ```
    /// use mtrext::target::{AddressFamily, Target};
    ///
    /// let target = Target::parse("2001:db8::1").unwrap();
    /// assert_eq!(target.family(), AddressFamily::Ipv6);
    /// assert!(Target::parse("not-an-ip").is_err());
    /// ```
    pub fn parse(addr: &str) -> Result<Self, MtrError> {
        IpAddr::from_str(addr)
            .map(Target)
            .map_err(|_| MtrError::InvalidTarget(addr.to_string()))
    }

    pub fn ip(&self) -> IpAddr {
        self.0
    }

    pub fn family(&self) -> AddressFamily {
        match self.0 {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }
}

impl FromStr for Target {
    type Err = MtrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::parse(s)
    }
}

impl From<IpAddr> for Target {
    fn from(ip: IpAddr) -> Self {
        Target(ip)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
