use crate::ConfigError;
use std::{fmt, str::FromStr};

/// A single `host:port` entry of the `hosts` setting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostAddress {
    pub host: String,
    pub port: u16,
}

impl HostAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    /// The base URL of the HTTP API on this host.
    pub fn base_url(&self, use_ssl: bool) -> String {
        let scheme = if use_ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for HostAddress {
    type Err = ConfigError;

    /// Accepts exactly `<non-colon-text>:<digits>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidHost { host: s.to_owned() };

        let mut parts = s.split(':');
        let (host, port) = match (parts.next(), parts.next(), parts.next()) {
            (Some(host), Some(port), None) => (host, port),
            _ => return Err(invalid()),
        };

        if host.is_empty() || port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let port = port.parse::<u16>().map_err(|_| invalid())?;

        Ok(HostAddress::new(host, port))
    }
}

/// Validates every entry, failing on the first malformed one. Nothing here
/// touches the network.
pub fn parse_hosts<I, S>(hosts: I) -> Result<Vec<HostAddress>, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    hosts.into_iter().map(|host| host.as_ref().parse()).collect()
}
