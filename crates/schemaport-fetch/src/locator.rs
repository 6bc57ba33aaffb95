//! Remote resource locators

use crate::fetcher::FetchError;
use std::fmt;

/// Default SFTP port when the locator carries none
const DEFAULT_SFTP_PORT: u16 = 22;

/// A parsed remote resource locator
///
/// Accepted form: `sftp://<host>[:<port>]<absolute path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    /// Remote host name or address
    pub host: String,

    /// Remote port
    pub port: u16,

    /// Absolute path on the remote host
    pub path: String,
}

impl Locator {
    /// Parse an `sftp://` locator
    ///
    /// Fails with `FetchError::InvalidLocator` when the scheme is wrong,
    /// the host is empty, the port is not a number, or the path is missing.
    pub fn parse(uri: &str) -> Result<Self, FetchError> {
        let rest = uri.strip_prefix("sftp://").ok_or_else(|| {
            FetchError::InvalidLocator(format!("expected sftp:// scheme in '{}'", uri))
        })?;

        // Authority ends at the first slash; the slash belongs to the path.
        let slash = rest.find('/').ok_or_else(|| {
            FetchError::InvalidLocator(format!("missing remote path in '{}'", uri))
        })?;
        let (authority, path) = rest.split_at(slash);

        if authority.is_empty() {
            return Err(FetchError::InvalidLocator(format!(
                "missing host in '{}'",
                uri
            )));
        }

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port_str)) => {
                let port = port_str.parse::<u16>().map_err(|_| {
                    FetchError::InvalidLocator(format!("invalid port '{}' in '{}'", port_str, uri))
                })?;
                (host, port)
            }
            None => (authority, DEFAULT_SFTP_PORT),
        };

        if host.is_empty() {
            return Err(FetchError::InvalidLocator(format!(
                "missing host in '{}'",
                uri
            )));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }

    /// Socket address string for connecting
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sftp://{}:{}{}", self.host, self.port, self.path)
    }
}
