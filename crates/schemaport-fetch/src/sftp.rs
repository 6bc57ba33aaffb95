//! SFTP fetcher built on libssh2
//!
//! The blocking ssh2 handshake and transfer run on the tokio blocking pool;
//! the whole operation is bounded by the configured timeouts and timeout
//! expiry is reported as a connection failure.

use crate::fetcher::{Credentials, FetchError, FetchedResource, RemoteFetcher};
use crate::locator::Locator;
use schemaport_core::SftpConfig;
use ssh2::{ErrorCode, Session};
use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

/// SFTP error code for a missing remote path (LIBSSH2_FX_NO_SUCH_FILE)
const SFTP_NO_SUCH_FILE: i32 = 2;

/// SFTP error code for permission denied (LIBSSH2_FX_PERMISSION_DENIED)
const SFTP_PERMISSION_DENIED: i32 = 3;

/// Fetcher that retrieves files over SFTP with password authentication
///
/// One TCP session is opened per call and torn down on every exit path;
/// the fetcher itself holds no connection state.
#[derive(Debug, Clone)]
pub struct SftpFetcher {
    credentials: Credentials,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl SftpFetcher {
    /// Create a fetcher with default timeouts (30s connect, 60s read)
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
        }
    }

    /// Create a fetcher from config; fails when credentials are incomplete
    pub fn from_config(config: &SftpConfig) -> Result<Self, FetchError> {
        let username = config
            .username
            .clone()
            .ok_or_else(|| FetchError::Auth("no SFTP username configured".to_string()))?;
        let password = config
            .password
            .clone()
            .ok_or_else(|| FetchError::Auth("no SFTP password configured".to_string()))?;

        Ok(Self::new(Credentials::new(username, password))
            .with_connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .with_read_timeout(Duration::from_secs(config.read_timeout_secs)))
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Open a session and authenticate; blocking
    fn open_session(&self, locator: &Locator) -> Result<Session, FetchError> {
        let addr = locator
            .address()
            .to_socket_addrs()
            .map_err(|e| FetchError::Connection(format!("cannot resolve {}: {}", locator.address(), e)))?
            .next()
            .ok_or_else(|| {
                FetchError::Connection(format!("no address found for {}", locator.address()))
            })?;

        let tcp = TcpStream::connect_timeout(&addr, self.connect_timeout)
            .map_err(|e| FetchError::Connection(format!("{}: {}", locator.address(), e)))?;

        let mut session = Session::new()
            .map_err(|e| FetchError::Connection(format!("session init failed: {}", e)))?;
        // Bounds every subsequent blocking libssh2 call
        session.set_timeout(session_timeout_ms(self.read_timeout));
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| FetchError::Connection(format!("handshake with {}: {}", locator.host, e)))?;

        session
            .userauth_password(&self.credentials.username, &self.credentials.password)
            .map_err(|e| {
                FetchError::Auth(format!(
                    "password authentication failed for '{}': {}",
                    self.credentials.username, e
                ))
            })?;

        if !session.authenticated() {
            return Err(FetchError::Auth(format!(
                "password rejected for '{}'",
                self.credentials.username
            )));
        }

        Ok(session)
    }

    /// Download the remote file; blocking
    fn fetch_blocking(&self, locator: &Locator) -> Result<FetchedResource, FetchError> {
        let session = self.open_session(locator)?;

        let sftp = session
            .sftp()
            .map_err(|e| FetchError::Connection(format!("sftp channel failed: {}", e)))?;

        let mut file = sftp
            .open(Path::new(&locator.path))
            .map_err(|e| map_sftp_error(e, &locator.path))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| FetchError::Io(format!("reading {}: {}", locator.path, e)))?;

        // Session and channel close on drop, whichever path got us here.
        Ok(FetchedResource {
            bytes,
            path: locator.path.clone(),
        })
    }

    /// Total budget for one remote operation
    fn deadline(&self) -> Duration {
        self.connect_timeout + self.read_timeout
    }
}

/// Milliseconds for libssh2's session timeout, saturating at u32::MAX
fn session_timeout_ms(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

/// Map an sftp-channel error onto the fetch taxonomy
fn map_sftp_error(err: ssh2::Error, path: &str) -> FetchError {
    match err.code() {
        ErrorCode::SFTP(SFTP_NO_SUCH_FILE) => FetchError::NotFound(path.to_string()),
        ErrorCode::SFTP(SFTP_PERMISSION_DENIED) => {
            FetchError::Auth(format!("permission denied for {}", path))
        }
        _ => FetchError::Io(format!("opening {}: {}", path, err)),
    }
}

#[async_trait::async_trait]
impl RemoteFetcher for SftpFetcher {
    fn name(&self) -> &'static str {
        "SFTP"
    }

    async fn fetch(&self, locator: &Locator) -> Result<FetchedResource, FetchError> {
        let fetcher = self.clone();
        let locator = locator.clone();

        let task = tokio::task::spawn_blocking(move || fetcher.fetch_blocking(&locator));

        match tokio::time::timeout(self.deadline(), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(FetchError::Io(format!("fetch task failed: {}", join_err))),
            Err(_) => Err(FetchError::Connection(format!(
                "timed out after {:?}",
                self.deadline()
            ))),
        }
    }

    async fn test_connection(&self, locator: &Locator) -> Result<(), FetchError> {
        let fetcher = self.clone();
        let locator = locator.clone();

        let task = tokio::task::spawn_blocking(move || fetcher.open_session(&locator).map(|_| ()));

        match tokio::time::timeout(self.deadline(), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(FetchError::Io(format!("connect task failed: {}", join_err))),
            Err(_) => Err(FetchError::Connection(format!(
                "timed out after {:?}",
                self.deadline()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_requires_credentials() {
        let config = SftpConfig::default();
        assert!(matches!(
            SftpFetcher::from_config(&config),
            Err(FetchError::Auth(_))
        ));

        let config = SftpConfig {
            username: Some("demo".to_string()),
            password: Some("demo".to_string()),
            connect_timeout_secs: 5,
            read_timeout_secs: 10,
        };
        let fetcher = SftpFetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.connect_timeout, Duration::from_secs(5));
        assert_eq!(fetcher.read_timeout, Duration::from_secs(10));
        assert_eq!(fetcher.deadline(), Duration::from_secs(15));
    }

    #[test]
    fn session_timeout_saturates() {
        assert_eq!(session_timeout_ms(Duration::from_secs(60)), 60_000);
        assert_eq!(
            session_timeout_ms(Duration::from_secs(u64::MAX / 1_000)),
            u32::MAX
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_a_connection_error() {
        // Reserved TEST-NET address, nothing listens there
        let fetcher = SftpFetcher::new(Credentials::new("demo", "demo"))
            .with_connect_timeout(Duration::from_millis(200))
            .with_read_timeout(Duration::from_millis(200));

        let locator = Locator::parse("sftp://192.0.2.1:2222/sftp/data/sample_data.csv").unwrap();
        let err = fetcher.fetch(&locator).await.unwrap_err();
        assert!(matches!(err, FetchError::Connection(_)));
    }
}
