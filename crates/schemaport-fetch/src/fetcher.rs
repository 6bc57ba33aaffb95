//! Remote fetcher trait and shared fetch types

use crate::locator::Locator;

/// Credentials for authenticating against a remote host
///
/// Constructed explicitly by the caller (typically from config merged with
/// environment variables at the CLI edge) and injected into the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username for password authentication
    pub username: String,

    /// Password for password authentication
    pub password: String,
}

impl Credentials {
    /// Create new credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Raw bytes fetched from a remote location
///
/// Created per request and dropped after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    /// Full file content
    pub bytes: Vec<u8>,

    /// Path component of the originating locator
    pub path: String,
}

/// Errors that can occur while fetching a remote resource
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Remote path not found: {0}")]
    NotFound(String),

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Trait for fetchers that retrieve remote files
#[async_trait::async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Get the fetcher name (e.g., "SFTP")
    fn name(&self) -> &'static str;

    /// Fetch the full content of the addressed resource
    ///
    /// The underlying network session must be closed on every exit path.
    async fn fetch(&self, locator: &Locator) -> Result<FetchedResource, FetchError>;

    /// Connect and authenticate without transferring a file
    ///
    /// Useful for validating credentials before attempting a fetch.
    async fn test_connection(&self, locator: &Locator) -> Result<(), FetchError>;
}
