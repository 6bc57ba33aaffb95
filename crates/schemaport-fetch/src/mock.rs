//! Mock fetcher for testing
//!
//! Returns predefined file contents without opening any network session.
//! Useful for unit testing the import pipeline, CI runs without an SFTP
//! server, and simulating fetch-phase error conditions.

use crate::fetcher::{FetchError, FetchedResource, RemoteFetcher};
use crate::locator::Locator;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock fetcher backed by an in-memory path → bytes map
///
/// Clones share state, so a test can hand the fetcher to the code under test
/// and keep seeding files through its own handle.
#[derive(Clone)]
pub struct MockFetcher {
    /// Predefined file contents by remote path
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,

    /// Errors to return for specific paths
    errors: Arc<RwLock<HashMap<String, FetchError>>>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulated transfer latency (milliseconds)
    latency_ms: u64,
}

impl MockFetcher {
    /// Create a new mock fetcher with no predefined files
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            fail_connection: false,
            latency_ms: 0,
        }
    }

    /// Seed the content returned for a remote path
    pub async fn add_file(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.write().await.insert(path.into(), bytes.into());
    }

    /// Configure an error to be returned for a specific path
    pub async fn add_error_for_path(&self, path: impl Into<String>, error: FetchError) {
        self.errors.write().await.insert(path.into(), error);
    }

    /// Configure to fail all connections
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure simulated latency in milliseconds
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Number of seeded files
    pub async fn file_count(&self) -> usize {
        self.files.read().await.len()
    }

    /// Remove all seeded files
    pub async fn clear_files(&self) {
        self.files.write().await.clear();
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }

    fn clone_error(error: &FetchError) -> FetchError {
        match error {
            FetchError::Connection(m) => FetchError::Connection(m.clone()),
            FetchError::Auth(m) => FetchError::Auth(m.clone()),
            FetchError::NotFound(m) => FetchError::NotFound(m.clone()),
            FetchError::InvalidLocator(m) => FetchError::InvalidLocator(m.clone()),
            FetchError::Io(m) => FetchError::Io(m.clone()),
        }
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RemoteFetcher for MockFetcher {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn fetch(&self, locator: &Locator) -> Result<FetchedResource, FetchError> {
        self.simulate_latency().await;

        if self.fail_connection {
            return Err(FetchError::Connection(
                "simulated connection failure".to_string(),
            ));
        }

        if let Some(error) = self.errors.read().await.get(&locator.path) {
            return Err(Self::clone_error(error));
        }

        match self.files.read().await.get(&locator.path) {
            Some(bytes) => Ok(FetchedResource {
                bytes: bytes.clone(),
                path: locator.path.clone(),
            }),
            None => Err(FetchError::NotFound(locator.path.clone())),
        }
    }

    async fn test_connection(&self, _locator: &Locator) -> Result<(), FetchError> {
        self.simulate_latency().await;

        if self.fail_connection {
            return Err(FetchError::Connection(
                "simulated connection failure".to_string(),
            ));
        }

        Ok(())
    }
}
