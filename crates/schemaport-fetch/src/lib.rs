//! Remote file fetching for schema import
//!
//! This crate retrieves the raw bytes of a remote schema-bearing file before
//! any parsing happens. The session is scoped to a single fetch: opened,
//! used, and closed on every exit path.
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemaport_fetch::{Credentials, Locator, RemoteFetcher, SftpFetcher};
//!
//! let locator = Locator::parse("sftp://files.example.com:2222/sftp/data/sample_data.csv")?;
//! let fetcher = SftpFetcher::new(Credentials::new("demo", "demo"));
//! let resource = fetcher.fetch(&locator).await?;
//! ```

pub mod fetcher;
pub mod locator;
pub mod mock;
pub mod sftp;

pub use fetcher::{Credentials, FetchError, FetchedResource, RemoteFetcher};
pub use locator::Locator;
pub use mock::MockFetcher;
pub use sftp::SftpFetcher;
