pub mod classify;
pub mod crawler;
pub mod error;
pub mod fetch;
pub mod frontier;
pub mod sitemap;
pub mod store;
pub mod url_utils;
pub mod validate;

pub use crawler::{CrawlConfig, CrawlPhase, Crawler, ProgressCallback};
pub use error::{AuditError, FetchError, ProbeError};
pub use fetch::{ExistenceProber, HttpFetcher, HttpProber, PageFetcher, PageSnapshot};
pub use sitemap::{HttpSitemapLoader, SitemapLoader};
pub use store::{GraphStore, LinkBucket, PageRecord};
