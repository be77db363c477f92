use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

use sitegraph_crawler::error::AuditError;
use sitegraph_crawler::fetch::{HttpFetcher, HttpProber};
use sitegraph_crawler::sitemap::HttpSitemapLoader;
use sitegraph_crawler::{CrawlConfig, CrawlPhase, Crawler};

use crate::report::{Report, assemble_report};

/// Options for configuring an audit run
#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub base_url: String,
    pub max_pages: usize,
    pub delay_ms: u64,
    pub timeout_secs: u64,
    pub use_sitemap: bool,
    pub probe_concurrency: usize,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            max_pages: 200,
            delay_ms: 250,
            timeout_secs: 10,
            use_sitemap: true,
            probe_concurrency: 8,
        }
    }
}

/// Callback for reporting audit progress
pub type AuditProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Execute a full audit: crawl, validate, layer, assemble.
/// Returns the report; the graph store never leaves this function.
pub async fn execute_audit(
    options: AuditOptions,
    progress_callback: Option<AuditProgressCallback>,
) -> Result<Report, AuditError> {
    let AuditOptions {
        base_url,
        max_pages,
        delay_ms,
        timeout_secs,
        use_sitemap,
        probe_concurrency,
    } = options;

    let base = Url::parse(&base_url)
        .map_err(|e| AuditError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
    let timeout = Duration::from_secs(timeout_secs);

    let fetcher = Arc::new(HttpFetcher::new(timeout)?);
    let sitemap = Arc::new(HttpSitemapLoader::new(timeout)?);
    let prober = Arc::new(HttpProber::new(timeout)?);

    let mut crawler = Crawler::new(fetcher, sitemap, prober).with_config(CrawlConfig {
        max_pages,
        delay: Duration::from_millis(delay_ms),
        use_sitemap,
        probe_concurrency,
    });

    if let Some(callback) = progress_callback {
        crawler = crawler.with_progress_callback(Arc::new(move |phase, message| {
            let label = match phase {
                CrawlPhase::Seeding => "seed",
                CrawlPhase::Draining => "crawl",
                CrawlPhase::Validating => "check",
            };
            callback(format!("[{label}] {message}"));
        }));
    }

    let store = crawler.run(&base).await?;

    info!("Assembling report for {} pages", store.page_count());
    Ok(assemble_report(&store))
}
