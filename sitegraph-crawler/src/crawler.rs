use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::classify::classify_page;
use crate::error::{AuditError, Result};
use crate::fetch::{ExistenceProber, PageFetcher};
use crate::frontier::Frontier;
use crate::sitemap::SitemapLoader;
use crate::store::GraphStore;
use crate::url_utils::{canonicalize, is_internal, normalize};
use crate::validate::validate_links;

/// Engine phase, surfaced through the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Seeding,
    Draining,
    Validating,
}

pub type ProgressCallback = Arc<dyn Fn(CrawlPhase, String) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Stop fetching once this many pages have been visited.
    pub max_pages: usize,
    /// Politeness delay between fetch dispatches. Protects the origin
    /// server; has no effect on ordering or dedup.
    pub delay: Duration,
    /// Try the sitemap for seeding before falling back to the homepage.
    pub use_sitemap: bool,
    /// Bounded pool size for the post-crawl existence probes.
    pub probe_concurrency: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 200,
            delay: Duration::from_millis(250),
            use_sitemap: true,
            probe_concurrency: 8,
        }
    }
}

/// Breadth-first crawl engine.
///
/// Drains a FIFO frontier one fetch at a time: each popped URL is fetched
/// at most once, its links and images are folded into the graph store,
/// and newly discovered internal targets join the back of the queue.
/// Draining is deliberately sequential with an inter-request delay; the
/// frontier, not scheduling luck, defines the traversal order.
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    sitemap: Arc<dyn SitemapLoader>,
    prober: Arc<dyn ExistenceProber>,
    config: CrawlConfig,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        sitemap: Arc<dyn SitemapLoader>,
        prober: Arc<dyn ExistenceProber>,
    ) -> Self {
        Self {
            fetcher,
            sitemap,
            prober,
            config: CrawlConfig::default(),
            progress_callback: None,
        }
    }

    pub fn with_config(mut self, config: CrawlConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn progress(&self, phase: CrawlPhase, message: String) {
        if let Some(ref callback) = self.progress_callback {
            callback(phase, message);
        }
    }

    /// Run a full crawl and return the frozen graph store.
    ///
    /// The store is created, mutated and validated here, then moved out;
    /// nothing can write to it afterwards.
    pub async fn run(&self, base_url: &Url) -> Result<GraphStore> {
        let home = normalize(base_url.as_str(), base_url)
            .filter(|url| url.host_str().is_some())
            .ok_or_else(|| AuditError::InvalidBaseUrl(base_url.to_string()))?;

        let mut store = GraphStore::new(home.clone());
        let mut frontier = Frontier::new();

        self.seed(&home, &mut frontier).await;
        self.drain(&home, &mut store, &mut frontier).await;

        self.progress(
            CrawlPhase::Validating,
            "probing uncrawled link targets".to_string(),
        );
        validate_links(
            &mut store,
            frontier.visited(),
            self.prober.as_ref(),
            self.config.probe_concurrency,
        )
        .await;

        Ok(store)
    }

    async fn seed(&self, home: &Url, frontier: &mut Frontier) {
        self.progress(CrawlPhase::Seeding, format!("seeding crawl of {}", home));
        info!("Seeding crawl of {}", home);

        if self.config.use_sitemap
            && let Some(entries) = self.sitemap.load(home).await
        {
            let mut seeded = 0;
            for raw in entries {
                let Some(url) = normalize(&raw, home) else {
                    continue;
                };
                if is_internal(&url, home) && frontier.enqueue(url) {
                    seeded += 1;
                }
            }
            info!("Seeded {} URLs from sitemap", seeded);
            if seeded > 0 {
                return;
            }
        }

        // No usable sitemap: the homepage alone seeds the same queue shape.
        info!("Seeding from the homepage only");
        frontier.enqueue(home.clone());
    }

    async fn drain(&self, home: &Url, store: &mut GraphStore, frontier: &mut Frontier) {
        let mut first = true;

        loop {
            if frontier.visited_count() >= self.config.max_pages {
                info!(
                    "Page budget of {} reached with {} URLs still pending",
                    self.config.max_pages,
                    frontier.pending_count()
                );
                break;
            }
            let Some(url) = frontier.pop() else {
                break;
            };
            if frontier.is_visited(&url) {
                continue;
            }
            frontier.mark_visited(url.clone());

            if !first {
                tokio::time::sleep(self.config.delay).await;
            }
            first = false;

            self.progress(CrawlPhase::Draining, url.to_string());

            match self.fetcher.fetch(&url).await {
                Ok(snapshot) => {
                    if snapshot.status == 200 {
                        store.record_status(&url, snapshot.status);

                        let final_canonical = canonicalize(&snapshot.final_url, home);
                        if let Some(status) = snapshot.redirect_status
                            && final_canonical != url
                        {
                            debug!("{} redirected to {} ({})", url, final_canonical, status);
                            store.record_redirect(&url, &final_canonical, status);
                        }

                        classify_page(store, frontier, &url, &snapshot);
                    } else {
                        // A failed page has no links to classify.
                        warn!("HTTP {} for {}", snapshot.status, url);
                        store.record_fetch_error(&url, format!("HTTP {}", snapshot.status));
                    }
                }
                Err(e) => {
                    warn!("Fetch failed for {}: {}", url, e);
                    store.record_fetch_error(&url, e.to_string());
                }
            }
        }

        info!(
            "Crawl complete: {} pages fetched, {} pages known",
            frontier.visited_count(),
            store.page_count()
        );
    }
}
