use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

use crate::fetch::ExistenceProber;
use crate::store::{BrokenLink, GraphStore};

/// Post-crawl pass: probe every internal link target that was discovered
/// by reference but never fetched (page budget, or filtered at seeding).
///
/// Only a confirmed 404 marks a link broken. Probe failures are logged
/// and skipped: a network hiccup is not proof the target is missing.
/// External links are never probed; outgoing buckets only hold internal
/// targets.
pub async fn validate_links(
    store: &mut GraphStore,
    visited: &HashSet<Url>,
    prober: &dyn ExistenceProber,
    concurrency: usize,
) {
    let candidates: Vec<Url> = store
        .distinct_link_targets()
        .into_iter()
        .filter(|url| !visited.contains(url))
        .collect();

    if candidates.is_empty() {
        return;
    }
    info!("Probing {} uncrawled link targets", candidates.len());

    let probes = candidates.into_iter().map(|url| async move {
        match prober.probe(&url).await {
            Ok(status) => (url, Some(status)),
            Err(e) => {
                warn!("Probe failed for {}: {}", url, e);
                (url, None)
            }
        }
    });

    let mut results: Vec<(Url, Option<u16>)> = stream::iter(probes)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    // Completion order depends on the network; sort so the broken-link
    // registry is stable across runs.
    results.sort_by(|a, b| a.0.cmp(&b.0));

    for (url, status) in results {
        if status == Some(404) {
            let referrers = store
                .page(&url)
                .map(|page| page.incoming.clone())
                .unwrap_or_default();
            debug!("Confirmed broken link: {}", url);
            store.add_broken_link(BrokenLink {
                url,
                status: 404,
                referrers,
            });
        }
    }
}
