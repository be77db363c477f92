use std::collections::HashSet;
use url::Url;

use crate::fetch::PageSnapshot;
use crate::frontier::Frontier;
use crate::store::{GraphStore, LinkBucket};
use crate::url_utils::{is_internal, normalize};

/// Fold one fetched page's links and images into the graph.
///
/// Hrefs resolve against the snapshot's final URL (that is the document
/// the links were extracted from); attribution uses the requested page
/// URL, which is the graph key.
pub fn classify_page(
    store: &mut GraphStore,
    frontier: &mut Frontier,
    page_url: &Url,
    snapshot: &PageSnapshot,
) {
    let base = store.base().clone();
    let resolve_base = &snapshot.final_url;

    let failed_images: HashSet<Url> = snapshot
        .failed_images
        .iter()
        .filter_map(|raw| normalize(raw, resolve_base))
        .collect();

    let buckets = [
        (LinkBucket::Header, &snapshot.header_links),
        (LinkBucket::Footer, &snapshot.footer_links),
        (LinkBucket::Content, &snapshot.content_links),
    ];

    for (bucket, links) in buckets {
        for link in links {
            let Some(target) = normalize(&link.href, resolve_base) else {
                continue;
            };

            if is_internal(&target, &base) {
                store.record_link(page_url, bucket, &target);
                frontier.enqueue(target);
            } else if let Some(host) = target.host_str() {
                store.record_external(host, page_url);
            }
        }
    }

    for image in &snapshot.images {
        let Some(target) = normalize(&image.src, resolve_base) else {
            continue;
        };
        store.record_image(page_url, target.clone());
        if failed_images.contains(&target) {
            store.record_broken_image(&target, &image.alt, page_url);
        }
    }
}
