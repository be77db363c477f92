// Navigation-depth layering over a frozen graph store.

use serde::{Deserialize, Serialize};
use sitegraph_crawler::store::GraphStore;
use std::collections::{HashMap, HashSet};
use url::Url;

/// Where a page sits in the site's navigation structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageRole {
    Home,
    Header,
    Footer,
    HeaderFooter,
    Content,
    Isolated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerAssignment {
    pub role: PageRole,
    /// 0 home, 1 header, 2 footer, 3+ content depth. `None` when the
    /// multi-source frontier never reached the page.
    pub layer: Option<u32>,
}

const ISOLATED: LayerAssignment = LayerAssignment {
    role: PageRole::Isolated,
    layer: None,
};

/// Layer assignment for every reached page. Pages absent from the map
/// are isolated in the layering sense.
#[derive(Debug)]
pub struct LayerMap {
    assignments: HashMap<Url, LayerAssignment>,
}

impl LayerMap {
    pub fn get(&self, url: &Url) -> LayerAssignment {
        self.assignments.get(url).copied().unwrap_or(ISOLATED)
    }

    pub fn is_reached(&self, url: &Url) -> bool {
        self.assignments.contains_key(url)
    }
}

/// Assign every page a "clicks from home" layer with a multi-source BFS.
///
/// Header and footer link sets are replicated on every page, so a page
/// appearing in any header bucket is one hop from everywhere and a page
/// appearing in any footer bucket is two. Seeding those unions at depths
/// 1 and 2 (home at 0) models that; a single-source BFS from home would
/// scatter globally-navigable pages across whatever content path happened
/// to reach them first.
///
/// The agenda is processed in nondecreasing depth order, so the first
/// assignment a page receives is its minimum hop count from any source.
/// Expansion covers all three buckets of a reached page: once a page is
/// reachable, its own navigation is reachable too.
pub fn assign_layers(store: &GraphStore) -> LayerMap {
    let home = store.base().clone();

    // Union of header/footer buckets across the whole graph, in
    // discovery order.
    let mut header_pages = Vec::new();
    let mut header_seen = HashSet::new();
    let mut footer_pages = Vec::new();
    let mut footer_seen = HashSet::new();
    for page in store.pages() {
        for url in &page.outgoing.header {
            if header_seen.insert(url.clone()) {
                header_pages.push(url.clone());
            }
        }
        for url in &page.outgoing.footer {
            if footer_seen.insert(url.clone()) {
                footer_pages.push(url.clone());
            }
        }
    }

    let mut assignments: HashMap<Url, LayerAssignment> = HashMap::new();
    // agenda[d] holds pages waiting to be expanded at BFS depth d
    let mut agenda: Vec<Vec<Url>> = vec![Vec::new(), Vec::new(), Vec::new()];

    assignments.insert(
        home.clone(),
        LayerAssignment {
            role: PageRole::Home,
            layer: Some(0),
        },
    );
    agenda[0].push(home);

    for url in &header_pages {
        if assignments.contains_key(url) {
            continue;
        }
        let role = if footer_seen.contains(url) {
            PageRole::HeaderFooter
        } else {
            PageRole::Header
        };
        assignments.insert(
            url.clone(),
            LayerAssignment {
                role,
                layer: Some(1),
            },
        );
        agenda[1].push(url.clone());
    }

    // Header seeding takes priority: a page in both sets is already
    // assigned by the loop above.
    for url in &footer_pages {
        if assignments.contains_key(url) {
            continue;
        }
        assignments.insert(
            url.clone(),
            LayerAssignment {
                role: PageRole::Footer,
                layer: Some(2),
            },
        );
        agenda[2].push(url.clone());
    }

    let mut depth = 0;
    while depth < agenda.len() {
        let current = std::mem::take(&mut agenda[depth]);
        for url in current {
            let Some(page) = store.page(&url) else {
                continue;
            };
            for target in page.outgoing.iter_all() {
                if assignments.contains_key(target) {
                    continue;
                }
                let bfs_depth = depth as u32 + 1;
                assignments.insert(
                    target.clone(),
                    LayerAssignment {
                        role: PageRole::Content,
                        layer: Some(bfs_depth + 2),
                    },
                );
                if agenda.len() <= depth + 1 {
                    agenda.push(Vec::new());
                }
                agenda[depth + 1].push(target.clone());
            }
        }
        depth += 1;
    }

    LayerMap { assignments }
}

/// Pages with zero non-self incoming links, home exempted.
///
/// This is the graph-store notion of isolation and deliberately not the
/// same predicate as an unreached layering assignment: a page whose only
/// referrers were never fetched keeps its incoming links here while the
/// BFS never finds it.
pub fn find_orphans(store: &GraphStore) -> HashSet<Url> {
    store
        .pages()
        .filter(|page| page.url != *store.base() && page.is_orphan())
        .map(|page| page.url.clone())
        .collect()
}
