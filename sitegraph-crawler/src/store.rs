use std::collections::{HashMap, HashSet};
use url::Url;

/// The three DOM regions a link can be discovered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkBucket {
    Header,
    Footer,
    Content,
}

/// Per-page outgoing links, one ordered bucket per DOM region.
/// Order is DOM discovery order; duplicates within a bucket are kept.
#[derive(Debug, Clone, Default)]
pub struct OutgoingLinks {
    pub header: Vec<Url>,
    pub footer: Vec<Url>,
    pub content: Vec<Url>,
}

impl OutgoingLinks {
    pub fn bucket_mut(&mut self, bucket: LinkBucket) -> &mut Vec<Url> {
        match bucket {
            LinkBucket::Header => &mut self.header,
            LinkBucket::Footer => &mut self.footer,
            LinkBucket::Content => &mut self.content,
        }
    }

    /// All three buckets in header, footer, content order.
    pub fn iter_all(&self) -> impl Iterator<Item = &Url> {
        self.header.iter().chain(self.footer.iter()).chain(self.content.iter())
    }

    pub fn total(&self) -> usize {
        self.header.len() + self.footer.len() + self.content.len()
    }
}

#[derive(Debug, Clone)]
pub struct Redirect {
    pub to: Url,
    pub status: u16,
}

/// One node of the link graph. A record exists for every URL that was
/// fetched or referenced as a link target; referenced-only records carry
/// no status.
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub url: Url,
    pub outgoing: OutgoingLinks,
    pub images: Vec<Url>,
    /// Source pages, one entry per referencing link occurrence. The
    /// multiplicity is a popularity weight downstream; deduplication
    /// happens only at report-serialization time.
    pub incoming: Vec<Url>,
    pub status: Option<u16>,
    pub redirect: Option<Redirect>,
    pub fetch_error: Option<String>,
}

impl PageRecord {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            outgoing: OutgoingLinks::default(),
            images: Vec::new(),
            incoming: Vec::new(),
            status: None,
            redirect: None,
            fetch_error: None,
        }
    }

    /// Incoming sources deduplicated, first occurrence order.
    pub fn distinct_incoming(&self) -> Vec<&Url> {
        let mut seen = HashSet::new();
        self.incoming.iter().filter(|u| seen.insert(*u)).collect()
    }

    /// No incoming links from any page but itself. The home page is
    /// exempted by the caller, not here.
    pub fn is_orphan(&self) -> bool {
        !self.incoming.iter().any(|source| *source != self.url)
    }
}

#[derive(Debug, Clone)]
pub struct RedirectRecord {
    pub from: Url,
    pub to: Url,
    pub status: u16,
}

#[derive(Debug, Clone)]
pub struct BrokenImage {
    pub url: Url,
    /// Alt text from the first page that reported the failure.
    pub alt: String,
    /// Pages embedding the image on which it failed to load, dedup by page.
    pub referrers: Vec<Url>,
}

#[derive(Debug, Clone)]
pub struct BrokenLink {
    pub url: Url,
    pub status: u16,
    pub referrers: Vec<Url>,
}

#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub url: Url,
    pub error: String,
    /// Incoming links of the page at the moment the failure was recorded.
    pub referrers: Vec<Url>,
}

/// In-memory link graph plus the run-scoped issue registries. Owned by
/// the crawl engine while crawling; handed out by value afterwards so the
/// analyzer and report passes see a frozen graph.
#[derive(Debug)]
pub struct GraphStore {
    base: Url,
    pages: HashMap<Url, PageRecord>,
    /// Record creation order; keeps analyzer iteration deterministic.
    order: Vec<Url>,
    external_domains: Vec<(String, Vec<Url>)>,
    external_index: HashMap<String, usize>,
    broken_images: Vec<BrokenImage>,
    broken_image_index: HashMap<Url, usize>,
    redirects: Vec<RedirectRecord>,
    broken_links: Vec<BrokenLink>,
    failures: Vec<FetchFailure>,
}

impl GraphStore {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            pages: HashMap::new(),
            order: Vec::new(),
            external_domains: Vec::new(),
            external_index: HashMap::new(),
            broken_images: Vec::new(),
            broken_image_index: HashMap::new(),
            redirects: Vec::new(),
            broken_links: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn ensure_page(&mut self, url: &Url) -> &mut PageRecord {
        if !self.pages.contains_key(url) {
            self.order.push(url.clone());
            self.pages.insert(url.clone(), PageRecord::new(url.clone()));
        }
        self.pages.get_mut(url).unwrap()
    }

    pub fn page(&self, url: &Url) -> Option<&PageRecord> {
        self.pages.get(url)
    }

    /// Pages in record creation order.
    pub fn pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.order.iter().map(|url| &self.pages[url])
    }

    pub fn page_count(&self) -> usize {
        self.order.len()
    }

    /// Record an internal link `source -> target` in the given bucket and
    /// keep the reverse edge consistent. Both writes happen here so the
    /// incoming/outgoing invariant has a single owner.
    pub fn record_link(&mut self, source: &Url, bucket: LinkBucket, target: &Url) {
        self.ensure_page(source)
            .outgoing
            .bucket_mut(bucket)
            .push(target.clone());
        self.ensure_page(target).incoming.push(source.clone());
    }

    pub fn record_image(&mut self, page: &Url, image: Url) {
        self.ensure_page(page).images.push(image);
    }

    pub fn record_status(&mut self, page: &Url, status: u16) {
        self.ensure_page(page).status = Some(status);
    }

    pub fn record_fetch_error(&mut self, page: &Url, error: String) {
        let record = self.ensure_page(page);
        record.fetch_error = Some(error.clone());
        let referrers = record.incoming.clone();
        self.failures.push(FetchFailure {
            url: page.clone(),
            error,
            referrers,
        });
    }

    pub fn record_redirect(&mut self, from: &Url, to: &Url, status: u16) {
        self.ensure_page(from).redirect = Some(Redirect {
            to: to.clone(),
            status,
        });
        self.redirects.push(RedirectRecord {
            from: from.clone(),
            to: to.clone(),
            status,
        });
    }

    /// Register an external-domain reference. Set semantics per domain:
    /// re-registering the same (domain, source) pair is a no-op.
    pub fn record_external(&mut self, host: &str, source: &Url) {
        let idx = match self.external_index.get(host) {
            Some(idx) => *idx,
            None => {
                self.external_domains.push((host.to_string(), Vec::new()));
                let idx = self.external_domains.len() - 1;
                self.external_index.insert(host.to_string(), idx);
                idx
            }
        };
        let referrers = &mut self.external_domains[idx].1;
        if !referrers.contains(source) {
            referrers.push(source.clone());
        }
    }

    /// Upsert a broken-image entry: the first report fixes the alt text,
    /// every report appends the referring page (dedup by page).
    pub fn record_broken_image(&mut self, image: &Url, alt: &str, referrer: &Url) {
        let idx = match self.broken_image_index.get(image) {
            Some(idx) => *idx,
            None => {
                self.broken_images.push(BrokenImage {
                    url: image.clone(),
                    alt: alt.to_string(),
                    referrers: Vec::new(),
                });
                let idx = self.broken_images.len() - 1;
                self.broken_image_index.insert(image.clone(), idx);
                idx
            }
        };
        let entry = &mut self.broken_images[idx];
        if !entry.referrers.contains(referrer) {
            entry.referrers.push(referrer.clone());
        }
    }

    pub fn add_broken_link(&mut self, link: BrokenLink) {
        self.broken_links.push(link);
    }

    pub fn external_domains(&self) -> &[(String, Vec<Url>)] {
        &self.external_domains
    }

    pub fn broken_images(&self) -> &[BrokenImage] {
        &self.broken_images
    }

    pub fn redirects(&self) -> &[RedirectRecord] {
        &self.redirects
    }

    pub fn broken_links(&self) -> &[BrokenLink] {
        &self.broken_links
    }

    pub fn failures(&self) -> &[FetchFailure] {
        &self.failures
    }

    /// Every distinct URL appearing in any outgoing bucket, sorted.
    /// Buckets only ever hold internal targets, so this is the link
    /// validator's candidate set.
    pub fn distinct_link_targets(&self) -> Vec<Url> {
        let mut targets: Vec<Url> = self
            .pages()
            .flat_map(|page| page.outgoing.iter_all())
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        targets.sort();
        targets
    }
}
