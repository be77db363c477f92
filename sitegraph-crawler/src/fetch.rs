use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::error::{AuditError, FetchError, ProbeError};

#[derive(Debug, Clone)]
pub struct ExtractedLink {
    pub href: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ExtractedImage {
    pub src: String,
    pub alt: String,
}

/// One loaded page as reported by the fetch collaborator.
///
/// `content_links` is all page links minus any href present in the header
/// or footer buckets. That is a defensive superset, not a strict DOM
/// partition: when header/footer containers are missing, every link still
/// lands in content.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub final_url: Url,
    pub status: u16,
    /// HTTP status of the first redirect hop, when any was followed.
    pub redirect_status: Option<u16>,
    pub header_links: Vec<ExtractedLink>,
    pub footer_links: Vec<ExtractedLink>,
    pub content_links: Vec<ExtractedLink>,
    pub images: Vec<ExtractedImage>,
    /// Absolute URLs of images that failed to load during this page load.
    pub failed_images: HashSet<String>,
}

impl PageSnapshot {
    pub fn empty(final_url: Url, status: u16) -> Self {
        Self {
            final_url,
            status,
            redirect_status: None,
            header_links: Vec::new(),
            footer_links: Vec::new(),
            content_links: Vec::new(),
            images: Vec::new(),
            failed_images: HashSet::new(),
        }
    }
}

/// Fetches a URL and reports the rendered page's links and images.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<PageSnapshot, FetchError>;
}

/// Lightweight existence check against a single URL, HEAD semantics.
#[async_trait]
pub trait ExistenceProber: Send + Sync {
    async fn probe(&self, url: &Url) -> Result<u16, ProbeError>;
}

fn classify_reqwest(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::HttpError(error)
    }
}

/// reqwest + scraper realization of [`PageFetcher`].
///
/// Redirects are followed manually so the first hop's status survives
/// into the snapshot. Image loads are verified with HEAD probes, cached
/// for the lifetime of the fetcher so a shared asset is only probed once
/// per run.
pub struct HttpFetcher {
    client: Client,
    image_status: Mutex<HashMap<Url, bool>>,
}

const MAX_REDIRECTS: usize = 5;

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, AuditError> {
        let client = Client::builder()
            .user_agent("Sitegraph/0.2 (https://github.com/trapdoorsec/sitegraph)")
            .timeout(timeout)
            .connect_timeout(timeout / 2)
            .pool_max_idle_per_host(10)
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuditError::Fetcher(e.to_string()))?;

        Ok(Self {
            client,
            image_status: Mutex::new(HashMap::new()),
        })
    }

    async fn check_images(&self, page_url: &Url, images: &[ExtractedImage]) -> HashSet<String> {
        let mut failed = HashSet::new();

        for image in images {
            let Ok(absolute) = page_url.join(&image.src) else {
                continue;
            };
            // data: and other non-HTTP sources cannot be missing
            if !matches!(absolute.scheme(), "http" | "https") {
                continue;
            }

            let cached = self.image_status.lock().await.get(&absolute).copied();
            let loads = match cached {
                Some(loads) => loads,
                None => {
                    // Only a confirmed-missing status marks the image as
                    // failed. Transport errors and servers that reject
                    // HEAD are not proof the resource is gone.
                    let loads = match self.client.head(absolute.clone()).send().await {
                        Ok(response) => !matches!(response.status().as_u16(), 404 | 410),
                        Err(e) => {
                            debug!("image probe failed for {}: {}", absolute, e);
                            true
                        }
                    };
                    self.image_status.lock().await.insert(absolute.clone(), loads);
                    loads
                }
            };

            if !loads {
                failed.insert(absolute.to_string());
            }
        }

        failed
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<PageSnapshot, FetchError> {
        debug!("Fetching {}", url);

        let mut current = url.clone();
        let mut response = self
            .client
            .get(current.clone())
            .send()
            .await
            .map_err(classify_reqwest)?;
        let mut redirect_status = None;
        let mut hops = 0;

        while response.status().is_redirection() {
            let Some(location) = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|value| value.to_str().ok())
            else {
                break;
            };
            let Ok(next) = current.join(location) else {
                break;
            };

            redirect_status.get_or_insert(response.status().as_u16());
            hops += 1;
            if hops > MAX_REDIRECTS {
                return Err(FetchError::TooManyRedirects);
            }

            debug!("  -> {} redirects to {}", response.status().as_u16(), next);
            current = next;
            response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(classify_reqwest)?;
        }

        let status = response.status().as_u16();
        let final_url = response.url().clone();

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);

        let mut snapshot = PageSnapshot::empty(final_url, status);
        snapshot.redirect_status = redirect_status;

        if status == 200 && is_html {
            let body = response.text().await.map_err(classify_reqwest)?;
            let (header_links, footer_links, content_links, images) = extract_page(&body);
            snapshot.failed_images = self.check_images(&snapshot.final_url, &images).await;
            snapshot.header_links = header_links;
            snapshot.footer_links = footer_links;
            snapshot.content_links = content_links;
            snapshot.images = images;
        }

        Ok(snapshot)
    }
}

/// Pull link buckets and images out of a rendered document.
#[allow(clippy::type_complexity)]
pub fn extract_page(
    html: &str,
) -> (
    Vec<ExtractedLink>,
    Vec<ExtractedLink>,
    Vec<ExtractedLink>,
    Vec<ExtractedImage>,
) {
    let document = Html::parse_document(html);

    let header_selector = Selector::parse("header a[href]").unwrap();
    let footer_selector = Selector::parse("footer a[href]").unwrap();
    let all_selector = Selector::parse("a[href]").unwrap();
    let image_selector = Selector::parse("img[src]").unwrap();

    let collect_links = |selector: &Selector| -> Vec<ExtractedLink> {
        document
            .select(selector)
            .filter_map(|element| {
                let href = element.value().attr("href")?;
                Some(ExtractedLink {
                    href: href.to_string(),
                    text: element.text().collect::<String>().trim().to_string(),
                })
            })
            .collect()
    };

    let header_links = collect_links(&header_selector);
    let footer_links = collect_links(&footer_selector);

    let chrome_hrefs: HashSet<&str> = header_links
        .iter()
        .chain(footer_links.iter())
        .map(|link| link.href.as_str())
        .collect();

    // Everything not claimed by header/footer counts as content, so no
    // link is lost when those containers are absent.
    let content_links = collect_links(&all_selector)
        .into_iter()
        .filter(|link| !chrome_hrefs.contains(link.href.as_str()))
        .collect();

    let images = document
        .select(&image_selector)
        .filter_map(|element| {
            let src = element.value().attr("src")?;
            Some(ExtractedImage {
                src: src.to_string(),
                alt: element.value().attr("alt").unwrap_or("").to_string(),
            })
        })
        .collect();

    (header_links, footer_links, content_links, images)
}

/// reqwest realization of [`ExistenceProber`].
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, AuditError> {
        let client = Client::builder()
            .user_agent("Sitegraph/0.2 (https://github.com/trapdoorsec/sitegraph)")
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| AuditError::Fetcher(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ExistenceProber for HttpProber {
    async fn probe(&self, url: &Url) -> Result<u16, ProbeError> {
        let response = self.client.head(url.clone()).send().await?;
        Ok(response.status().as_u16())
    }
}
