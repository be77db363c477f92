use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::AuditError;

/// Supplies the site's URL inventory for crawl seeding.
#[async_trait]
pub trait SitemapLoader: Send + Sync {
    /// `None` on any failure or an empty sitemap; the engine then seeds
    /// from the homepage alone. Both outcomes feed the same queue shape.
    async fn load(&self, base: &Url) -> Option<Vec<String>>;
}

/// Fetches `/sitemap.xml` and scans it for `<loc>` entries.
pub struct HttpSitemapLoader {
    client: Client,
}

impl HttpSitemapLoader {
    pub fn new(timeout: Duration) -> Result<Self, AuditError> {
        let client = Client::builder()
            .user_agent("Sitegraph/0.2 (https://github.com/trapdoorsec/sitegraph)")
            .timeout(timeout)
            .build()
            .map_err(|e| AuditError::Fetcher(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl SitemapLoader for HttpSitemapLoader {
    async fn load(&self, base: &Url) -> Option<Vec<String>> {
        let sitemap_url = base.join("/sitemap.xml").ok()?;
        let response = self.client.get(sitemap_url.clone()).send().await.ok()?;

        if response.status().as_u16() != 200 {
            debug!(
                "no sitemap at {} (HTTP {})",
                sitemap_url,
                response.status().as_u16()
            );
            return None;
        }

        let body = response.text().await.ok()?;
        let locs = extract_loc_values(&body);
        if locs.is_empty() { None } else { Some(locs) }
    }
}

/// Pull `<loc>` values out of sitemap XML, plain or CDATA-wrapped.
pub fn extract_loc_values(xml: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0usize;

    while let Some(open_idx) = xml[start..].find("<loc>") {
        let open = start + open_idx + 5;
        let Some(close_rel) = xml[open..].find("</loc>") else {
            break;
        };
        let close = open + close_rel;

        let mut value = xml[open..close].trim();
        if let Some(inner) = value
            .strip_prefix("<![CDATA[")
            .and_then(|v| v.strip_suffix("]]>"))
        {
            value = inner.trim();
        }

        if !value.is_empty() {
            out.push(value.to_string());
        }
        start = close + 6;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn extracts_plain_loc_entries() {
        let xml = r#"<?xml version="1.0"?>
            <urlset>
              <url><loc>http://site/</loc></url>
              <url><loc>http://site/about</loc></url>
            </urlset>"#;
        assert_eq!(
            extract_loc_values(xml),
            vec!["http://site/".to_string(), "http://site/about".to_string()]
        );
    }

    #[test]
    fn extracts_cdata_wrapped_loc_entries() {
        let xml = "<urlset><url><loc><![CDATA[ http://site/a ]]></loc></url></urlset>";
        assert_eq!(extract_loc_values(xml), vec!["http://site/a".to_string()]);
    }

    #[test]
    fn skips_empty_and_unclosed_entries() {
        let xml = "<urlset><url><loc></loc></url><url><loc>http://site/b";
        assert!(extract_loc_values(xml).is_empty());
    }

    #[tokio::test]
    async fn load_returns_none_when_sitemap_missing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let loader = HttpSitemapLoader::new(Duration::from_secs(5)).unwrap();
        let base = Url::parse(&mock_server.uri()).unwrap();
        assert!(loader.load(&base).await.is_none());
    }

    #[tokio::test]
    async fn load_returns_none_for_empty_sitemap() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<urlset></urlset>"),
            )
            .mount(&mock_server)
            .await;

        let loader = HttpSitemapLoader::new(Duration::from_secs(5)).unwrap();
        let base = Url::parse(&mock_server.uri()).unwrap();
        assert!(loader.load(&base).await.is_none());
    }

    #[tokio::test]
    async fn load_returns_discovered_urls() {
        let mock_server = MockServer::start().await;
        let xml = format!(
            "<urlset><url><loc>{0}/</loc></url><url><loc>{0}/docs</loc></url></urlset>",
            mock_server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(xml))
            .mount(&mock_server)
            .await;

        let loader = HttpSitemapLoader::new(Duration::from_secs(5)).unwrap();
        let base = Url::parse(&mock_server.uri()).unwrap();
        let urls = loader.load(&base).await.unwrap();
        assert_eq!(urls.len(), 2);
    }
}
