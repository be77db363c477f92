// Report assembly from a frozen graph store.

use serde::{Deserialize, Serialize};
use sitegraph_crawler::store::GraphStore;
use sitegraph_crawler::url_utils::strip_base;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

use crate::layering::{PageRole, assign_layers, find_orphans};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_pages: usize,
    pub total_links: usize,
    pub broken_links: usize,
    pub broken_images: usize,
    pub redirects: usize,
    pub isolated_pages: usize,
    pub errors: usize,
    pub external_domains: usize,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectIssue {
    pub to: String,
    pub status: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenLinkIssue {
    pub url: String,
    pub status: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenImageIssue {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageIssues {
    pub redirect: Option<RedirectIssue>,
    pub error: Option<String>,
    pub broken_links: Vec<BrokenLinkIssue>,
    pub broken_images: Vec<BrokenImageIssue>,
}

impl PageIssues {
    pub fn is_clean(&self) -> bool {
        self.redirect.is_none()
            && self.error.is_none()
            && self.broken_links.is_empty()
            && self.broken_images.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingPaths {
    pub header: Vec<String>,
    pub footer: Vec<String>,
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport {
    /// Deduplicated at serialization time; the store keeps the multiset.
    pub incoming_links: Vec<String>,
    pub is_isolated: bool,
    pub layer: Option<u32>,
    pub role: PageRole,
    pub outgoing_links: OutgoingPaths,
    pub external_domains: Vec<String>,
    pub images_count: usize,
    pub issues: PageIssues,
}

/// The audit's sole output boundary: everything the console summary,
/// JSON writer and visualizer consume. Page keys are base-stripped paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub summary: Summary,
    pub pages: BTreeMap<String, PageReport>,
}

impl Report {
    /// Whether the run found anything a CI gate should fail on.
    pub fn has_defects(&self) -> bool {
        self.summary.broken_links > 0 || self.summary.broken_images > 0 || self.summary.errors > 0
    }
}

fn dedup_paths<'a>(urls: impl Iterator<Item = &'a Url>, base: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.filter(|url| seen.insert(*url))
        .map(|url| strip_base(url, base))
        .collect()
}

/// Fold the frozen store, its registries and the layering pass into the
/// page-centric report. Every per-page datum comes off the PageRecord or
/// a keyed registry index; no linear scans per page.
pub fn assemble_report(store: &GraphStore) -> Report {
    let base = store.base();
    let layers = assign_layers(store);
    let orphans = find_orphans(store);

    // Invert the issue registries once, keyed by referring page.
    let mut external_by_page: HashMap<&Url, Vec<String>> = HashMap::new();
    for (host, referrers) in store.external_domains() {
        for referrer in referrers {
            external_by_page
                .entry(referrer)
                .or_default()
                .push(host.clone());
        }
    }

    let mut broken_images_by_page: HashMap<&Url, Vec<BrokenImageIssue>> = HashMap::new();
    for entry in store.broken_images() {
        for referrer in &entry.referrers {
            broken_images_by_page
                .entry(referrer)
                .or_default()
                .push(BrokenImageIssue {
                    url: strip_base(&entry.url, base),
                    alt: entry.alt.clone(),
                });
        }
    }

    let mut broken_links_by_page: HashMap<&Url, Vec<BrokenLinkIssue>> = HashMap::new();
    for entry in store.broken_links() {
        let mut seen = HashSet::new();
        for referrer in entry.referrers.iter().filter(|r| seen.insert(*r)) {
            broken_links_by_page
                .entry(referrer)
                .or_default()
                .push(BrokenLinkIssue {
                    url: strip_base(&entry.url, base),
                    status: entry.status,
                });
        }
    }

    let mut pages = BTreeMap::new();
    for record in store.pages() {
        let assignment = layers.get(&record.url);
        let issues = PageIssues {
            redirect: record.redirect.as_ref().map(|r| RedirectIssue {
                to: strip_base(&r.to, base),
                status: r.status,
            }),
            error: record.fetch_error.clone(),
            broken_links: broken_links_by_page
                .remove(&record.url)
                .unwrap_or_default(),
            broken_images: broken_images_by_page
                .remove(&record.url)
                .unwrap_or_default(),
        };

        pages.insert(
            strip_base(&record.url, base),
            PageReport {
                incoming_links: dedup_paths(record.incoming.iter(), base),
                is_isolated: orphans.contains(&record.url),
                layer: assignment.layer,
                role: assignment.role,
                outgoing_links: OutgoingPaths {
                    header: record.outgoing.header.iter().map(|u| strip_base(u, base)).collect(),
                    footer: record.outgoing.footer.iter().map(|u| strip_base(u, base)).collect(),
                    content: record.outgoing.content.iter().map(|u| strip_base(u, base)).collect(),
                },
                external_domains: external_by_page.remove(&record.url).unwrap_or_default(),
                images_count: record.images.len(),
                issues,
            },
        );
    }

    let summary = Summary {
        total_pages: store.page_count(),
        total_links: store.pages().map(|page| page.outgoing.total()).sum(),
        broken_links: store.broken_links().len(),
        broken_images: store.broken_images().len(),
        redirects: store.redirects().len(),
        isolated_pages: orphans.len(),
        errors: store.failures().len(),
        external_domains: store.external_domains().len(),
        generated_at: chrono::Utc::now().to_rfc3339(),
    };

    Report { summary, pages }
}

pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

pub fn generate_text_report(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out.push_str("                  SITEGRAPH AUDIT REPORT\n");
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    out.push_str(&format!("Generated:        {}\n", report.summary.generated_at));
    out.push_str(&format!("Pages:            {}\n", report.summary.total_pages));
    out.push_str(&format!("Links:            {}\n", report.summary.total_links));
    out.push_str(&format!("External domains: {}\n", report.summary.external_domains));
    out.push('\n');

    out.push_str("# Issues\n");
    out.push_str(&format!("  Broken links:   {}\n", report.summary.broken_links));
    out.push_str(&format!("  Broken images:  {}\n", report.summary.broken_images));
    out.push_str(&format!("  Redirects:      {}\n", report.summary.redirects));
    out.push_str(&format!("  Page errors:    {}\n", report.summary.errors));
    out.push_str(&format!("  Orphan pages:   {}\n", report.summary.isolated_pages));
    out.push('\n');

    for (path, page) in &report.pages {
        if page.issues.is_clean() && !page.is_isolated {
            continue;
        }
        out.push_str(&format!("  {}\n", path));
        if let Some(ref redirect) = page.issues.redirect {
            out.push_str(&format!(
                "    → redirects to {} ({})\n",
                redirect.to, redirect.status
            ));
        }
        if let Some(ref error) = page.issues.error {
            out.push_str(&format!("    ✗ {}\n", error));
        }
        for link in &page.issues.broken_links {
            out.push_str(&format!("    ✗ broken link {} ({})\n", link.url, link.status));
        }
        for image in &page.issues.broken_images {
            out.push_str(&format!(
                "    ✗ broken image {} (alt: {})\n",
                image.url, image.alt
            ));
        }
        if page.is_isolated {
            out.push_str("    ⚠ no incoming links\n");
        }
    }
    out.push('\n');

    out.push_str("# Pages by layer\n");
    for (path, page) in &report.pages {
        let layer = match page.layer {
            Some(layer) => layer.to_string(),
            None => "isolated".to_string(),
        };
        let glyph = match page.issues.error {
            Some(_) => "✗",
            None => "✓",
        };
        out.push_str(&format!("  {} [{:>8}] {}\n", glyph, layer, path));
    }

    out.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
