// Tests for report assembly and rendering

use sitegraph_core::report::{
    ReportFormat, assemble_report, generate_json_report, generate_text_report, save_report,
};
use sitegraph_crawler::store::{BrokenLink, GraphStore, LinkBucket};
use url::Url;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn base() -> Url {
    url("http://localhost:3000/")
}

/// A small site with one of every defect kind.
fn defect_store() -> GraphStore {
    let mut store = GraphStore::new(base());
    let home = base();
    let nav = url("http://localhost:3000/nav");
    let old = url("http://localhost:3000/old");
    let new = url("http://localhost:3000/new");
    let down = url("http://localhost:3000/down");
    let missing = url("http://localhost:3000/missing");
    let img = url("http://localhost:3000/hero.png");

    store.record_status(&home, 200);
    store.record_link(&home, LinkBucket::Header, &nav);
    store.record_link(&home, LinkBucket::Content, &old);
    store.record_link(&home, LinkBucket::Content, &down);
    store.record_link(&home, LinkBucket::Content, &missing);
    store.record_external("cdn.example.com", &home);
    store.record_image(&home, img.clone());
    store.record_broken_image(&img, "hero", &home);

    store.record_status(&nav, 200);
    // nav links home twice; the report must dedup home's incoming list
    store.record_link(&nav, LinkBucket::Content, &home);
    store.record_link(&nav, LinkBucket::Content, &home);
    store.record_link(&nav, LinkBucket::Content, &missing);

    store.record_status(&old, 200);
    store.record_redirect(&old, &new, 301);

    store.record_fetch_error(&down, "HTTP 500".to_string());

    store.add_broken_link(BrokenLink {
        url: missing.clone(),
        status: 404,
        referrers: vec![home.clone(), nav.clone()],
    });

    store
}

// ============================================================================
// Summary
// ============================================================================

#[test]
fn summary_counts_every_registry() {
    let report = assemble_report(&defect_store());

    // home, nav, old, down, missing, new (redirect target is never a
    // record unless referenced -- it is not here)
    assert_eq!(report.summary.total_pages, 5);
    assert_eq!(report.summary.total_links, 7);
    assert_eq!(report.summary.broken_links, 1);
    assert_eq!(report.summary.broken_images, 1);
    assert_eq!(report.summary.redirects, 1);
    assert_eq!(report.summary.errors, 1);
    assert_eq!(report.summary.external_domains, 1);
    assert!(report.has_defects());
}

#[test]
fn clean_site_has_no_defects() {
    let mut store = GraphStore::new(base());
    store.record_status(&base(), 200);

    let report = assemble_report(&store);
    assert!(!report.has_defects());
    assert_eq!(report.summary.total_pages, 1);
}

// ============================================================================
// Page entries
// ============================================================================

#[test]
fn page_keys_are_stripped_paths() {
    let report = assemble_report(&defect_store());

    assert!(report.pages.contains_key("/"));
    assert!(report.pages.contains_key("/nav"));
    assert!(report.pages.contains_key("/missing"));
    assert!(!report.pages.keys().any(|k| k.contains("localhost")));
}

#[test]
fn incoming_links_are_deduplicated_in_the_report() {
    let report = assemble_report(&defect_store());

    let home = &report.pages["/"];
    assert_eq!(home.incoming_links, vec!["/nav".to_string()]);
}

#[test]
fn issues_are_attributed_to_the_right_pages() {
    let report = assemble_report(&defect_store());

    let old = &report.pages["/old"];
    let redirect = old.issues.redirect.as_ref().unwrap();
    assert_eq!(redirect.to, "/new");
    assert_eq!(redirect.status, 301);

    let down = &report.pages["/down"];
    assert_eq!(down.issues.error.as_deref(), Some("HTTP 500"));

    // the broken link shows up on both referring pages
    for key in ["/", "/nav"] {
        let page = &report.pages[key];
        assert_eq!(page.issues.broken_links.len(), 1, "missing on {key}");
        assert_eq!(page.issues.broken_links[0].url, "/missing");
        assert_eq!(page.issues.broken_links[0].status, 404);
    }

    let home = &report.pages["/"];
    assert_eq!(home.issues.broken_images.len(), 1);
    assert_eq!(home.issues.broken_images[0].url, "/hero.png");
    assert_eq!(home.issues.broken_images[0].alt, "hero");
    assert_eq!(home.external_domains, vec!["cdn.example.com".to_string()]);
    assert_eq!(home.images_count, 1);
}

#[test]
fn outgoing_buckets_keep_order_and_multiplicity() {
    let report = assemble_report(&defect_store());

    let home = &report.pages["/"];
    assert_eq!(home.outgoing_links.header, vec!["/nav".to_string()]);
    assert_eq!(
        home.outgoing_links.content,
        vec!["/old".to_string(), "/down".to_string(), "/missing".to_string()]
    );

    let nav = &report.pages["/nav"];
    // multiplicity preserved in outgoing buckets
    assert_eq!(
        nav.outgoing_links.content,
        vec!["/".to_string(), "/".to_string(), "/missing".to_string()]
    );
}

#[test]
fn layer_and_role_come_from_the_analyzer() {
    let report = assemble_report(&defect_store());

    assert_eq!(report.pages["/"].layer, Some(0));
    assert_eq!(report.pages["/nav"].layer, Some(1));
    assert_eq!(report.pages["/old"].layer, Some(3));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn json_report_uses_the_wire_field_names() {
    let report = assemble_report(&defect_store());
    let json = generate_json_report(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let summary = &value["summary"];
    assert!(summary["totalPages"].is_number());
    assert!(summary["brokenLinks"].is_number());
    assert!(summary["isolatedPages"].is_number());
    assert!(summary["externalDomains"].is_number());

    let home = &value["pages"]["/"];
    assert!(home["incomingLinks"].is_array());
    assert!(home["isIsolated"].is_boolean());
    assert!(home["outgoingLinks"]["header"].is_array());
    assert!(home["imagesCount"].is_number());
    assert!(home["issues"]["brokenImages"].is_array());
    // null, not absent, when the page has no redirect
    assert!(home["issues"]["redirect"].is_null());
    assert_eq!(home["role"], "home");
}

#[test]
fn isolated_pages_serialize_with_null_layer() {
    let mut store = GraphStore::new(base());
    store.record_status(&base(), 200);
    let stray = url("http://localhost:3000/stray");
    store.ensure_page(&stray);

    let report = assemble_report(&store);
    let value: serde_json::Value =
        serde_json::from_str(&generate_json_report(&report).unwrap()).unwrap();

    assert!(value["pages"]["/stray"]["layer"].is_null());
    assert_eq!(value["pages"]["/stray"]["role"], "isolated");
    assert_eq!(value["pages"]["/stray"]["isIsolated"], true);
    assert_eq!(report.summary.isolated_pages, 1);
}

#[test]
fn text_report_lists_defects() {
    let report = assemble_report(&defect_store());
    let text = generate_text_report(&report);

    assert!(text.contains("SITEGRAPH AUDIT REPORT"));
    assert!(text.contains("Broken links:   1"));
    assert!(text.contains("broken link /missing (404)"));
    assert!(text.contains("broken image /hero.png"));
    assert!(text.contains("redirects to /new (301)"));
    assert!(text.contains("HTTP 500"));
}

#[test]
fn save_report_writes_the_file() {
    let report = assemble_report(&defect_store());
    let json = generate_json_report(&report).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    save_report(&json, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, json);
}

// ============================================================================
// Format parsing
// ============================================================================

#[test]
fn report_format_from_str() {
    assert!(matches!(ReportFormat::from_str("json"), Some(ReportFormat::Json)));
    assert!(matches!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text)));
    assert!(ReportFormat::from_str("yaml").is_none());
}
