// End-to-end audit orchestration tests against a mock server

use sitegraph_core::audit::{AuditOptions, execute_audit};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_page(server: &MockServer, at: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(html),
        )
        .mount(server)
        .await;
}

fn options(server: &MockServer) -> AuditOptions {
    AuditOptions {
        base_url: format!("{}/", server.uri()),
        delay_ms: 0,
        ..AuditOptions::default()
    }
}

#[tokio::test]
async fn audit_produces_a_full_report() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve_page(
        &server,
        "/",
        format!(
            r#"<html><body>
                <header><a href="{base}/docs">Docs</a></header>
                <main><a href="{base}/blog">Blog</a></main>
                <footer><a href="{base}/about">About</a></footer>
            </body></html>"#
        ),
    )
    .await;
    for p in ["/docs", "/blog", "/about"] {
        serve_page(&server, p, "<html><body>leaf</body></html>".to_string()).await;
    }
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let report = execute_audit(options(&server), None).await.unwrap();

    assert_eq!(report.summary.total_pages, 4);
    assert_eq!(report.summary.total_links, 3);
    assert!(!report.has_defects());

    assert_eq!(report.pages["/"].layer, Some(0));
    assert_eq!(report.pages["/docs"].layer, Some(1));
    assert_eq!(report.pages["/about"].layer, Some(2));
    assert_eq!(report.pages["/blog"].layer, Some(3));
}

#[tokio::test]
async fn audit_seeds_from_sitemap_when_present() {
    let server = MockServer::start().await;
    let base = server.uri();

    let sitemap = format!(
        "<urlset><url><loc>{base}/</loc></url><url><loc>{base}/hidden</loc></url></urlset>"
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
        .mount(&server)
        .await;
    serve_page(&server, "/", "<html><body>home</body></html>".to_string()).await;
    serve_page(&server, "/hidden", "<html><body>hidden</body></html>".to_string()).await;

    let report = execute_audit(options(&server), None).await.unwrap();

    // "/hidden" is nowhere in the link graph; only the sitemap knows it
    assert!(report.pages.contains_key("/hidden"));
    // it also has no incoming links, which makes it an orphan
    assert!(report.pages["/hidden"].is_isolated);
    assert_eq!(report.summary.isolated_pages, 1);
}

#[tokio::test]
async fn audit_reports_progress_through_the_callback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    serve_page(&server, "/", "<html><body>home</body></html>".to_string()).await;

    let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let messages_clone = messages.clone();
    let callback = Arc::new(move |message: String| {
        messages_clone.lock().unwrap().push(message);
    });

    execute_audit(options(&server), Some(callback)).await.unwrap();

    let messages = messages.lock().unwrap();
    assert!(messages.iter().any(|m| m.starts_with("[seed]")));
    assert!(messages.iter().any(|m| m.starts_with("[crawl]")));
    assert!(messages.iter().any(|m| m.starts_with("[check]")));
}

#[tokio::test]
async fn audit_rejects_an_unparseable_base_url() {
    let result = execute_audit(
        AuditOptions {
            base_url: "not a url".to_string(),
            ..AuditOptions::default()
        },
        None,
    )
    .await;

    assert!(result.is_err());
}
