//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small documentation site and run the
//! full index -> service -> method traversal end-to-end over HTTP.

use boto_docs_crawler::config::Config;
use boto_docs_crawler::crawler::Coordinator;
use boto_docs_crawler::output::load_checkpoint;
use boto_docs_crawler::{CrawlPhase, MethodDoc};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = format!("{}/", base_url);
    config.crawler.max_workers = 4;
    config.crawler.request_delay_ms = 0;
    config.crawler.request_timeout_secs = 5;
    config.user_agent.value = "DocsCrawlerTest/1.0".to_string();
    config.output.output_file = output.to_path_buf();
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, url_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_index(server: &MockServer, services: &[&str]) {
    let links: String = services
        .iter()
        .map(|s| format!(r#"<li><a class="reference internal" href="{0}.html">{0}</a></li>"#, s))
        .collect();
    mount_page(
        server,
        "/reference/services/index.html",
        format!(
            r#"<html><body><article><h1>Available Services</h1>
            <div class="toctree-wrapper"><ul>{}</ul></div></article></body></html>"#,
            links
        ),
    )
    .await;
}

async fn mount_service(server: &MockServer, service: &str, methods: &[&str]) {
    let links: String = methods
        .iter()
        .map(|m| {
            format!(
                r#"<li><a class="reference internal" href="{0}/client/{1}.html">{1}</a></li>"#,
                service, m
            )
        })
        .collect();
    mount_page(
        server,
        &format!("/reference/services/{}.html", service),
        format!(
            r##"<html><body><article><h1>{0}</h1>
            <div class="toctree-wrapper"><ul>
            <li><a class="reference internal" href="{0}/client/index.html#client">Client</a></li>
            <li><a class="reference internal" href="{0}/paginator/ListObjects.html#paginators">Paginators</a></li>
            {1}</ul></div></article></body></html>"##,
            service, links
        ),
    )
    .await;
}

async fn mount_method(server: &MockServer, service: &str, name: &str) {
    mount_page(
        server,
        &format!("/reference/services/{}/client/{}.html", service, name),
        format!(
            r#"<html><body><div class="document">
            <h1>{0}</h1>
            <p>Calls the {0} operation.</p>
            <div class="highlight"><pre>response = client.{0}()</pre></div>
            <div class="highlight"><pre>print(response)</pre></div>
            <dl><dt>Bucket</dt><dd>The bucket name.</dd><dt>Key</dt><dd>Object key.</dd></dl>
            <dl class="field-list"><dt>Return type</dt><dd>dict</dd></dl>
            </div></body></html>"#,
            name
        ),
    )
    .await;
}

#[tokio::test]
async fn test_full_crawl_with_failed_method() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("boto3_docs.json");

    mount_index(&server, &["s3", "ec2"]).await;
    mount_service(&server, "s3", &["list_buckets", "put_object"]).await;
    mount_service(&server, "ec2", &["describe_instances"]).await;
    mount_method(&server, "s3", "list_buckets").await;
    mount_method(&server, "ec2", "describe_instances").await;
    // put_object is not mounted, so it answers 404

    let config = create_test_config(&server.uri(), &output);
    let mut coordinator = Coordinator::from_config(&config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert!(report.is_success());
    assert_eq!(coordinator.phase(), CrawlPhase::Done);
    assert_eq!(report.output_file, output);

    let tree = load_checkpoint(&output).unwrap();
    let services: Vec<_> = tree.services.keys().cloned().collect();
    assert_eq!(services, vec!["s3", "ec2"]);

    let s3 = &tree.services["s3"];
    assert_eq!(
        s3.url,
        format!("{}/reference/services/s3.html", server.uri())
    );
    assert_eq!(s3.methods.len(), 2);
    assert_eq!(
        s3.methods["put_object"],
        MethodDoc::failed("Failed to fetch page")
    );

    let doc = s3.methods["list_buckets"].documentation().unwrap();
    assert_eq!(doc.title, "list_buckets");
    assert_eq!(doc.description, "Calls the list_buckets operation.");
    assert_eq!(doc.syntax, "response = client.list_buckets()");
    assert_eq!(doc.examples, vec!["print(response)".to_string()]);
    assert_eq!(doc.parameters.len(), 2);
    assert_eq!(doc.parameters[1].name, "Key");
    assert_eq!(doc.returns, "dict");
    assert!(doc.full_text.contains("Calls the list_buckets operation."));

    assert!(!tree.services["ec2"].methods["describe_instances"].is_error());

    assert_eq!(report.stats.services_discovered, 2);
    assert_eq!(report.stats.methods_extracted, 2);
    assert_eq!(report.stats.methods_failed, 1);
}

#[tokio::test]
async fn test_limits_restrict_the_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("boto3_docs.json");

    mount_index(&server, &["s3", "ec2", "iam"]).await;
    mount_service(&server, "s3", &["a", "b", "c", "d"]).await;
    mount_service(&server, "ec2", &["e", "f"]).await;
    for name in ["a", "b", "c", "d"] {
        mount_method(&server, "s3", name).await;
    }
    for name in ["e", "f"] {
        mount_method(&server, "ec2", name).await;
    }

    let mut config = create_test_config(&server.uri(), &output);
    config.crawler.max_services = Some(2);
    config.crawler.max_methods_per_service = Some(2);

    let mut coordinator = Coordinator::from_config(&config).unwrap();
    coordinator.run().await.unwrap();

    let tree = load_checkpoint(&output).unwrap();
    assert_eq!(tree.services.len(), 2);
    assert!(!tree.services.contains_key("iam"));

    let mut s3: Vec<_> = tree.services["s3"].methods.keys().cloned().collect();
    s3.sort();
    assert_eq!(s3, vec!["a", "b"]);
    assert_eq!(tree.services["ec2"].methods.len(), 2);

    // Skipped methods were never requested
    let requests = server.received_requests().await.unwrap();
    assert!(!requests
        .iter()
        .any(|r| r.url.path().ends_with("/client/c.html")));
}

#[tokio::test]
async fn test_unreachable_index_writes_empty_output() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("boto3_docs.json");

    Mock::given(method("GET"))
        .and(path("/reference/services/index.html"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &output);
    let mut coordinator = Coordinator::from_config(&config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert!(report.index_unavailable);
    assert!(load_checkpoint(&output).unwrap().services.is_empty());
}

#[tokio::test]
async fn test_rerun_overwrites_previous_output() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("boto3_docs.json");

    mount_index(&server, &["s3"]).await;
    mount_service(&server, "s3", &["list_buckets"]).await;
    mount_method(&server, "s3", "list_buckets").await;

    std::fs::write(&output, r#"{"services": {"stale": {"url": "x", "methods": {}}}}"#).unwrap();

    let config = create_test_config(&server.uri(), &output);
    let mut coordinator = Coordinator::from_config(&config).unwrap();
    coordinator.run().await.unwrap();

    let tree = load_checkpoint(&output).unwrap();
    assert!(!tree.services.contains_key("stale"));
    assert_eq!(tree.method_count(), 1);
    assert_eq!(&tree, coordinator.tree());
}
