//! Integration tests for POST /publish.

mod common;

use axum::http::StatusCode;
use common::{
    ORIGIN, Part, ScriptedSlugs, TestServer, files_body, is_generated_slug, multipart_body,
    multipart_content_type, seeded_bytes,
};
use hoist_core::Counter;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_publish_returns_domain_url_and_count() {
    let server = TestServer::new().await;

    let response = server
        .publish(&[("index.html", &[b'a'; 50]), ("style.css", &[b'b'; 20])])
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let json = response.json();
    let domain = json["domain"].as_str().unwrap().to_string();
    assert!(is_generated_slug(&domain), "unexpected slug {domain}");
    assert_eq!(json["url"], format!("https://{domain}.{ORIGIN}"));
    assert_eq!(json["total_files"], 2);

    assert_eq!(
        server.keys(&domain).await,
        vec![
            format!("yeet/{domain}/index.html"),
            format!("yeet/{domain}/style.css"),
        ]
    );
}

#[tokio::test]
async fn test_publish_normalizes_file_names() {
    let server = TestServer::new().await;

    let response = server
        .publish(&[
            ("./docs//guide/../intro.html", b"intro"),
            ("assets/./app.js", b"js"),
        ])
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let domain = response.json()["domain"].as_str().unwrap().to_string();
    assert_eq!(
        server.keys(&domain).await,
        vec![
            format!("yeet/{domain}/assets/app.js"),
            format!("yeet/{domain}/docs/intro.html"),
        ]
    );
}

#[tokio::test]
async fn test_publish_many_files_with_bounded_writes() {
    let server = TestServer::with_config(|c| c.write_batch_width = 4).await;
    server.store.slow_puts(Duration::from_millis(5));

    let names: Vec<String> = (0..60).map(|i| format!("pages/page-{i:02}.html")).collect();
    let bodies: Vec<bytes::Bytes> = (0..60).map(|i| seeded_bytes(i, 128)).collect();
    let files: Vec<(&str, &[u8])> = names
        .iter()
        .zip(&bodies)
        .map(|(name, body)| (name.as_str(), &body[..]))
        .collect();

    let response = server.publish(&files).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["total_files"], 60);

    let domain = response.json()["domain"].as_str().unwrap().to_string();
    assert_eq!(server.keys(&domain).await.len(), 60);
    assert_eq!(server.store.put_count(), 60);

    let peak = server.store.max_in_flight();
    assert!(peak > 1 && peak <= 4, "peak in-flight writes {peak}");
}

#[tokio::test]
async fn test_publish_rejects_wrong_content_type() {
    let server = TestServer::new().await;

    let response = server
        .publish_raw("application/json", br#"{"files": []}"#.to_vec())
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["error"],
        "Content-Type must be multipart/form-data"
    );
    assert!(server.all_keys().await.is_empty());
}

#[tokio::test]
async fn test_publish_requires_files() {
    let server = TestServer::new().await;

    let body = multipart_body(&[Part::Text("note", "hello")]);
    let response = server.publish_raw(&multipart_content_type(), body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "At least one file is required");
    assert_eq!(server.store.put_count(), 0);
}

#[tokio::test]
async fn test_publish_ignores_unrelated_parts() {
    let server = TestServer::new().await;

    let body = multipart_body(&[
        Part::Text("note", "hello"),
        Part::File("attachment", "other.txt", b"ignored"),
        Part::Text("files", "not a file"),
        Part::File("files", "kept.txt", b"kept"),
    ]);
    let response = server.publish_raw(&multipart_content_type(), body).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["total_files"], 1);

    let domain = response.json()["domain"].as_str().unwrap().to_string();
    assert_eq!(
        server.keys(&domain).await,
        vec![format!("yeet/{domain}/kept.txt")]
    );
}

#[tokio::test]
async fn test_oversized_file_rejects_whole_set() {
    let server = TestServer::with_config(|c| c.max_file_bytes = 16).await;

    let response = server
        .publish(&[
            ("index.html", b"small"),
            ("big.bin", &[0u8; 32]),
            ("after.txt", b"later"),
        ])
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let error = response.json()["error"].as_str().unwrap().to_string();
    assert!(error.contains("big.bin"), "unexpected error: {error}");
    assert_eq!(server.store.put_count(), 0);
    assert!(server.all_keys().await.is_empty());
}

#[tokio::test]
async fn test_escaping_file_name_is_rejected() {
    let server = TestServer::new().await;

    let response = server
        .publish(&[("index.html", b"ok"), ("../../etc/passwd", b"root")])
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response.json()["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid path")
    );
    assert_eq!(server.store.put_count(), 0);
}

#[tokio::test]
async fn test_duplicate_file_names_are_rejected() {
    let server = TestServer::new().await;

    let response = server
        .publish(&[("css/site.css", b"a"), ("css/./site.css", b"b")])
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(server.store.put_count(), 0);
}

#[tokio::test]
async fn test_file_used_as_directory_is_rejected() {
    let server = TestServer::new().await;

    let response = server
        .publish(&[("about", b"plain"), ("about/index.html", b"<p>dir</p>")])
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["error"],
        "invalid path: about is both a file and a directory"
    );
    assert_eq!(server.store.put_count(), 0);
    assert!(server.all_keys().await.is_empty());
}

#[tokio::test]
async fn test_html_sibling_and_directory_index_coexist() {
    let server = TestServer::new().await;

    let response = server
        .publish(&[("about.html", b"page"), ("about/index.html", b"<p>dir</p>")])
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["total_files"], 2);
}

#[tokio::test]
async fn test_storage_failure_returns_generic_500() {
    let server = TestServer::new().await;
    server.store.fail_puts(true);

    let response = server.publish(&[("index.html", b"<h1>hi</h1>")]).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "Internal server error");
    assert!(!response.text().contains("injected"));
}

#[tokio::test]
async fn test_mid_batch_failure_keeps_earlier_writes() {
    let server = TestServer::with_config_and_state(
        |c| c.write_batch_width = 1,
        |state| state.with_slug_source(Arc::new(ScriptedSlugs::new(&["half-done-0bad"]))),
    )
    .await;
    server.store.fail_after(2);

    let response = server
        .publish_raw(
            &multipart_content_type(),
            multipart_body(&[
                Part::File("files", "a.html", b"a"),
                Part::File("files", "b.html", b"b"),
                Part::File("files", "c.html", b"c"),
                Part::File("files", "d.html", b"d"),
            ]),
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "Internal server error");

    // Writes are not rolled back; the ones that landed stay in place.
    assert_eq!(
        server.keys("half-done-0bad").await,
        vec![
            "yeet/half-done-0bad/a.html".to_string(),
            "yeet/half-done-0bad/b.html".to_string(),
        ]
    );
    assert_eq!(server.store.put_count(), 3);
}

#[tokio::test]
async fn test_request_body_limit() {
    let server = TestServer::with_config(|c| {
        c.max_request_bytes = 256;
        c.max_file_bytes = 256;
    })
    .await;

    let big = vec![b'x'; 4096];
    let response = server
        .publish_raw(&multipart_content_type(), files_body(&[("big.txt", &big)]))
        .await;
    assert!(response.status.is_client_error(), "got {}", response.status);
    assert_eq!(server.store.put_count(), 0);
}

#[tokio::test]
async fn test_taken_slug_is_regenerated() {
    let server = TestServer::with_state(|state| {
        state.with_slug_source(Arc::new(ScriptedSlugs::new(&[
            "taken-site-0000",
            "fresh-site-0001",
        ])))
    })
    .await;
    server.seed("taken-site-0000", "index.html", b"first").await;

    let response = server.publish(&[("index.html", b"second")]).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["domain"], "fresh-site-0001");

    let original = server.get_site("taken-site-0000", "/").await;
    assert_eq!(original.body.as_ref(), b"first");
}

#[tokio::test]
async fn test_exhausted_slug_attempts_fail() {
    let server = TestServer::with_state(|state| {
        state.with_slug_source(Arc::new(ScriptedSlugs::new(&["taken-site-0000"])))
    })
    .await;
    server.seed("taken-site-0000", "index.html", b"first").await;

    let response = server.publish(&[("index.html", b"second")]).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(server.store.put_count(), 1);
}

#[tokio::test]
async fn test_publish_updates_usage_counters() {
    let server = TestServer::new().await;

    let response = server
        .publish(&[("index.html", &[b'a'; 50]), ("style.css", &[b'b'; 20])])
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    server.wait_for_counter(Counter::Deployments, 1).await;
    server.wait_for_counter(Counter::Bandwidth, 70).await;
}

#[tokio::test]
async fn test_rejected_publish_leaves_counters_alone() {
    let server = TestServer::with_config(|c| c.max_file_bytes = 4).await;

    let response = server.publish(&[("index.html", b"too long")]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let snapshot = server.state.counters.snapshot().await.unwrap();
    assert_eq!(snapshot.deployments, 0);
    assert_eq!(snapshot.bandwidth, 0);
}
