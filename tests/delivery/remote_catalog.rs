use super::delivery_harness::{
    Harness, ScriptedPresenter, USER, WELCOME_CATALOG, catalog_origin, point_at, read,
};
use std::path::Path;
use upgrade_herald::HeraldError;
use upgrade_herald::cache::read_verified;
use upgrade_herald::delivery::Phase;
use upgrade_herald::error::{CacheError, CatalogError, NetworkError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ASSET_CATALOG: &str = r#"
- messageID: welcome
  messageVersion: 2
  osRequirements: ">=14.0"
  dialogProperties:
    message: "![banner](assets://welcome/banner.png)"
    icon: "assets://icon.png"
"#;

#[tokio::test]
async fn catalog_is_downloaded_once_while_etag_is_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/messages.yaml"))
        .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"abc123\""))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/messages.yaml"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"abc123\"")
                .set_body_string(WELCOME_CATALOG),
        )
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new();
    point_at(&harness, &server);
    let presenter = ScriptedPresenter::accepting();

    let first = harness
        .run(&presenter, &harness.options("14.2"))
        .await
        .unwrap();
    assert_eq!(first.messages.len(), 1);
    assert!(first.committed);

    let cached = harness.cache_dir().join("messages.yaml");
    assert_eq!(read(&cached), WELCOME_CATALOG);
    let metadata = read_verified(&cached).unwrap();
    assert_eq!(metadata.validator.as_deref(), Some("\"abc123\""));

    let second = harness
        .run(&presenter, &harness.options("14.3"))
        .await
        .unwrap();
    assert_eq!(second.phase, Phase::Commit);
    assert!(second.messages.is_empty());
    assert_eq!(harness.ledger().acknowledged_version(USER, "welcome"), Some(2));
}

#[tokio::test]
async fn assets_resolve_against_distribution_point() {
    let server = catalog_origin(ASSET_CATALOG, "\"v1\"").await;
    let harness = Harness::new();
    point_at(&harness, &server);
    let presenter = ScriptedPresenter::accepting();

    harness
        .run(&presenter, &harness.options("14.2"))
        .await
        .unwrap();

    let payload = &presenter.shown()[0];
    let assets = format!("{}/assets/", server.uri());
    assert_eq!(
        read(Path::new(&payload.message)),
        format!("![banner]({assets}welcome/banner.png)")
    );
    assert_eq!(payload.extra["icon"], format!("{assets}icon.png"));
}

#[tokio::test]
async fn unreachable_origin_fails_after_wait() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let harness = Harness::new();
    point_at(&harness, &server);
    let presenter = ScriptedPresenter::accepting();

    let err = harness
        .run(&presenter, &harness.options("14.2"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HeraldError::Network(NetworkError::Unavailable { .. })
    ));
    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() > 1);
    assert!(requests.iter().all(|request| request.method.as_str() == "HEAD"));
    assert!(presenter.shown().is_empty());
    assert!(harness.last_committed().is_none());
}

#[tokio::test]
async fn failed_download_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let harness = Harness::new();
    point_at(&harness, &server);
    let presenter = ScriptedPresenter::accepting();

    let err = harness
        .run(&presenter, &harness.options("14.2"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HeraldError::Catalog(CatalogError::Cache(CacheError::DownloadFailed { .. }))
    ));
    assert!(!harness.cache_dir().join("messages.yaml").exists());
    assert!(harness.last_committed().is_none());
}

#[tokio::test]
async fn local_catalog_skips_network() {
    let server = MockServer::start().await;
    let harness = Harness::new();
    point_at(&harness, &server);
    let presenter = ScriptedPresenter::accepting();

    let report = harness
        .run(&presenter, &harness.local_options("14.2", ASSET_CATALOG))
        .await
        .unwrap();

    assert!(report.committed);
    assert!(server.received_requests().await.unwrap().is_empty());
    let payload = &presenter.shown()[0];
    assert_eq!(
        payload.extra["icon"],
        format!("{}/assets/icon.png", server.uri())
    );
}

#[tokio::test]
async fn empty_remote_body_aborts_without_commit() {
    let server = catalog_origin("", "\"empty\"").await;
    let harness = Harness::new();
    harness.set_last_committed("13.6");
    point_at(&harness, &server);
    let presenter = ScriptedPresenter::accepting();

    let err = harness
        .run(&presenter, &harness.options("14.2"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HeraldError::Catalog(CatalogError::Parse { .. })
    ));
    assert!(presenter.shown().is_empty());
    assert_eq!(harness.last_committed().as_deref(), Some("13.6"));
}
