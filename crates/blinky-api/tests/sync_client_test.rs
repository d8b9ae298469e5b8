// Integration tests for `SyncClient` and `BlobClient` using wiremock.
#![allow(clippy::unwrap_used)]

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use blinky_api::transport::TransportConfig;
use blinky_api::types::{ConfigRecord, FirmwareRecord, GlobalsRecord, LogRecord};
use blinky_api::{BlobClient, Error, SyncClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SyncClient) {
    let server = MockServer::start().await;
    let url = server.uri().parse().unwrap();
    let client = SyncClient::new(url, None, &TransportConfig::default()).unwrap();
    (server, client)
}

fn porch_config() -> serde_json::Value {
    json!({
        "version": "__Bl!nky__ 1.0 ___",
        "name": "Porch",
        "group": "outside",
        "mode": "rainbow",
        "enabled": true,
        "speed": 100,
        "brightness": 128,
        "colorChange": 0,
        "numPixels": 120,
        "red": 255,
        "green": 0,
        "blue": 0
    })
}

// ── Strips ──────────────────────────────────────────────────────────

#[tokio::test]
async fn list_strips_returns_map() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/strips.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "strip1": porch_config() })),
        )
        .mount(&server)
        .await;

    let strips = client.list_strips().await.unwrap();
    assert_eq!(strips.len(), 1);
    assert_eq!(strips["strip1"].name, "Porch");
    assert_eq!(strips["strip1"].color_change, 0);
    assert_eq!(strips["strip1"].num_pixels, 120);
}

#[tokio::test]
async fn list_strips_empty_store_answers_null() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/strips.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let strips = client.list_strips().await.unwrap();
    assert!(strips.is_empty());
}

#[tokio::test]
async fn set_then_get_strip_round_trips() {
    let (server, client) = setup().await;
    let record: ConfigRecord = serde_json::from_value(porch_config()).unwrap();

    Mock::given(method("PUT"))
        .and(path("/strips/strip1.json"))
        .and(body_json(porch_config()))
        .respond_with(ResponseTemplate::new(200).set_body_json(porch_config()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/strips/strip1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(porch_config()))
        .mount(&server)
        .await;

    client.set_strip("strip1", &record).await.unwrap();
    let read_back = client.get_strip("strip1").await.unwrap().unwrap();
    assert_eq!(read_back, record);
}

#[tokio::test]
async fn get_absent_strip_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/strips/ghost.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    assert!(client.get_strip("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn write_failure_surfaces_store_message() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/strips/strip1.json"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Permission denied" })),
        )
        .mount(&server)
        .await;

    let record: ConfigRecord = serde_json::from_value(porch_config()).unwrap();
    let err = client.set_strip("strip1", &record).await.unwrap_err();
    match err {
        Error::Store {
            status, message, ..
        } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Permission denied");
        }
        other => panic!("expected Store error, got {other:?}"),
    }
}

#[tokio::test]
async fn auth_token_rides_in_query() {
    let server = MockServer::start().await;
    let url = server.uri().parse().unwrap();
    let client = SyncClient::new(
        url,
        Some(secrecy::SecretString::from("sekrit".to_owned())),
        &TransportConfig::default(),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/globals.json"))
        .and(query_param("auth", "sekrit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "allEnabled": true })))
        .mount(&server)
        .await;

    let globals = client.get_globals().await.unwrap();
    assert!(globals.all_enabled);
}

// ── Globals ─────────────────────────────────────────────────────────

#[tokio::test]
async fn absent_globals_defaults_to_disabled() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/globals.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let globals = client.get_globals().await.unwrap();
    assert_eq!(globals, GlobalsRecord { all_enabled: false });
}

// ── Firmware ────────────────────────────────────────────────────────

#[tokio::test]
async fn firmware_version_keys_are_escaped() {
    let (server, client) = setup().await;
    let version = "__Bl!nky__ 1.2.3 ___";

    let record = FirmwareRecord {
        version: version.to_owned(),
        date_uploaded: 1_700_000_000_000,
        filename: format!("Blinky.ino.bin {version}"),
        url: "https://blobs.example/Blinky.ino.bin".to_owned(),
    };

    // Spaces in the version key must be percent-escaped in the path.
    Mock::given(method("PUT"))
        .and(path("/firmware/__Bl!nky__%201.2.3%20___.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    client.set_firmware(version, &record).await.unwrap();
}

// ── Log ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn append_log_returns_push_key() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/log.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "-Nabc123" })))
        .mount(&server)
        .await;

    let entry = LogRecord {
        date: "2026-08-25T12:00:00Z".to_owned(),
        name: "Sidney".to_owned(),
        text: "set strip1 to rainbow".to_owned(),
    };
    let key = client.append_log(&entry).await.unwrap();
    assert_eq!(key, "-Nabc123");
}

// ── Timeouts ────────────────────────────────────────────────────────

#[tokio::test]
async fn slow_store_read_surfaces_the_configured_timeout() {
    let server = MockServer::start().await;
    let transport = TransportConfig {
        timeout: std::time::Duration::from_millis(100),
        ..TransportConfig::default()
    };
    let client = SyncClient::new(server.uri().parse().unwrap(), None, &transport).unwrap();

    Mock::given(method("GET"))
        .and(path("/strips.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("null")
                .set_delay(std::time::Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let err = client.list_strips().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "got {err:?}");
}

// ── Blob store ──────────────────────────────────────────────────────

#[tokio::test]
async fn blob_upload_returns_content_url() {
    let server = MockServer::start().await;
    let client = BlobClient::new(server.uri().parse().unwrap(), &TransportConfig::default())
        .unwrap();

    Mock::given(method("PUT"))
        .and(path("/Blinky.ino.bin"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let url = client
        .upload("Blinky.ino.bin", b"firmware bytes".to_vec())
        .await
        .unwrap();
    assert!(url.path().ends_with("/Blinky.ino.bin"));
}

#[tokio::test]
async fn blob_upload_failure_is_reported() {
    let server = MockServer::start().await;
    let client = BlobClient::new(server.uri().parse().unwrap(), &TransportConfig::default())
        .unwrap();

    Mock::given(method("PUT"))
        .and(path("/Blinky.ino.bin"))
        .respond_with(ResponseTemplate::new(507))
        .mount(&server)
        .await;

    let err = client
        .upload("Blinky.ino.bin", b"firmware bytes".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Blob { .. }));
}

#[tokio::test]
async fn blob_download_returns_bytes() {
    let server = MockServer::start().await;
    let client = BlobClient::new(server.uri().parse().unwrap(), &TransportConfig::default())
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/Blinky.ino.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"firmware bytes".to_vec()))
        .mount(&server)
        .await;

    let url: url::Url = format!("{}/Blinky.ino.bin", server.uri()).parse().unwrap();
    let bytes = client.download(&url).await.unwrap();
    assert_eq!(bytes, b"firmware bytes");
}

#[tokio::test]
async fn blob_download_missing_object_is_an_error() {
    let server = MockServer::start().await;
    let client = BlobClient::new(server.uri().parse().unwrap(), &TransportConfig::default())
        .unwrap();

    let url: url::Url = format!("{}/gone.bin", server.uri()).parse().unwrap();
    let err = client.download(&url).await.unwrap_err();
    assert!(matches!(err, Error::Blob { .. }));
}
