// End-to-end controller tests against a mock sync store.
#![allow(clippy::unwrap_used)]

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use blinky_core::{
    Command, CommandResult, Controller, CoreError, FleetConfig, Intent, Mode, StripId, SyncStatus,
};

fn config_for(server: &MockServer) -> FleetConfig {
    FleetConfig {
        database_url: server.uri().parse().expect("mock server URI parses"),
        actor: "tester".into(),
        refresh_interval_secs: 0,
        ..FleetConfig::default()
    }
}

fn config_json(name: &str, group: &str, mode: &str, enabled: bool) -> serde_json::Value {
    json!({
        "version": "current",
        "name": name,
        "group": group,
        "mode": mode,
        "enabled": enabled,
        "speed": 100,
        "brightness": 128,
        "colorChange": 0,
        "numPixels": 120,
        "red": 127,
        "green": 127,
        "blue": 127,
    })
}

/// Mount the five refresh endpoints. `strips` and `checkins` are the
/// node bodies; everything else answers `null`.
async fn mount_refresh(server: &MockServer, strips: serde_json::Value, checkins: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/strips.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(strips))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/checkin.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(checkins))
        .mount(server)
        .await;
    for node in ["/firmware.json", "/log.json", "/globals.json"] {
        Mock::given(method("GET"))
            .and(path(node))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(server)
            .await;
    }
}

fn mount_log_push(server: &MockServer) -> impl std::future::Future<Output = ()> + '_ {
    Mock::given(method("POST"))
        .and(path("/log.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "-Nabc123"})))
        .mount(server)
}

/// Field edits are read-modify-write: mount the single-strip GET that
/// precedes each PUT.
async fn mount_strip_get(server: &MockServer, id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/strips/{id}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn refresh_unions_configs_and_checkins() {
    let server = MockServer::start().await;
    mount_refresh(
        &server,
        json!({
            "1111": config_json("Porch", "outside", "rainbow", true),
            "2222": config_json("Shed", "outside", "off", false),
        }),
        json!({
            // 1111 reports the config it was told to run: settled.
            "1111": {
                "config": config_json("Porch", "outside", "rainbow", true),
                "ip": "10.0.0.11",
                "rssi": -50,
                "timestamp": 1_700_000_000_000_i64,
                "mac": "AA:11",
            },
            // 3333 has checked in but has no desired config yet.
            "3333": {
                "ip": "10.0.0.33",
                "rssi": -70,
                "timestamp": 1_700_000_001_000_i64,
                "mac": "CC:33",
            },
        }),
    )
    .await;

    let controller = Controller::new(config_for(&server));
    controller.connect().await.expect("connect");

    let store = controller.store();
    assert_eq!(store.strip_count(), 3);

    let porch = store.strip(&StripId::from("1111")).expect("porch exists");
    assert_eq!(porch.status(), SyncStatus::Settled);
    assert_eq!(porch.name(), Some("Porch"));
    assert_eq!(
        porch.last_checkin.as_ref().map(|c| c.ip.as_str()),
        Some("10.0.0.11")
    );

    // Desired config but no device report yet: pending.
    let shed = store.strip(&StripId::from("2222")).expect("shed exists");
    assert_eq!(shed.status(), SyncStatus::Pending);

    // A checkin-only strip still appears in the fleet.
    let ghost = store.strip(&StripId::from("3333")).expect("3333 exists");
    assert!(ghost.next.is_none());
    assert!(ghost.last_checkin.is_some());

    controller.disconnect().await;
}

#[tokio::test]
async fn set_field_preserves_untouched_fields() {
    let server = MockServer::start().await;
    mount_refresh(
        &server,
        json!({"1111": config_json("Porch", "outside", "off", true)}),
        json!(null),
    )
    .await;
    mount_log_push(&server).await;
    mount_strip_get(&server, "1111", config_json("Porch", "outside", "off", true)).await;

    // The PUT must carry the whole record with only `mode` changed:
    // name, group, and crucially `enabled` survive.
    Mock::given(method("PUT"))
        .and(path("/strips/1111.json"))
        .and(body_json(config_json("Porch", "outside", "fire", true)))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.connect().await.expect("connect");

    let result = controller
        .execute(Command::SetFieldById {
            id: StripId::from("1111"),
            field: blinky_core::ConfigField::Mode(Mode::Fire),
        })
        .await
        .expect("set field");
    assert!(matches!(result, CommandResult::Ok));

    // Local store reflects the write without another refresh.
    let strip = controller.strip(&StripId::from("1111")).expect("strip");
    assert_eq!(strip.next.as_ref().map(|c| c.mode), Some(Mode::Fire));
    assert_eq!(strip.next.as_ref().map(|c| c.enabled), Some(true));

    controller.disconnect().await;
}

#[tokio::test]
async fn group_selector_fans_out_to_every_member() {
    let server = MockServer::start().await;
    mount_refresh(
        &server,
        json!({
            "1111": config_json("Porch", "outside", "off", false),
            "2222": config_json("Shed", "outside", "off", false),
            "3333": config_json("Desk", "office", "off", false),
        }),
        json!(null),
    )
    .await;
    mount_log_push(&server).await;

    mount_strip_get(&server, "1111", config_json("Porch", "outside", "off", false)).await;
    mount_strip_get(&server, "2222", config_json("Shed", "outside", "off", false)).await;
    for id in ["1111", "2222"] {
        Mock::given(method("PUT"))
            .and(path(format!("/strips/{id}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("PUT"))
        .and(path("/strips/3333.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(0)
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.connect().await.expect("connect");

    let result = controller
        .execute(Command::SetField {
            selector: "outside".into(),
            field: blinky_core::ConfigField::Enabled(true),
        })
        .await
        .expect("fan-out");

    match result {
        CommandResult::Fanout(report) => {
            assert_eq!(report.len(), 2);
            assert!(report.is_success());
        }
        other => panic!("expected fan-out report, got {other:?}"),
    }

    controller.disconnect().await;
}

#[tokio::test]
async fn fanout_reports_partial_failure() {
    let server = MockServer::start().await;
    mount_refresh(
        &server,
        json!({
            "1111": config_json("Porch", "outside", "off", false),
            "2222": config_json("Shed", "outside", "off", false),
        }),
        json!(null),
    )
    .await;
    mount_log_push(&server).await;

    mount_strip_get(&server, "1111", config_json("Porch", "outside", "off", false)).await;
    mount_strip_get(&server, "2222", config_json("Shed", "outside", "off", false)).await;
    Mock::given(method("PUT"))
        .and(path("/strips/1111.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/strips/2222.json"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Permission denied"})),
        )
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.connect().await.expect("connect");

    let result = controller
        .execute(Command::SetField {
            selector: "outside".into(),
            field: blinky_core::ConfigField::Enabled(true),
        })
        .await
        .expect("fan-out itself succeeds");

    match result {
        CommandResult::Fanout(report) => {
            assert!(!report.is_success());
            let failed = report.failed();
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].id, StripId::from("2222"));
            assert!(
                failed[0]
                    .error
                    .as_deref()
                    .is_some_and(|e| e.contains("Permission denied"))
            );
        }
        other => panic!("expected fan-out report, got {other:?}"),
    }

    controller.disconnect().await;
}

#[tokio::test]
async fn failed_globals_write_stops_enable_all() {
    let server = MockServer::start().await;
    mount_refresh(
        &server,
        json!({"1111": config_json("Porch", "outside", "off", false)}),
        json!(null),
    )
    .await;

    Mock::given(method("PUT"))
        .and(path("/globals.json"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Permission denied"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    // The global switch write failed, so no strip may be touched.
    Mock::given(method("PUT"))
        .and(path("/strips/1111.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(0)
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.connect().await.expect("connect");

    let err = controller
        .execute(Command::SetAllEnabled(true))
        .await
        .expect_err("globals write fails");
    assert!(matches!(err, CoreError::StoreWrite { .. }));

    controller.disconnect().await;
}

#[tokio::test]
async fn enable_all_writes_globals_and_every_strip() {
    let server = MockServer::start().await;
    mount_refresh(
        &server,
        json!({
            "1111": config_json("Porch", "outside", "off", false),
            "2222": config_json("Shed", "outside", "off", false),
        }),
        json!(null),
    )
    .await;
    mount_log_push(&server).await;

    Mock::given(method("PUT"))
        .and(path("/globals.json"))
        .and(body_json(json!({"allEnabled": true})))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&server)
        .await;
    for (id, name) in [("1111", "Porch"), ("2222", "Shed")] {
        mount_strip_get(&server, id, config_json(name, "outside", "off", false)).await;
        Mock::given(method("PUT"))
            .and(path(format!("/strips/{id}.json")))
            .and(body_json(config_json(name, "outside", "off", true)))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .expect(1)
            .mount(&server)
            .await;
    }

    let controller = Controller::new(config_for(&server));
    controller.connect().await.expect("connect");

    let result = controller
        .execute(Command::SetAllEnabled(true))
        .await
        .expect("enable all");
    assert!(matches!(result, CommandResult::Fanout(r) if r.is_success()));
    assert!(controller.globals().all_enabled);

    controller.disconnect().await;
}

#[tokio::test]
async fn strip_arriving_after_enable_all_keeps_its_own_enabled() {
    let server = MockServer::start().await;

    // The first strips read sees only 1111. The second also returns
    // 9999, a strip that appeared while the fan-out was already done.
    Mock::given(method("GET"))
        .and(path("/strips.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "1111": config_json("Porch", "outside", "off", false),
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/strips.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "1111": config_json("Porch", "outside", "off", true),
            "9999": config_json("Attic", "inside", "off", false),
        })))
        .mount(&server)
        .await;
    for node in ["/checkin.json", "/firmware.json", "/log.json", "/globals.json"] {
        Mock::given(method("GET"))
            .and(path(node))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;
    }
    mount_log_push(&server).await;

    Mock::given(method("PUT"))
        .and(path("/globals.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&server)
        .await;
    mount_strip_get(&server, "1111", config_json("Porch", "outside", "off", false)).await;
    Mock::given(method("PUT"))
        .and(path("/strips/1111.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&server)
        .await;
    // The fan-out covers strips known at call time; the latecomer is
    // never written and keeps its own switch state.
    Mock::given(method("PUT"))
        .and(path("/strips/9999.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(0)
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.connect().await.expect("connect");

    let result = controller
        .execute(Command::SetAllEnabled(true))
        .await
        .expect("enable all");
    assert!(matches!(result, CommandResult::Fanout(r) if r.is_success()));

    controller.full_refresh().await.expect("refresh");
    let attic = controller
        .strip(&StripId::from("9999"))
        .expect("latecomer exists");
    assert_eq!(attic.next.as_ref().map(|c| c.enabled), Some(false));

    controller.disconnect().await;
}

#[tokio::test]
async fn delete_strip_removes_checkin_then_config() {
    let server = MockServer::start().await;
    mount_refresh(
        &server,
        json!({"1111": config_json("Porch", "outside", "off", false)}),
        json!({
            "1111": {
                "ip": "10.0.0.11",
                "rssi": -50,
                "timestamp": 1_700_000_000_000_i64,
                "mac": "AA:11",
            }
        }),
    )
    .await;
    mount_log_push(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/checkin/1111.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/strips/1111.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.connect().await.expect("connect");

    controller
        .execute(Command::DeleteStrip {
            id: StripId::from("1111"),
        })
        .await
        .expect("delete");

    assert!(controller.strip(&StripId::from("1111")).is_none());

    // Checkin deletion must precede config deletion, or a crash between
    // the two leaves a ghost row.
    let requests = server.received_requests().await.expect("recording on");
    let deletes: Vec<&str> = requests
        .iter()
        .filter(|r| r.method.as_str() == "DELETE")
        .map(|r| r.url.path())
        .collect();
    assert_eq!(deletes, vec!["/checkin/1111.json", "/strips/1111.json"]);

    controller.disconnect().await;
}

#[tokio::test]
async fn malformed_firmware_never_touches_the_store() {
    let server = MockServer::start().await;
    mount_refresh(&server, json!(null), json!(null)).await;

    let controller = Controller::new(config_for(&server));
    controller.connect().await.expect("connect");
    let refresh_requests = server
        .received_requests()
        .await
        .expect("recording on")
        .len();

    let err = controller
        .execute(Command::UploadFirmware {
            filename: "blinky.bin".into(),
            bytes: b"not a firmware image at all".to_vec(),
        })
        .await
        .expect_err("magic string missing");
    assert!(matches!(err, CoreError::MalformedFirmware { filename } if filename == "blinky.bin"));

    // No upload, no metadata write, no log entry.
    let requests = server.received_requests().await.expect("recording on");
    assert_eq!(requests.len(), refresh_requests);

    controller.disconnect().await;
}

#[tokio::test]
async fn set_mode_intent_targets_a_whole_group() {
    let server = MockServer::start().await;
    mount_refresh(
        &server,
        json!({
            "1111": config_json("Porch", "outside", "off", true),
            "2222": config_json("Shed", "outside", "off", true),
        }),
        json!(null),
    )
    .await;
    mount_log_push(&server).await;

    for (id, name) in [("1111", "Porch"), ("2222", "Shed")] {
        mount_strip_get(&server, id, config_json(name, "outside", "off", true)).await;
        let mut expected = config_json(name, "outside", "off", true);
        expected["red"] = json!(255);
        expected["green"] = json!(0);
        expected["blue"] = json!(0);
        Mock::given(method("PUT"))
            .and(path(format!("/strips/{id}.json")))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .expect(1)
            .mount(&server)
            .await;
    }

    let controller = Controller::new(config_for(&server));
    controller.connect().await.expect("connect");

    let response = controller
        .handle_intent(Intent::SetMode {
            device: "outside".into(),
            mode: None,
            color: Some("red".into()),
        })
        .await
        .expect("intent");
    assert_eq!(response, "Okay, I've set outside to red.");

    controller.disconnect().await;
}

#[tokio::test]
async fn unknown_device_intent_answers_politely_without_writing() {
    let server = MockServer::start().await;
    mount_refresh(
        &server,
        json!({"1111": config_json("Porch", "outside", "off", true)}),
        json!(null),
    )
    .await;

    let controller = Controller::new(config_for(&server));
    controller.connect().await.expect("connect");
    let before = server.received_requests().await.expect("recording on").len();

    let response = controller
        .handle_intent(Intent::SetMode {
            device: "garage".into(),
            mode: Some("fire".into()),
            color: None,
        })
        .await
        .expect("polite miss");
    assert!(response.contains("don't know about a device or group called garage"));
    assert!(response.contains("Porch"));

    let after = server.received_requests().await.expect("recording on").len();
    assert_eq!(before, after);

    controller.disconnect().await;
}
