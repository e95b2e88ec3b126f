// Integration tests for `DeviceClient` against a wiremock device.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use karotz_api::{
    DeviceClient, EarsCommand, EndpointMap, Error, ErrorKind, LedCommand, Resource,
    TransportConfig, TtsCommand,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer) -> TransportConfig {
    let addr = server.address();
    TransportConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        timeout: Duration::from_secs(2),
    }
}

async fn mount_status(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cgi-bin/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Bunny",
            "model": "Karotz",
            "serial": "KZ-0001",
            "version": "200",
        })))
        .mount(server)
        .await;
}

async fn setup() -> (MockServer, DeviceClient) {
    let server = MockServer::start().await;
    let client = DeviceClient::new(config_for(&server), EndpointMap::default()).unwrap();
    (server, client)
}

async fn connected() -> (MockServer, DeviceClient) {
    let (server, client) = setup().await;
    mount_status(&server).await;
    client.connect().await.unwrap();
    (server, client)
}

// ── Connection lifecycle ────────────────────────────────────────────

#[tokio::test]
async fn test_connect_probes_info_endpoint() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.is_connected());
    client.connect().await.unwrap();
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_connect_failure_leaves_client_disconnected() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 500, .. }), "got {err:?}");
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_disconnect_twice_is_harmless() {
    let (_server, client) = connected().await;
    client.disconnect();
    client.disconnect();
    assert!(!client.is_connected());

    let err = client.get_leds().await.unwrap_err();
    assert!(matches!(err, Error::NotConnected));
    assert_eq!(err.kind(), ErrorKind::Connection);
}

#[tokio::test]
async fn test_unreachable_device_is_connection_error() {
    let config = TransportConfig {
        host: "127.0.0.1".into(),
        port: 9,
        timeout: Duration::from_secs(2),
    };
    let client = DeviceClient::new(config, EndpointMap::default()).unwrap();

    let err = client.connect().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
}

// ── Error classification ────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = connected().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/leds"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.get_leds().await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[tokio::test]
async fn test_invalid_json_keeps_body() {
    let (server, client) = connected().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/ears"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    match client.get_ears().await.unwrap_err() {
        Error::Decode { body, .. } => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected Decode, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let (server, client) = connected().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/sounds"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = client.get_sounds().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { timeout_secs: 2 }), "got {err:?}");
    assert!(err.is_transient());
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_info_is_typed() {
    let (_server, client) = connected().await;

    let info = client.get_info().await.unwrap();
    assert_eq!(info.name.as_deref(), Some("Bunny"));
    assert_eq!(info.serial.as_deref(), Some("KZ-0001"));
    assert_eq!(info.version.as_deref(), Some("200"));
}

#[tokio::test]
async fn test_read_dispatches_by_resource() {
    let (server, client) = connected().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/moods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "moods": [1, 2] })))
        .mount(&server)
        .await;

    let apps = client.read(Resource::Apps).await.unwrap();
    assert_eq!(apps, json!({ "moods": [1, 2] }));
}

#[tokio::test]
async fn test_endpoint_overrides_are_honoured() {
    let server = MockServer::start().await;
    let endpoints = EndpointMap {
        info: "/api/info".into(),
        leds: "/api/light".into(),
        ..EndpointMap::default()
    };
    Mock::given(method("GET"))
        .and(path("/api/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/light"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "color": "blue" })))
        .mount(&server)
        .await;

    let client = DeviceClient::new(config_for(&server), endpoints).unwrap();
    client.connect().await.unwrap();
    assert_eq!(client.get_leds().await.unwrap(), json!({ "color": "blue" }));
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_led_sends_only_given_fields() {
    let (server, client) = connected().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/leds"))
        .and(body_json(json!({ "color": "red", "brightness": 50 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "return": "0" })))
        .expect(1)
        .mount(&server)
        .await;

    let command = LedCommand {
        color: Some("red".into()),
        brightness: Some(50),
        ..LedCommand::default()
    };
    client.set_led(&command).await.unwrap();
}

#[tokio::test]
async fn test_play_tts_omits_voice_when_unset() {
    let (server, client) = connected().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/tts"))
        .and(body_json(json!({ "text": "bonjour", "category": "notification" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut command = TtsCommand::new("bonjour");
    command.category = Some("notification".into());
    client.play_tts(&command).await.unwrap();
}

#[tokio::test]
async fn test_ear_writes_share_endpoint() {
    let (server, client) = connected().await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/ears"))
        .and(body_json(json!({ "left": 4 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/ears"))
        .and(body_json(json!({ "volume": 30 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/ears"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .move_ears(EarsCommand {
            left: Some(4),
            right: None,
        })
        .await
        .unwrap();
    client.set_volume(30).await.unwrap();
    client.stop_audio(None).await.unwrap();
}

#[tokio::test]
async fn test_rfid_assign_uses_query() {
    let (server, client) = connected().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/rfid_assign_url"))
        .and(query_param("tag", "D0021A0353B4A3F2"))
        .and(query_param("url", "http://hub.local/hook"))
        .and(query_param("name", "door"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "return": "0" })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .rfid_assign_url("D0021A0353B4A3F2", "http://hub.local/hook", Some("door"))
        .await
        .unwrap();
}

// ── Probes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_wakeup_works_before_connect() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/wakeup"))
        .and(query_param("silent", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "return": "0" })))
        .expect(1)
        .mount(&server)
        .await;

    client.wakeup(true).await.unwrap();
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_get_version_works_before_connect() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/get_version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "200" })))
        .mount(&server)
        .await;

    assert_eq!(client.get_version().await.unwrap()["version"], "200");
}

#[tokio::test]
async fn test_non_probe_write_requires_connection() {
    let (_server, client) = setup().await;
    let err = client.play_sound("bip", None).await.unwrap_err();
    assert!(matches!(err, Error::NotConnected));
}

#[tokio::test]
async fn test_polled_info_read_requires_connection() {
    let (server, client) = setup().await;
    mount_status(&server).await;

    let err = client.read(Resource::Info).await.unwrap_err();
    assert!(matches!(err, Error::NotConnected));
    assert!(server.received_requests().await.unwrap().is_empty());

    // The explicit call is still a probe.
    assert_eq!(client.get_info().await.unwrap().name.as_deref(), Some("Bunny"));
}
