// Integration tests for `PentairClient` using wiremock.

#![allow(clippy::unwrap_used)]

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pentair_api::{AuthTokens, Error, PentairClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, PentairClient) {
    let server = MockServer::start().await;
    let client = PentairClient::new(
        server.uri().parse().unwrap(),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

fn restored_tokens() -> AuthTokens {
    AuthTokens::restored(
        SecretString::from("access".to_owned()),
        SecretString::from("id-token".to_owned()),
        SecretString::from("refresh".to_owned()),
    )
}

// ── Session tests ───────────────────────────────────────────────────

#[tokio::test]
async fn login_stores_tokens() {
    let (server, client) = setup().await;

    let body = json!({
        "data": {
            "accessToken": "acc-1",
            "idToken": "id-1",
            "refreshToken": "ref-1",
            "expiresIn": 3600,
        }
    });

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "username": "pool@example.com", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    client
        .login("pool@example.com", &SecretString::from("hunter2".to_owned()))
        .await
        .unwrap();

    let tokens = client.tokens().unwrap();
    assert_eq!(tokens.id_token.expose_secret(), "id-1");
    assert_eq!(tokens.refresh_token.expose_secret(), "ref-1");
    assert!(tokens.expires_at.is_some());
    assert!(!tokens.is_expired());
}

#[tokio::test]
async fn login_with_bad_credentials_is_auth_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client
        .login("pool@example.com", &SecretString::from("wrong".to_owned()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication { .. }));
    assert!(err.is_auth());
}

#[tokio::test]
async fn authenticate_without_tokens_fails() {
    let (_server, client) = setup().await;

    let err = client.authenticate().await.unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));
}

#[tokio::test]
async fn authenticate_with_restored_tokens_is_noop() {
    let (_server, client) = setup().await;

    // No mocks mounted: a request would fail, so success proves no I/O.
    client.restore_tokens(restored_tokens());
    client.authenticate().await.unwrap();
}

#[tokio::test]
async fn expired_tokens_trigger_refresh() {
    let (server, client) = setup().await;

    let mut tokens = restored_tokens();
    tokens.expires_at = Some(chrono::Utc::now() - chrono::Duration::seconds(10));
    client.restore_tokens(tokens);

    let body = json!({
        "data": {
            "accessToken": "acc-2",
            "idToken": "id-2",
            "expiresIn": 3600,
        }
    });

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "refresh" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    client.authenticate().await.unwrap();

    let tokens = client.tokens().unwrap();
    assert_eq!(tokens.id_token.expose_secret(), "id-2");
    // Refresh response omitted the refresh token; the old one is kept.
    assert_eq!(tokens.refresh_token.expose_secret(), "refresh");
}

#[tokio::test]
async fn rejected_refresh_is_session_expired() {
    let (server, client) = setup().await;

    client.restore_tokens(restored_tokens());

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.refresh_session().await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired));
}

// ── Device endpoint tests ───────────────────────────────────────────

#[tokio::test]
async fn get_devices_unwraps_envelope() {
    let (server, client) = setup().await;
    client.restore_tokens(restored_tokens());

    let body = json!({
        "data": [
            { "deviceId": "d-1", "deviceType": "PPA0", "nickName": "Sump" },
            { "deviceId": "d-2", "deviceType": "IF31" },
        ]
    });

    Mock::given(method("GET"))
        .and(path("/devices"))
        .and(header("authorization", "Bearer id-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let stubs = client.get_devices().await.unwrap();
    assert_eq!(stubs.len(), 2);
    assert_eq!(stubs[0].device_id, "d-1");
    assert_eq!(stubs[0].device_type, "PPA0");
    assert_eq!(stubs[0].nick_name.as_deref(), Some("Sump"));
    assert_eq!(stubs[1].device_id, "d-2");
}

#[tokio::test]
async fn get_device_parses_detail_record() {
    let (server, client) = setup().await;
    client.restore_tokens(restored_tokens());

    let body = json!({
        "data": {
            "deviceId": "d-2",
            "deviceType": "IF31",
            "nickName": "Pool Pump",
            "maker": "Pentair",
            "model": "IntelliFlo3",
            "softwareVersion": "2.11",
            "online": true,
            "activeProgramNumber": 1,
            "activeProgramName": "Eco",
            "currentPowerConsumption": 540.0,
            "currentMotorSpeed": 62.5,
            "currentEstimatedFlow": 41.0,
            "enabledPrograms": [
                { "id": 1, "name": "Eco" },
                { "id": 2, "name": "Boost" },
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/devices/d-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let device = client.get_device("d-2").await.unwrap();
    assert_eq!(device.device_type, "IF31");
    assert_eq!(device.active_program_name.as_deref(), Some("Eco"));
    assert_eq!(device.enabled_programs.len(), 2);
    assert_eq!(device.enabled_programs[1].id, 2);
    assert_eq!(device.enabled_programs[1].name, "Boost");
}

#[tokio::test]
async fn set_active_program_sends_payload() {
    let (server, client) = setup().await;
    client.restore_tokens(restored_tokens());

    Mock::given(method("PUT"))
        .and(path("/devices/d-2"))
        .and(body_json(json!({ "payload": { "activeProgram": 2 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .expect(1)
        .mount(&server)
        .await;

    client.set_active_program("d-2", 2).await.unwrap();
}

// ── Failure-path tests ──────────────────────────────────────────────

#[tokio::test]
async fn api_error_body_becomes_typed_error() {
    let (server, client) = setup().await;
    client.restore_tokens(restored_tokens());

    let body = json!({ "code": "device.offline", "message": "device is offline" });

    Mock::given(method("GET"))
        .and(path("/devices/d-9"))
        .respond_with(ResponseTemplate::new(409).set_body_json(&body))
        .mount(&server)
        .await;

    let err = client.get_device("d-9").await.unwrap_err();
    match err {
        Error::Api {
            message,
            code,
            status,
        } => {
            assert_eq!(message, "device is offline");
            assert_eq!(code.as_deref(), Some("device.offline"));
            assert_eq!(status, 409);
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_deserialization_error() {
    let (server, client) = setup().await;
    client.restore_tokens(restored_tokens());

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.get_devices().await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_transient() {
    let (server, client) = setup().await;
    client.restore_tokens(restored_tokens());

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "message": "maintenance" })))
        .mount(&server)
        .await;

    let err = client.get_devices().await.unwrap_err();
    assert!(err.is_transient());
}
