// Integration tests for `CloudClient` using wiremock.
#![allow(clippy::unwrap_used)]

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cloudtel_api::{CloudClient, DpValue, Error, LogQuery, RequestSigner};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CloudClient) {
    let server = MockServer::start().await;
    let signer = RequestSigner::new("client-abc", SecretString::from("s3cr3t".to_string()));
    let base = Url::parse(&server.uri()).unwrap();
    let client = CloudClient::with_client(reqwest::Client::new(), base, signer);
    (server, client)
}

fn token() -> SecretString {
    SecretString::from("tok-123".to_string())
}

// ── Token grant ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_token_grant_is_signed_without_access_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/token"))
        .and(query_param("grant_type", "1"))
        .and(header("client_id", "client-abc"))
        .and(header("sign_method", "HMAC-SHA256"))
        .and(header_exists("sign"))
        .and(header_exists("t"))
        .and(header_exists("nonce"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "t": 1_700_000_000_000_i64,
            "result": {
                "access_token": "tok-123",
                "expire_time": 7200,
                "refresh_token": "ref-1",
                "uid": "u1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let grant = client.request_token().await.unwrap();
    assert_eq!(grant.access_token, "tok-123");
    assert_eq!(grant.expire_time, 7200);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("access_token").is_none());
}

#[tokio::test]
async fn test_token_refusal_maps_to_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "code": 1004,
            "msg": "sign invalid"
        })))
        .mount(&server)
        .await;

    let err = client.request_token().await.unwrap_err();
    match err {
        Error::Authentication { message } => assert!(message.contains("sign invalid")),
        other => panic!("expected Authentication, got {other:?}"),
    }
}

// ── Device status ───────────────────────────────────────────────────

#[tokio::test]
async fn test_device_status_returns_codes_verbatim() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/iot-03/devices/dev-1/status"))
        .and(header("access_token", "tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [
                { "code": "temp_current", "value": 235 },
                { "code": "battery_state", "value": "high" },
                { "code": "switch", "value": false }
            ]
        })))
        .mount(&server)
        .await;

    let points = client.device_status("dev-1", &token()).await.unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0].code, "temp_current");
    assert_eq!(points[0].value, DpValue::Integer(235));
    assert_eq!(points[1].value, DpValue::Text("high".into()));
    assert_eq!(points[2].value, DpValue::Bool(false));
}

#[tokio::test]
async fn test_vendor_failure_surfaces_code_and_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/iot-03/devices/dev-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "code": 1010,
            "msg": "token invalid"
        })))
        .mount(&server)
        .await;

    let err = client.device_status("dev-1", &token()).await.unwrap_err();
    assert!(err.is_token_rejected());
    match err {
        Error::Vendor { code, message } => {
            assert_eq!(code, 1010);
            assert_eq!(message, "token invalid");
        }
        other => panic!("expected Vendor, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_401_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/iot-03/devices/dev-1/status"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.device_status("dev-1", &token()).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
}

#[tokio::test]
async fn test_malformed_body_keeps_raw_text() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/iot-03/devices/dev-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client.device_status("dev-1", &token()).await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("gateway")),
        other => panic!("expected Deserialization, got {other:?}"),
    }
}

// ── Specification ───────────────────────────────────────────────────

#[tokio::test]
async fn test_specification_keeps_declared_order() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/iot-03/devices/dev-1/specification"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {
                "category": "wsdcg",
                "functions": [],
                "status": [
                    { "code": "temp_current", "name": "Temperature", "type": "Integer",
                      "values": "{\"unit\":\"℃\",\"min\":-200,\"max\":600,\"scale\":1,\"step\":1}" },
                    { "code": "ph_current", "name": "pH", "type": "Integer", "values": "{}" }
                ]
            }
        })))
        .mount(&server)
        .await;

    let spec = client.device_specification("dev-1", &token()).await.unwrap();
    assert_eq!(spec.category, "wsdcg");
    assert_eq!(spec.status.len(), 2);
    assert_eq!(spec.status[0].code, "temp_current");
    assert_eq!(spec.status[1].code, "ph_current");
    let declared = spec.status[0].declared_values().unwrap();
    assert_eq!(declared.max, Some(600.0));
}

// ── Report logs ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_report_logs_sends_window_and_codes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v2.0/cloud/thing/dev-1/report-logs"))
        .and(query_param("codes", "temp_current"))
        .and(query_param("start_time", "1000"))
        .and(query_param("end_time", "2000"))
        .and(query_param("size", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [
                { "code": "temp_current", "value": "231", "time": 1900 },
                { "code": "temp_current", "value": 229, "time": 1500 }
            ]
        })))
        .mount(&server)
        .await;

    let query = LogQuery {
        codes: &["temp_current"],
        start_time: 1000,
        end_time: 2000,
        size: 20,
    };
    let logs = client.report_logs("dev-1", &query, &token()).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].time, 1900);
    assert_eq!(logs[0].value.as_f64(), Some(231.0));
}

#[tokio::test]
async fn test_signature_header_covers_query_string() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": []
        })))
        .mount(&server)
        .await;

    let query = LogQuery {
        codes: &["temp_current"],
        start_time: 1,
        end_time: 2,
        size: 5,
    };
    client.report_logs("dev-1", &query, &token()).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let req = &received[0];
    let t: i64 = req.headers.get("t").unwrap().to_str().unwrap().parse().unwrap();
    let nonce = req.headers.get("nonce").unwrap().to_str().unwrap().to_owned();
    let sent_sign = req.headers.get("sign").unwrap().to_str().unwrap().to_owned();

    let signer = RequestSigner::new("client-abc", SecretString::from("s3cr3t".to_string()));
    let expected = signer
        .sign_at(
            &reqwest::Method::GET,
            "/v2.0/cloud/thing/dev-1/report-logs?codes=temp_current&start_time=1&end_time=2&size=5",
            b"",
            Some(&token()),
            t,
            &nonce,
        )
        .unwrap();
    assert_eq!(sent_sign, expected.sign);
    assert_eq!(
        req.headers.get("access_token").unwrap().to_str().unwrap(),
        token().expose_secret()
    );
}
