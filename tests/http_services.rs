use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use wake_watch::config::{GeoConfig, SmsConfig};
use wake_watch::services::{GeoError, GeoLocator, IpGeolocator, SmsError, SmsSender, TwilioSms};

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    addr
}

fn geo_for(addr: SocketAddr, path: &str) -> IpGeolocator {
    geo_with_timeout(addr, path, 5)
}

fn geo_with_timeout(addr: SocketAddr, path: &str, timeout_secs: u64) -> IpGeolocator {
    IpGeolocator::new(&GeoConfig {
        url: format!("http://{addr}{path}"),
        timeout_secs,
    })
    .expect("geo client")
}

async fn geo_server() -> SocketAddr {
    let app = Router::new()
        .route(
            "/ok",
            get(|| async { Json(json!({"status": "success", "lat": 17.385, "lon": 78.4867})) }),
        )
        .route(
            "/fail",
            get(|| async { Json(json!({"status": "fail", "message": "private range"})) }),
        )
        .route("/garbage", get(|| async { "not json" }))
        .route(
            "/no-coords",
            get(|| async { Json(json!({"status": "success"})) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"status": "success", "lat": 1.0, "lon": 2.0}))
            }),
        );
    serve(app).await
}

#[tokio::test]
async fn it_geolocation_success_builds_maps_link() {
    let addr = geo_server().await;
    let location = geo_for(addr, "/ok").locate().await.unwrap();
    assert_eq!(
        location.maps_link(),
        "https://www.google.com/maps?q=17.385,78.4867"
    );
}

#[tokio::test]
async fn it_geolocation_non_success_status_is_unavailable() {
    let addr = geo_server().await;
    let err = geo_for(addr, "/fail").locate().await.unwrap_err();
    match err {
        GeoError::Unavailable(message) => assert_eq!(message, "private range"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn it_geolocation_bad_body_is_error() {
    let addr = geo_server().await;
    assert!(geo_for(addr, "/garbage").locate().await.is_err());
    assert!(matches!(
        geo_for(addr, "/no-coords").locate().await,
        Err(GeoError::Malformed(_))
    ));
}

#[tokio::test]
async fn it_geolocation_slow_endpoint_times_out() {
    let addr = geo_server().await;
    let started = std::time::Instant::now();
    let err = geo_with_timeout(addr, "/slow", 1).locate().await.unwrap_err();
    assert!(matches!(err, GeoError::Timeout), "unexpected error {err:?}");
    assert!(started.elapsed() < Duration::from_secs(4));
}

type Captured = Arc<Mutex<Vec<(String, HashMap<String, String>, Option<String>)>>>;

async fn twilio_server(status: StatusCode) -> (SocketAddr, Captured) {
    let captured: Captured = Arc::default();
    let app = Router::new()
        .route(
            "/2010-04-01/Accounts/:sid/Messages.json",
            post(
                move |State(captured): State<Captured>,
                      Path(sid): Path<String>,
                      headers: HeaderMap,
                      Form(form): Form<HashMap<String, String>>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    captured.lock().unwrap().push((sid, form, auth));
                    let body: Value = if status.is_success() {
                        json!({"sid": "SM0001", "status": "queued"})
                    } else {
                        json!({"code": 20003, "message": "Authenticate"})
                    };
                    (status, Json(body))
                },
            ),
        )
        .with_state(captured.clone());
    (serve(app).await, captured)
}

fn sms_config(addr: SocketAddr) -> SmsConfig {
    SmsConfig {
        enabled: true,
        api_base: format!("http://{addr}"),
        account_sid: "AC42".to_string(),
        auth_token: "secret".to_string(),
        from_number: "+17752389331".to_string(),
        to_number: "+15550000002".to_string(),
        timeout_secs: 5,
    }
}

#[tokio::test]
async fn it_sms_posts_form_with_basic_auth() {
    let (addr, captured) = twilio_server(StatusCode::CREATED).await;
    let sms = TwilioSms::new(&sms_config(addr)).unwrap();

    let sid = sms.send("Drowsiness Alert! Location: x").await.unwrap();
    assert_eq!(sid, "SM0001");

    let calls = captured.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (account, form, auth) = &calls[0];
    assert_eq!(account, "AC42");
    assert_eq!(form["Body"], "Drowsiness Alert! Location: x");
    assert_eq!(form["From"], "+17752389331");
    assert_eq!(form["To"], "+15550000002");
    // base64("AC42:secret")
    assert_eq!(auth.as_deref(), Some("Basic QUM0MjpzZWNyZXQ="));
}

#[tokio::test]
async fn it_sms_api_error_carries_status() {
    let (addr, _captured) = twilio_server(StatusCode::UNAUTHORIZED).await;
    let sms = TwilioSms::new(&sms_config(addr)).unwrap();

    match sms.send("hello").await {
        Err(SmsError::ApiError { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Authenticate");
        }
        other => panic!("unexpected result {other:?}"),
    }
}
