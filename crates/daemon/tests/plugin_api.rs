//! Docker plugin protocol tests, driving the router in-process.

mod support;

use std::time::Duration;

use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use minfs_daemon::http_server;

use support::{RecordingBackend, TestRegistry};

const DOCKER_CONTENT_TYPE: &str = "application/vnd.docker.plugins.v1.2+json";

async fn post(router: &Router, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri(path);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", DOCKER_CONTENT_TYPE);
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn create_body(name: &str, bucket: &str) -> Value {
    json!({
        "Name": name,
        "Opts": {
            "endpoint": "https://play.min.io",
            "bucket": bucket,
            "access-key": "AK",
            "secret-key": "SK",
        }
    })
}

#[tokio::test]
async fn test_activate_and_capabilities() {
    let t = TestRegistry::new();
    let router = http_server::router(t.state());

    let (status, body) = post(&router, "/Plugin.Activate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"Implements": ["VolumeDriver"]}));

    let (status, body) = post(&router, "/VolumeDriver.Capabilities", Some(Value::Null)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"Capabilities": {"Scope": "local"}}));
}

#[tokio::test]
async fn test_volume_lifecycle_over_http() {
    let t = TestRegistry::new();
    let router = http_server::router(t.state());
    let mountpoint = t.path_of("data").display().to_string();

    let (status, body) = post(&router, "/VolumeDriver.Create", Some(create_body("data", "imgs"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"Err": ""}));

    let (status, body) = post(
        &router,
        "/VolumeDriver.Mount",
        Some(json!({"Name": "data", "ID": "c0ffee"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"Mountpoint": mountpoint, "Err": ""}));

    let (_, body) = post(&router, "/VolumeDriver.Path", Some(json!({"Name": "data"}))).await;
    assert_eq!(body["Mountpoint"], mountpoint);

    let (status, body) = post(&router, "/VolumeDriver.Get", Some(json!({"Name": "data"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Volume"]["Name"], "data");
    assert_eq!(body["Volume"]["Mountpoint"], mountpoint);
    assert_eq!(body["Volume"]["Status"]["ref_count"], 1);
    assert_eq!(body["Volume"]["Status"]["bound"], true);
    assert_eq!(body["Volume"]["Status"]["bucket"], "imgs");
    assert!(body["Volume"]["Status"].get("secret_key").is_none());

    let (status, body) = post(&router, "/VolumeDriver.List", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"Volumes": [{"Name": "data", "Mountpoint": mountpoint}], "Err": ""})
    );

    let (status, _) = post(
        &router,
        "/VolumeDriver.Unmount",
        Some(json!({"Name": "data", "ID": "c0ffee"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&router, "/VolumeDriver.Remove", Some(json!({"Name": "data"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"Err": ""}));

    assert_eq!(t.backend.binds(), 1);
    assert_eq!(t.backend.unbinds(), 1);
    assert!(t.registry.enumerate().await.is_empty());
}

#[tokio::test]
async fn test_errors_carry_err_field_and_status() {
    let t = TestRegistry::new();
    let router = http_server::router(t.state());

    // missing options
    let (status, body) = post(
        &router,
        "/VolumeDriver.Create",
        Some(json!({"Name": "x", "Opts": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Err"], "endpoint option cannot be empty");

    // unknown volume
    let (status, body) = post(&router, "/VolumeDriver.Path", Some(json!({"Name": "nope"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["Err"], "volume nope not found");

    // conflicting create
    post(&router, "/VolumeDriver.Create", Some(create_body("data", "imgs"))).await;
    let (status, body) = post(&router, "/VolumeDriver.Create", Some(create_body("data", "other"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["Err"].as_str().unwrap().contains("different bucket"), "{body}");

    // remove while mounted
    post(&router, "/VolumeDriver.Mount", Some(json!({"Name": "data", "ID": "a"}))).await;
    let (status, body) = post(&router, "/VolumeDriver.Remove", Some(json!({"Name": "data"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["Err"].as_str().unwrap().contains("currently used"), "{body}");
}

#[tokio::test]
async fn test_bind_and_provision_failures() {
    let t = TestRegistry::new();
    let router = http_server::router(t.state());

    t.provisioner.set_fail(true);
    let (status, body) = post(&router, "/VolumeDriver.Create", Some(create_body("data", "imgs"))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!body["Err"].as_str().unwrap().is_empty());
    t.provisioner.set_fail(false);

    post(&router, "/VolumeDriver.Create", Some(create_body("data", "imgs"))).await;
    t.backend.set_fail_bind(true);
    let (status, body) = post(&router, "/VolumeDriver.Mount", Some(json!({"Name": "data", "ID": "a"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["Err"].as_str().unwrap().contains("permission denied"), "{body}");
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let t = TestRegistry::new();
    let router = http_server::router(t.state());

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/VolumeDriver.Create")
                .body(Body::from("{\"Name\":"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["Err"].as_str().unwrap().starts_with("invalid request body"));
}

async fn livez(router: &Router) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/_status/livez")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_livez_counts_volumes() {
    let t = TestRegistry::new();
    let router = http_server::router(t.state());

    let (status, body) = livez(&router).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "volumes": 0, "mounted": 0}));

    post(&router, "/VolumeDriver.Create", Some(create_body("a", "imgs"))).await;
    post(&router, "/VolumeDriver.Create", Some(create_body("b", "docs"))).await;
    post(&router, "/VolumeDriver.Mount", Some(json!({"Name": "a", "ID": "c1"}))).await;

    let (_, body) = livez(&router).await;
    assert_eq!(body, json!({"status": "ok", "volumes": 2, "mounted": 1}));
}

#[tokio::test]
async fn test_livez_answers_during_slow_mount() {
    let t = TestRegistry::with_backend(RecordingBackend::with_delay(Duration::from_millis(500)));
    let router = http_server::router(t.state());
    post(&router, "/VolumeDriver.Create", Some(create_body("a", "imgs"))).await;

    let mounting = {
        let router = router.clone();
        tokio::spawn(async move {
            post(&router, "/VolumeDriver.Mount", Some(json!({"Name": "a", "ID": "c1"}))).await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (status, body) = tokio::time::timeout(Duration::from_millis(300), livez(&router))
        .await
        .expect("livez waited on the mount");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, _) = mounting.await.unwrap();
    assert_eq!(status, StatusCode::OK);
}
