//! Router tests driven through `tower::ServiceExt::oneshot`, with hand-built multipart bodies.

use api_rest::{router, AppState};
use axum::{
    body::{Body, Bytes},
    http::{header, Request, StatusCode},
    Router,
};
use futures::stream::{self, StreamExt};
use relay_core::backend::LocalBackend;
use relay_core::{BackendConfig, FtpConfig, LocalConfig, RelayConfig, RelayServices};
use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "relay-test-boundary";

fn local_app(root: &Path) -> Router {
    local_app_with_timeout(root, Duration::from_secs(5))
}

fn local_app_with_timeout(root: &Path, timeout: Duration) -> Router {
    let services = RelayServices::with_backend(
        Arc::new(LocalBackend::new(LocalConfig {
            root: root.to_path_buf(),
        })),
        timeout,
    );
    router(AppState::from(services))
}

/// An app pointed at an FTP port nothing listens on.
fn unreachable_ftp_app() -> Router {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = RelayConfig::new(
        BackendConfig::Ftp(FtpConfig {
            host: "127.0.0.1".into(),
            port,
            user: "ons-inbound".into(),
            password: "ons-inbound".into(),
            root: String::new(),
            timeout: Duration::from_secs(2),
        }),
        Duration::from_secs(2),
    )
    .unwrap();
    router(AppState::from(RelayServices::from_config(&config)))
}

fn multipart_body(parts: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, content) in parts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"upload.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn upload_creates_container_and_stores_file() {
    let temp = TempDir::new().unwrap();
    let app = local_app(temp.path());

    let body = multipart_body(&[("file", &b"a,b\n1,2\n"[..])]);
    let (status, text) = send(app, upload_request("/upload/12345/report.csv", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "OK");
    assert_eq!(
        std::fs::read(temp.path().join("12345").join("report.csv")).unwrap(),
        b"a,b\n1,2\n"
    );
}

#[tokio::test]
async fn other_parts_before_file_are_ignored() {
    let temp = TempDir::new().unwrap();
    let app = local_app(temp.path());

    let body = multipart_body(&[("comment", &b"ignore me"[..]), ("file", &b"payload"[..])]);
    let (status, _) = send(app, upload_request("/upload/777/data.bin", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        std::fs::read(temp.path().join("777").join("data.bin")).unwrap(),
        b"payload"
    );
}

#[tokio::test]
async fn upload_larger_than_default_body_limit_is_accepted() {
    let temp = TempDir::new().unwrap();
    let app = local_app(temp.path());

    let data: Vec<u8> = (0..3 * 1024 * 1024 + 5).map(|i| (i % 253) as u8).collect();
    let body = multipart_body(&[("file", data.as_slice())]);
    let (status, _) = send(app, upload_request("/upload/big/blob.bin", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        std::fs::read(temp.path().join("big").join("blob.bin")).unwrap(),
        data
    );
}

#[tokio::test]
async fn missing_file_part_is_bad_request_and_creates_nothing() {
    let temp = TempDir::new().unwrap();
    let app = local_app(temp.path());

    let body = multipart_body(&[("attachment", &b"wrong name"[..])]);
    let (status, text) = send(app, upload_request("/upload/12345/report.csv", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(text.starts_with("Error uploading file: "), "{text}");
    assert!(!temp.path().join("12345").exists());
}

#[tokio::test]
async fn non_multipart_body_is_bad_request() {
    let temp = TempDir::new().unwrap();
    let app = local_app(temp.path());

    let request = Request::builder()
        .method("POST")
        .uri("/upload/12345/report.csv")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("a,b\n1,2\n"))
        .unwrap();
    let (status, text) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(text.starts_with("Error uploading file: "), "{text}");
    assert!(!temp.path().join("12345").exists());
}

#[tokio::test]
async fn traversal_in_collection_id_is_rejected() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("root");
    let app = local_app(&root);

    let body = multipart_body(&[("file", &b"x"[..])]);
    let (status, text) = send(app, upload_request("/upload/%2E%2E/evil.txt", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(text.starts_with("Error uploading file: "), "{text}");
    assert!(!temp.path().join("evil.txt").exists());
}

#[tokio::test]
async fn separator_in_filename_is_rejected() {
    let temp = TempDir::new().unwrap();
    let app = local_app(temp.path());

    let body = multipart_body(&[("file", &b"x"[..])]);
    let (status, _) = send(app, upload_request("/upload/12345/a%2Fb.txt", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!temp.path().join("12345").exists());
}

#[tokio::test]
async fn stalled_body_before_file_part_times_out() {
    let temp = TempDir::new().unwrap();
    let app = local_app_with_timeout(temp.path(), Duration::from_millis(300));

    // A leading part whose content never arrives.
    let preamble = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"comment\"\r\n\r\n"
    );
    let body = stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from(preamble))])
        .chain(stream::pending());
    let request = Request::builder()
        .method("POST")
        .uri("/upload/12345/report.csv")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from_stream(body))
        .unwrap();

    let (status, text) = tokio::time::timeout(Duration::from_secs(5), send(app, request))
        .await
        .expect("request is bounded by the configured timeout");

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(text.starts_with("Error uploading file: "), "{text}");
    assert!(text.contains("did not complete"), "{text}");
    assert!(!temp.path().join("12345").exists());
}

#[tokio::test]
async fn unreachable_storage_is_server_error() {
    let app = unreachable_ftp_app();

    let body = multipart_body(&[("file", &b"x"[..])]);
    let (status, text) = send(app, upload_request("/upload/12345/report.csv", body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(text.starts_with("Error uploading file: "), "{text}");
    assert!(text.contains("unavailable"), "{text}");
}

#[tokio::test]
async fn healthcheck_reports_ok() {
    let temp = TempDir::new().unwrap();
    let app = local_app(temp.path());

    let request = Request::get("/healthcheck").body(Body::empty()).unwrap();
    let (status, text) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json, serde_json::json!({"Status": "OK", "Ftp": "OK"}));
}

#[tokio::test]
async fn healthcheck_reports_failed_with_200() {
    let app = unreachable_ftp_app();

    let request = Request::get("/healthcheck").body(Body::empty()).unwrap();
    let (status, text) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json, serde_json::json!({"Status": "FAILED", "Ftp": "FAILED"}));
}

#[tokio::test]
async fn openapi_document_lists_routes() {
    let temp = TempDir::new().unwrap();
    let app = local_app(temp.path());

    let request = Request::get("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();
    let (status, text) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(json["paths"].get("/healthcheck").is_some());
    assert!(json["paths"].get("/upload/{id}/{filename}").is_some());
}
