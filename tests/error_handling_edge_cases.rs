//! Upload validation errors and failure paths

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::*;
use image::ImageFormat;
use serde_json::json;
use u2net_serve::{backends::MockBackend, build_router, AppState, BackgroundRemovalProcessor};

async fn assert_bad_request(request: Request<Body>, expected: &str) {
    let response = send(&mock_router(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    assert_eq!(body_json(response).await, json!({ "error": expected }));
}

#[tokio::test]
async fn test_missing_file_field() {
    let request = multipart_request(
        "/remove",
        &[Part {
            name: "image",
            file_name: Some("photo.png"),
            data: b"data",
        }],
    );
    assert_bad_request(request, "missing file").await;
}

#[tokio::test]
async fn test_file_field_without_file_name_is_missing() {
    let request = multipart_request(
        "/remove_hamming",
        &[Part {
            name: "file",
            file_name: None,
            data: b"plain text value",
        }],
    );
    assert_bad_request(request, "missing file").await;
}

#[tokio::test]
async fn test_empty_form_is_missing_file() {
    assert_bad_request(multipart_request("/remove", &[]), "missing file").await;
}

#[tokio::test]
async fn test_non_multipart_body_is_missing_file() {
    let request = Request::builder()
        .method("POST")
        .uri("/remove")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"file":"x"}"#))
        .unwrap();
    assert_bad_request(request, "missing file").await;
}

#[tokio::test]
async fn test_invalid_extensions() {
    for file_name in ["photo.gif", "photo.jpg.exe", "photo", "photo.", "archive.webp"] {
        let request = multipart_request("/remove", &[Part::file(file_name, b"data")]);
        assert_bad_request(request, "invalid file format").await;
    }
}

#[tokio::test]
async fn test_extension_checked_before_emptiness() {
    let request = multipart_request("/remove_nearest", &[Part::file("empty.bmp", b"")]);
    assert_bad_request(request, "invalid file format").await;
}

#[tokio::test]
async fn test_empty_payload() {
    for filter in u2net_serve::ResampleFilter::ALL {
        let request = multipart_request(filter.route(), &[Part::file("empty.png", b"")]);
        assert_bad_request(request, "empty image").await;
    }
}

#[tokio::test]
async fn test_undecodable_image_is_server_error() {
    let router = mock_router();
    let request = multipart_request("/remove", &[Part::file("fake.jpg", b"definitely not a jpeg")]);
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_inference_failure_details_in_debug_mode() {
    let router = router_with(Box::new(MockBackend::failing()), true);
    let png = encode(&split_image(8, 8), ImageFormat::Png);

    let response = send(&router, multipart_request("/remove", &[Part::file("a.png", &png)])).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(response).await.contains("Mock backend configured to fail"));
}

#[tokio::test]
async fn test_inference_failure_hidden_without_debug() {
    let router = router_with(Box::new(MockBackend::failing()), false);
    let png = encode(&split_image(8, 8), ImageFormat::Png);

    let response = send(&router, multipart_request("/remove", &[Part::file("a.png", &png)])).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_string(response).await, "Internal Server Error");
}

#[tokio::test]
async fn test_server_recovers_after_failed_request() {
    let router = mock_router();
    let png = encode(&split_image(8, 8), ImageFormat::Png);

    let bad = send(&router, multipart_request("/remove", &[Part::file("x.png", b"garbage")])).await;
    assert_eq!(bad.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let good = send(&router, multipart_request("/remove", &[Part::file("x.png", &png)])).await;
    assert_eq!(good.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let processor = BackgroundRemovalProcessor::new(Box::new(MockBackend::new()), [83, 40, 130]);
    let router = build_router(AppState::new(processor, true), 1024);
    let payload = vec![7u8; 8 * 1024];

    let response =
        send(&router, multipart_request("/remove", &[Part::file("big.png", &payload)])).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
