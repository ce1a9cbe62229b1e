//! Upload endpoint integration tests.
//!
//! Run with: `cargo test -p snapvault-api --test upload_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::{file_form, noise_png, setup_test_app, setup_test_app_with};
use snapvault_db::UploadRepository;
use snapvault_processing::test_helpers::{FailingStorage, FailingUploadRepository, MemoryStorage};
use std::sync::Arc;

#[tokio::test]
async fn test_upload_png_returns_record() {
    let app = setup_test_app();
    let png = noise_png(100, 80);

    let response = app
        .client()
        .post("/api/v1/upload")
        .add_header("X-Forwarded-For", "203.0.113.5, 10.0.0.1")
        .multipart(file_form("Résumé Photo.png", png.clone()))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "File uploaded successfully");
    assert_eq!(body["record"]["original_name"], "R_sum__Photo.png");
    assert_eq!(body["record"]["byte_size"], png.len() as i64);
    assert_eq!(body["record"]["width"], 100);
    assert_eq!(body["record"]["height"], 80);
    assert_eq!(body["optimized"], false);
    assert!(body["record"].get("source_address").is_none());

    let id = body["record"]["id"].as_i64().unwrap();
    let stored = app.repository.get(id).await.unwrap().unwrap();
    assert_eq!(stored.source_address.as_deref(), Some("203.0.113.5"));
    assert_eq!(app.storage.get(&stored.storage_key), Some(png));
}

#[tokio::test]
async fn test_legacy_upload_path() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/upload")
        .multipart(file_form("a.png", noise_png(20, 20)))
        .await;
    assert_eq!(response.status_code(), 201);
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = setup_test_app();
    let form = MultipartForm::new().add_text("comment", "no file here");

    let response = app.client().post("/api/v1/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NO_FILE");
    assert_eq!(app.storage.upload_calls(), 0);
}

#[tokio::test]
async fn test_empty_filename() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/api/v1/upload")
        .multipart(file_form("", noise_png(20, 20)))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NO_FILE");
}

#[tokio::test]
async fn test_non_multipart_body() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/api/v1/upload")
        .json(&serde_json::json!({ "file": "nope" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NO_FILE");
}

#[tokio::test]
async fn test_two_file_fields_rejected() {
    let app = setup_test_app();
    let form = MultipartForm::new()
        .add_part("file", Part::bytes(noise_png(20, 20)).file_name("a.png"))
        .add_part("file", Part::bytes(noise_png(20, 20)).file_name("b.png"));

    let response = app.client().post("/api/v1/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NO_FILE");
    assert_eq!(app.storage.upload_calls(), 0);
}

#[tokio::test]
async fn test_unsupported_extension() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/api/v1/upload")
        .multipart(file_form("notes.txt", vec![b'a'; 500]))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_TYPE");
    assert_eq!(body["recoverable"], true);
}

#[tokio::test]
async fn test_too_small() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/api/v1/upload")
        .multipart(file_form("tiny.png", vec![0u8; 99]))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "FILE_TOO_SMALL");
}

#[tokio::test]
async fn test_oversized_upload_is_413_without_side_effects() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/api/v1/upload")
        .multipart(file_form("huge.jpg", vec![0u8; 20 * 1024 * 1024]))
        .await;

    assert_eq!(response.status_code(), 413);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "FILE_TOO_LARGE");
    assert_eq!(app.storage.upload_calls(), 0);
    assert_eq!(app.repository.insert_calls(), 0);
}

#[tokio::test]
async fn test_undecodable_image() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/api/v1/upload")
        .multipart(file_form("fake.jpg", vec![0x42; 2048]))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_IMAGE");
}

#[tokio::test]
async fn test_dimension_limit() {
    let app = setup_test_app_with(&[("MAX_IMAGE_DIMENSION", "50")]);
    let response = app
        .client()
        .post("/api/v1/upload")
        .multipart(file_form("wide.png", noise_png(51, 10)))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "IMAGE_TOO_LARGE");
}

#[tokio::test]
async fn test_storage_failure_is_500() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = helpers::test_config(&temp_dir.path().to_string_lossy(), &[]);
    let storage = Arc::new(FailingStorage::new());
    let repository = Arc::new(snapvault_processing::test_helpers::InMemoryUploadRepository::new());
    let server = helpers::build_server(config, storage, repository.clone());

    let response = server
        .post("/api/v1/upload")
        .multipart(file_form("a.png", noise_png(20, 20)))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "STORAGE_ERROR");
    assert_eq!(body["error"], "Failed to store file");
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn test_persistence_failure_is_500() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = helpers::test_config(&temp_dir.path().to_string_lossy(), &[]);
    let storage = Arc::new(MemoryStorage::new());
    let repository = Arc::new(FailingUploadRepository::new());
    let server = helpers::build_server(config, storage.clone(), repository);

    let response = server
        .post("/api/v1/upload")
        .multipart(file_form("a.png", noise_png(20, 20)))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PERSISTENCE_ERROR");
    assert_eq!(storage.upload_calls(), 1);
}

#[tokio::test]
async fn test_large_upload_is_optimized() {
    let app = setup_test_app_with(&[
        ("OPTIMIZE_THRESHOLD_BYTES", "2048"),
        ("OPTIMIZE_MAX_DIMENSION", "64"),
    ]);

    let response = app
        .client()
        .post("/api/v1/upload")
        .multipart(file_form("banner.png", noise_png(256, 128)))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    assert_eq!(body["optimized"], true);
    assert_eq!(body["record"]["original_name"], "banner.png");
    assert_eq!(body["record"]["width"], 256);

    let key = body["record"]["storage_key"].as_str().unwrap();
    assert!(key.ends_with(".jpg"));
    let stored = app.storage.get(key).unwrap();
    let decoded = image::load_from_memory(&stored).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 32));
}
