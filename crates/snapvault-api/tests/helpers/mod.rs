//! Test helpers: build AppState and router for integration tests.
//!
//! Collaborators are the in-memory doubles from `snapvault-processing`'s
//! `test-helpers` feature, so no database or network is needed.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use snapvault_api::setup::routes::setup_routes;
use snapvault_api::AppState;
use snapvault_core::{Config, UploadServiceConfig};
use snapvault_db::UploadRepository;
use snapvault_processing::test_helpers::{InMemoryUploadRepository, MemoryStorage};
use snapvault_storage::Storage;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

pub use snapvault_processing::test_helpers::{noise_jpeg, noise_png, sample_upload};

/// Test application: server plus handles on its collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MemoryStorage>,
    pub repository: Arc<InMemoryUploadRepository>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Configuration for tests; `vars` override the defaults.
pub fn test_config(storage_path: &str, vars: &[(&str, &str)]) -> Config {
    let mut map: HashMap<String, String> = HashMap::from([
        (
            "DATABASE_URL".to_string(),
            "postgresql://localhost/snapvault_test".to_string(),
        ),
        ("LOCAL_STORAGE_PATH".to_string(), storage_path.to_string()),
    ]);
    for (key, value) in vars {
        map.insert(key.to_string(), value.to_string());
    }

    let config = UploadServiceConfig::from_vars(|key| map.get(key).cloned())
        .expect("Failed to build test config");
    Config(Box::new(config))
}

/// Build a server over arbitrary collaborators.
pub fn build_server(
    config: Config,
    storage: Arc<dyn Storage>,
    repository: Arc<dyn UploadRepository>,
) -> TestServer {
    let state = Arc::new(AppState::new(config.clone(), storage, repository));
    let router = setup_routes(&config, state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// Setup test app with in-memory storage and repository.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(&[])
}

pub fn setup_test_app_with(vars: &[(&str, &str)]) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(&temp_dir.path().to_string_lossy(), vars);

    let storage = Arc::new(MemoryStorage::new());
    let repository = Arc::new(InMemoryUploadRepository::new());
    let server = build_server(config, storage.clone(), repository.clone());

    TestApp {
        server,
        storage,
        repository,
        _temp_dir: temp_dir,
    }
}

/// Multipart form with one `file` part.
pub fn file_form(filename: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(data).file_name(filename))
}
