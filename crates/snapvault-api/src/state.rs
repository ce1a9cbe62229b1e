//! Application state shared by every handler.

use snapvault_core::Config;
use snapvault_db::UploadRepository;
use snapvault_processing::UploadPipeline;
use snapvault_storage::Storage;
use std::sync::Arc;

/// Listing limits taken from configuration.
#[derive(Clone, Copy, Debug)]
pub struct ListingConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: UploadPipeline,
    pub repository: Arc<dyn UploadRepository>,
    pub storage: Arc<dyn Storage>,
    pub listing: ListingConfig,
}

impl AppState {
    /// Wire the pipeline to the given collaborators.
    pub fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        repository: Arc<dyn UploadRepository>,
    ) -> Self {
        let pipeline =
            UploadPipeline::new(config.pipeline().clone(), storage.clone(), repository.clone());
        let listing = ListingConfig {
            default_page_size: config.default_page_size(),
            max_page_size: config.max_page_size(),
        };

        Self {
            config,
            pipeline,
            repository,
            storage,
            listing,
        }
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
