pub mod stats;
pub mod upload;
pub mod uploads;

/// Plain-text banner at `/`.
pub async fn home() -> &'static str {
    "snapvault running"
}
