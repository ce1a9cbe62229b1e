//! API constants

/// Versioned prefix of the JSON API.
pub const API_PREFIX: &str = "/api/v1";

/// Path of the served OpenAPI document.
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Storage key probed by health checks. Never written.
pub const HEALTH_CHECK_KEY: &str = "health-check-non-existent-key";
