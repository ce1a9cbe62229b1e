//! Configuration validation
//!
//! Startup checks on top of `Config::validate`, for values that only matter
//! once the HTTP server is about to run.

use anyhow::Result;
use snapvault_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.request_timeout_secs() == 0 {
        return Err(anyhow::anyhow!("Request timeout cannot be 0"));
    }

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set explicit origins via CORS_ORIGINS."
        ));
    }

    let pipeline = config.pipeline();
    if pipeline.optimize_threshold_bytes >= pipeline.max_bytes {
        tracing::warn!(
            optimize_threshold_bytes = pipeline.optimize_threshold_bytes,
            max_bytes = pipeline.max_bytes,
            "Optimization threshold is at or above the maximum upload size; nothing will be optimized"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapvault_core::UploadServiceConfig;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config(Box::new(
            UploadServiceConfig::from_vars(|key| map.get(key).cloned()).unwrap(),
        ))
    }

    #[test]
    fn test_defaults_pass() {
        let c = config(&[("DATABASE_URL", "postgres://localhost/snapvault")]);
        assert!(validate_config(&c).is_ok());
    }

    #[test]
    fn test_zero_request_timeout_rejected() {
        let c = config(&[
            ("DATABASE_URL", "postgres://localhost/snapvault"),
            ("REQUEST_TIMEOUT_SECS", "0"),
        ]);
        assert!(validate_config(&c).is_err());
    }
}
