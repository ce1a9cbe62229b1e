use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status string reported for a probe that succeeded.
pub const PROBE_HEALTHY: &str = "healthy";

/// Composite service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Metadata store reachable, storage backend not.
    Degraded,
    /// Metadata store unreachable.
    Unhealthy,
}

impl HealthStatus {
    pub fn from_probes(database_ok: bool, storage_ok: bool) -> Self {
        match (database_ok, storage_ok) {
            (true, true) => HealthStatus::Healthy,
            (true, false) => HealthStatus::Degraded,
            (false, _) => HealthStatus::Unhealthy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// "healthy", "timeout", or the probe error message
    pub database: String,
    pub storage: String,
    /// Absent when the metadata store could not be counted.
    pub total_uploads: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_status() {
        assert_eq!(HealthStatus::from_probes(true, true), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_probes(true, false), HealthStatus::Degraded);
        assert_eq!(HealthStatus::from_probes(false, true), HealthStatus::Unhealthy);
        assert_eq!(HealthStatus::from_probes(false, false), HealthStatus::Unhealthy);
    }
}
