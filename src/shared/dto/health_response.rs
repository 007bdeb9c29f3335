use serde::Serialize;

use crate::iso_timestamp::IsoTimestamp;

#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
}

impl Default for RootResponse {
    fn default() -> Self {
        Self {
            message: "TaskMaster API v1.0.0",
            status: "running",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: IsoTimestamp,
}

impl HealthResponse {
    pub fn healthy(timestamp: IsoTimestamp) -> Self {
        Self {
            status: "healthy",
            database: "connected",
            timestamp,
        }
    }
}
