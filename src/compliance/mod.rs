//! Compliance core
//!
//! Pure, deterministic transformations over device snapshots. Every function
//! here takes the current snapshot by reference and returns freshly allocated
//! derived data; nothing is cached between calls and nothing reaches for
//! ambient state. The HTTP layer re-invokes these on every request.

pub mod types;
pub mod evaluator;
pub mod summary;
pub mod views;
pub mod alerts;

pub use types::{
    AlertEntry, CategoryStat, ComplianceError, ComplianceSummary, Evaluation, Issue, IssueKind,
    Severity, SLEEP_TIMEOUT_MAX_MINUTES,
};
pub use evaluator::evaluate;
pub use summary::summarize;
pub use views::{filtered, sorted, DeviceFilter, SortDirection, SortField};
pub use alerts::{activity_feed, synthesize, ActivityEntry, ActivityFilter};

#[cfg(test)]
pub(crate) mod testutil {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use crate::models::Device;

    /// Build a device snapshot row with the given compliance posture.
    pub fn device(hostname: &str, os: &str, disk: bool, updated: bool, av: bool, sleep: i32) -> Device {
        Device {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            hostname: hostname.to_string(),
            ip: "10.0.0.1".to_string(),
            os: os.to_string(),
            os_version: "14.2".to_string(),
            model: "Test Model".to_string(),
            processor: "Test CPU".to_string(),
            memory_gb: 16.0,
            serial_number: format!("SN-{hostname}"),
            user: "jdoe".to_string(),
            disk_encrypted: disk,
            os_updated: updated,
            antivirus_active: av,
            inactivity_sleep: sleep,
            last_checkin: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    /// Fully compliant device
    pub fn healthy(hostname: &str) -> Device {
        device(hostname, "macOS", true, true, true, 5)
    }
}
