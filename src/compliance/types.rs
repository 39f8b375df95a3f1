//! Compliance core types
//!
//! Data structures only - rule logic lives in the sibling modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Idle-lock timeouts above this many minutes violate the sleep policy.
pub const SLEEP_TIMEOUT_MAX_MINUTES: i32 = 10;

// ============================================================================
// ERRORS
// ============================================================================

/// Errors produced by the compliance core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComplianceError {
    /// A device record field is missing or carries an unusable value.
    /// Compliance booleans are never coerced to a passing or failing state.
    #[error("invalid value for field `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Unknown sort field, sort direction, or filter name.
    /// The caller asked for something we do not have; no silent fallback.
    #[error("unknown {what}: `{value}`")]
    InvalidArgument { what: &'static str, value: String },
}

// ============================================================================
// SEVERITY
// ============================================================================

/// Health classification of a device or a single issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Healthy,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Healthy => "healthy",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    /// Numeric rank for ordering, higher is worse
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Healthy => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ISSUE KIND
// ============================================================================

/// One compliance rule a device can violate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    DiskEncryptionDisabled,
    OsOutdated,
    AntivirusInactive,
    SleepTimeoutExceeded,
}

impl IssueKind {
    /// Evaluation order. Significant: issue lists compare positionally in the
    /// dashboard and in tests.
    pub const ALL: [IssueKind; 4] = [
        IssueKind::DiskEncryptionDisabled,
        IssueKind::OsOutdated,
        IssueKind::AntivirusInactive,
        IssueKind::SleepTimeoutExceeded,
    ];

    /// Severity of a violation of this rule (fixed, not configurable)
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::DiskEncryptionDisabled => Severity::Critical,
            IssueKind::AntivirusInactive => Severity::Critical,
            IssueKind::OsOutdated => Severity::Warning,
            IssueKind::SleepTimeoutExceeded => Severity::Warning,
        }
    }

    /// Alert feed headline
    pub fn title(&self) -> &'static str {
        match self {
            IssueKind::DiskEncryptionDisabled => "Disk Encryption Disabled",
            IssueKind::OsOutdated => "OS Update Required",
            IssueKind::AntivirusInactive => "Antivirus Inactive",
            IssueKind::SleepTimeoutExceeded => "Sleep Timeout Too Long",
        }
    }

    /// Alert feed body, keyed to the affected host
    pub fn message(&self, hostname: &str) -> String {
        match self {
            IssueKind::DiskEncryptionDisabled => {
                format!("{hostname} has disk encryption disabled")
            }
            IssueKind::OsOutdated => format!("{hostname} requires operating system update"),
            IssueKind::AntivirusInactive => format!("{hostname} antivirus is not running"),
            IssueKind::SleepTimeoutExceeded => format!(
                "{hostname} sleep timeout exceeds recommended {SLEEP_TIMEOUT_MAX_MINUTES} minutes"
            ),
        }
    }

    /// Stable per-device suffix for feed entry ids
    pub fn feed_suffix(&self) -> &'static str {
        match self {
            IssueKind::DiskEncryptionDisabled => "disk",
            IssueKind::OsOutdated => "os",
            IssueKind::AntivirusInactive => "av",
            IssueKind::SleepTimeoutExceeded => "sleep",
        }
    }

    /// Activity feed event name
    pub fn check_event(&self) -> &'static str {
        match self {
            IssueKind::DiskEncryptionDisabled => "Disk Encryption Check",
            IssueKind::OsOutdated => "OS Update Check",
            IssueKind::AntivirusInactive => "Antivirus Check",
            IssueKind::SleepTimeoutExceeded => "Sleep Settings Check",
        }
    }

    /// Activity feed details line
    pub fn check_details(&self, inactivity_sleep: i32) -> String {
        match self {
            IssueKind::DiskEncryptionDisabled => "Disk encryption is disabled".to_string(),
            IssueKind::OsOutdated => "Operating system requires updates".to_string(),
            IssueKind::AntivirusInactive => "Antivirus is not active".to_string(),
            IssueKind::SleepTimeoutExceeded => {
                format!("Sleep timeout is set to {inactivity_sleep} minutes")
            }
        }
    }

    /// Age of the synthesized feed timestamp, in hours before the evaluation
    /// instant. Only used for feed ordering and display.
    pub fn feed_age_hours(&self) -> i64 {
        match self {
            IssueKind::AntivirusInactive => 1,
            IssueKind::DiskEncryptionDisabled => 2,
            IssueKind::OsOutdated => 3,
            IssueKind::SleepTimeoutExceeded => 4,
        }
    }
}

// ============================================================================
// EVALUATION RESULT
// ============================================================================

/// A single rule violation derived from a device record.
/// Ephemeral: recomputed on every snapshot, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub device_id: Uuid,
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
}

/// Result of evaluating one device record
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub issues: Vec<Issue>,
    pub severity: Severity,
}

impl Evaluation {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_critical_issues(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

/// One compliance category across the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryStat {
    /// Devices satisfying the category predicate
    pub compliant: u64,
    /// round(100 * compliant / total), 0 for an empty snapshot
    pub percent: u8,
}

/// Organization-wide counts and ratios, recomputed per snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceSummary {
    pub total: u64,
    pub with_issues: u64,
    pub critical: u64,
    pub disk_encryption: CategoryStat,
    pub os_updates: CategoryStat,
    pub antivirus: CategoryStat,
    pub sleep_policy: CategoryStat,
    pub macos: CategoryStat,
    pub windows: CategoryStat,
}

// ============================================================================
// ALERT FEED
// ============================================================================

/// One issue rendered as a ranked feed item
#[derive(Debug, Clone, Serialize)]
pub struct AlertEntry {
    pub id: String,
    pub device_id: Uuid,
    pub hostname: String,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    /// Synthetic, used only for feed ordering and display
    pub timestamp: DateTime<Utc>,
}
