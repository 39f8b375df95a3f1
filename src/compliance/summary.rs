//! Summary aggregator
//!
//! Reduces a snapshot of device records to organization-wide counts and
//! per-category compliance ratios. Category ratios go straight through the
//! rule predicates rather than counting issue absences, so they cannot drift
//! if the issue ordering ever changes.

use super::evaluator::{compliant, evaluate};
use super::types::{CategoryStat, ComplianceError, ComplianceSummary, IssueKind, Severity};
use crate::models::Device;

/// round(100 * compliant / total), half-up, 0 for an empty snapshot
fn percent_of(compliant: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((100 * compliant + total / 2) / total) as u8
}

fn category(devices: &[Device], pred: impl Fn(&Device) -> bool) -> CategoryStat {
    let total = devices.len() as u64;
    let count = devices.iter().filter(|&d| pred(d)).count() as u64;
    CategoryStat {
        compliant: count,
        percent: percent_of(count, total),
    }
}

/// Summarize one snapshot. The input collection is never mutated and no
/// state is retained between calls.
pub fn summarize(devices: &[Device]) -> Result<ComplianceSummary, ComplianceError> {
    let mut with_issues = 0u64;
    let mut critical = 0u64;
    for device in devices {
        let ev = evaluate(device)?;
        if ev.has_issues() {
            with_issues += 1;
        }
        if ev.severity == Severity::Critical {
            critical += 1;
        }
    }

    Ok(ComplianceSummary {
        total: devices.len() as u64,
        with_issues,
        critical,
        disk_encryption: category(devices, |d| {
            compliant(IssueKind::DiskEncryptionDisabled, d)
        }),
        os_updates: category(devices, |d| compliant(IssueKind::OsOutdated, d)),
        antivirus: category(devices, |d| compliant(IssueKind::AntivirusInactive, d)),
        sleep_policy: category(devices, |d| compliant(IssueKind::SleepTimeoutExceeded, d)),
        macos: category(devices, |d| d.os == "macOS"),
        windows: category(devices, |d| d.os == "Windows"),
    })
}

// ============================================================================
// TESTS
// ============================================================================
