//! Compliance rule evaluator
//!
//! Maps one device record to its ordered issue list and overall severity.
//! Deterministic and side-effect free: the same record always produces the
//! same evaluation.

use super::types::{
    ComplianceError, Evaluation, Issue, IssueKind, Severity, SLEEP_TIMEOUT_MAX_MINUTES,
};
use crate::models::Device;

/// Does the record violate this rule?
fn violates(kind: IssueKind, device: &Device) -> bool {
    match kind {
        IssueKind::DiskEncryptionDisabled => !device.disk_encrypted,
        IssueKind::OsOutdated => !device.os_updated,
        IssueKind::AntivirusInactive => !device.antivirus_active,
        IssueKind::SleepTimeoutExceeded => device.inactivity_sleep > SLEEP_TIMEOUT_MAX_MINUTES,
    }
}

/// Is the record compliant for this category? Used by the aggregator so that
/// category ratios never depend on issue-list ordering.
pub fn compliant(kind: IssueKind, device: &Device) -> bool {
    !violates(kind, device)
}

/// Evaluate one device record.
///
/// Issues come back in the fixed rule order (disk encryption, OS updates,
/// antivirus, sleep timeout). Overall severity is Critical when any critical
/// rule fires, Warning when only warnings fire, Healthy otherwise.
pub fn evaluate(device: &Device) -> Result<Evaluation, ComplianceError> {
    if device.inactivity_sleep < 0 {
        return Err(ComplianceError::Validation {
            field: "InactivitySleep",
            reason: format!("negative timeout {} minutes", device.inactivity_sleep),
        });
    }

    let mut issues = Vec::new();
    for kind in IssueKind::ALL {
        if violates(kind, device) {
            issues.push(Issue {
                device_id: device.id,
                kind,
                severity: kind.severity(),
                message: kind.message(&device.hostname),
            });
        }
    }

    let severity = if issues.iter().any(|i| i.severity == Severity::Critical) {
        Severity::Critical
    } else if !issues.is_empty() {
        Severity::Warning
    } else {
        Severity::Healthy
    };

    Ok(Evaluation { issues, severity })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::testutil::device;

    #[test]
    fn fully_compliant_device_is_healthy() {
        // DiskEncrypted, OSUpdated, AntivirusActive, sleep 8 minutes
        let d = device("mac-01", "macOS", true, true, true, 8);
        let ev = evaluate(&d).unwrap();
        assert!(ev.issues.is_empty());
        assert_eq!(ev.severity, Severity::Healthy);
        assert!(!ev.has_issues());
        assert!(!ev.has_critical_issues());
    }

    #[test]
    fn unencrypted_disk_is_critical() {
        let d = device("mac-02", "macOS", false, true, true, 5);
        let ev = evaluate(&d).unwrap();
        assert_eq!(ev.issues.len(), 1);
        assert_eq!(ev.issues[0].kind, IssueKind::DiskEncryptionDisabled);
        assert_eq!(ev.severity, Severity::Critical);
    }

    #[test]
    fn long_sleep_timeout_is_warning() {
        let d = device("mac-03", "macOS", true, true, true, 15);
        let ev = evaluate(&d).unwrap();
        assert_eq!(ev.issues.len(), 1);
        assert_eq!(ev.issues[0].kind, IssueKind::SleepTimeoutExceeded);
        assert_eq!(ev.severity, Severity::Warning);
    }

    #[test]
    fn sleep_boundary_is_inclusive() {
        // Exactly 10 minutes is still compliant, 11 is not
        let at_limit = device("mac-04", "macOS", true, true, true, 10);
        assert_eq!(evaluate(&at_limit).unwrap().severity, Severity::Healthy);

        let over_limit = device("mac-05", "macOS", true, true, true, 11);
        assert_eq!(evaluate(&over_limit).unwrap().severity, Severity::Warning);
    }

    #[test]
    fn issues_come_back_in_rule_order() {
        let d = device("win-01", "Windows", false, false, false, 30);
        let ev = evaluate(&d).unwrap();
        let kinds: Vec<IssueKind> = ev.issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::DiskEncryptionDisabled,
                IssueKind::OsOutdated,
                IssueKind::AntivirusInactive,
                IssueKind::SleepTimeoutExceeded,
            ]
        );
        assert_eq!(ev.severity, Severity::Critical);
    }

    #[test]
    fn critical_iff_disk_or_antivirus_violated() {
        for disk in [false, true] {
            for updated in [false, true] {
                for av in [false, true] {
                    for sleep in [5, 25] {
                        let d = device("probe", "macOS", disk, updated, av, sleep);
                        let ev = evaluate(&d).unwrap();
                        assert_eq!(ev.has_critical_issues(), !disk || !av);
                        assert_eq!(ev.has_issues(), ev.severity != Severity::Healthy);
                    }
                }
            }
        }
    }

    #[test]
    fn warnings_alone_never_escalate() {
        let d = device("mac-06", "macOS", true, false, true, 20);
        let ev = evaluate(&d).unwrap();
        assert_eq!(ev.issues.len(), 2);
        assert_eq!(ev.severity, Severity::Warning);
        assert!(!ev.has_critical_issues());
    }

    #[test]
    fn negative_sleep_timeout_is_rejected() {
        let d = device("mac-07", "macOS", true, true, true, -5);
        let err = evaluate(&d).unwrap_err();
        match err {
            ComplianceError::Validation { field, .. } => assert_eq!(field, "InactivitySleep"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn messages_name_the_host() {
        let d = device("finance-laptop", "macOS", false, true, true, 5);
        let ev = evaluate(&d).unwrap();
        assert_eq!(
            ev.issues[0].message,
            "finance-laptop has disk encryption disabled"
        );
    }
}
