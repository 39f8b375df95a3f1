//! Alert/activity synthesizer
//!
//! Flattens the issues of a whole snapshot into one ranked feed. Critical
//! entries always precede warnings; within a severity the synthetic
//! timestamps order entries most-recent-first, and full ties keep the
//! per-device rule order followed by device order in the snapshot.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::evaluator::evaluate;
use super::types::{AlertEntry, ComplianceError, Severity};
use crate::models::Device;

/// Build the alert feed for a snapshot, stamped against the current instant.
pub fn synthesize(devices: &[Device]) -> Result<Vec<AlertEntry>, ComplianceError> {
    synthesize_at(devices, Utc::now())
}

/// Build the alert feed against an explicit evaluation instant. Pure; the
/// snapshot is never mutated and the result is freshly allocated.
pub fn synthesize_at(
    devices: &[Device],
    now: DateTime<Utc>,
) -> Result<Vec<AlertEntry>, ComplianceError> {
    let mut entries = Vec::new();
    for device in devices {
        let evaluation = evaluate(device)?;
        for issue in evaluation.issues {
            entries.push(AlertEntry {
                id: format!("{}-{}", device.id, issue.kind.feed_suffix()),
                device_id: device.id,
                hostname: device.hostname.clone(),
                title: issue.kind.title().to_string(),
                message: issue.message,
                severity: issue.severity,
                timestamp: now - Duration::hours(issue.kind.feed_age_hours()),
            });
        }
    }

    // Stable sort: ties fall back to the flattening order above
    entries.sort_by(|a, b| {
        b.severity
            .rank()
            .cmp(&a.severity.rank())
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });

    Ok(entries)
}

// ============================================================================
// ACTIVITY FEED
// ============================================================================

/// One synthesized issue rendered as an activity log line
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub system: String,
    pub event: String,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub details: String,
}

/// Activity view filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityFilter {
    #[default]
    All,
    Warning,
    Critical,
}

impl FromStr for ActivityFilter {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ActivityFilter::All),
            "warning" => Ok(ActivityFilter::Warning),
            "critical" => Ok(ActivityFilter::Critical),
            other => Err(ComplianceError::InvalidArgument {
                what: "activity filter",
                value: other.to_string(),
            }),
        }
    }
}

impl ActivityFilter {
    fn keeps(&self, severity: Severity) -> bool {
        match self {
            ActivityFilter::All => true,
            ActivityFilter::Warning => severity == Severity::Warning,
            ActivityFilter::Critical => severity == Severity::Critical,
        }
    }
}

/// Build the activity feed: the same synthesized issues as the alert feed,
/// in the same ranking, rendered with check-event wording.
pub fn activity_feed(
    devices: &[Device],
    now: DateTime<Utc>,
    filter: ActivityFilter,
) -> Result<Vec<ActivityEntry>, ComplianceError> {
    let mut entries = Vec::new();
    for device in devices {
        let evaluation = evaluate(device)?;
        for issue in evaluation.issues {
            if !filter.keeps(issue.severity) {
                continue;
            }
            entries.push(ActivityEntry {
                id: format!("{}-{}", device.id, issue.kind.feed_suffix()),
                timestamp: now - Duration::hours(issue.kind.feed_age_hours()),
                system: device.hostname.clone(),
                event: issue.kind.check_event().to_string(),
                severity: issue.severity,
                details: issue.kind.check_details(device.inactivity_sleep),
            });
        }
    }

    entries.sort_by(|a, b| {
        b.severity
            .rank()
            .cmp(&a.severity.rank())
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });

    Ok(entries)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::testutil::{device, healthy};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn healthy_fleet_produces_empty_feed() {
        let devices = vec![healthy("one"), healthy("two")];
        let feed = synthesize_at(&devices, fixed_now()).unwrap();
        assert!(feed.is_empty());
    }

    #[test]
    fn critical_entries_precede_warnings() {
        let devices = vec![
            device("warn-host", "macOS", true, false, true, 20),
            device("crit-host", "macOS", false, true, true, 5),
        ];
        let feed = synthesize_at(&devices, fixed_now()).unwrap();
        assert_eq!(feed.len(), 3);

        let mut seen_warning = false;
        for entry in &feed {
            match entry.severity {
                Severity::Warning => seen_warning = true,
                Severity::Critical => assert!(!seen_warning, "critical after warning"),
                Severity::Healthy => panic!("healthy entries never reach the feed"),
            }
        }
    }

    #[test]
    fn same_severity_orders_most_recent_first() {
        // Antivirus entries are stamped 1h ago, disk encryption 2h ago
        let devices = vec![device("both", "macOS", false, true, false, 5)];
        let feed = synthesize_at(&devices, fixed_now()).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].title, "Antivirus Inactive");
        assert_eq!(feed[1].title, "Disk Encryption Disabled");
        assert!(feed[0].timestamp > feed[1].timestamp);
    }

    #[test]
    fn full_ties_keep_device_order() {
        // Two devices with the same single issue tie on severity and
        // timestamp; snapshot order decides
        let devices = vec![
            device("first", "macOS", false, true, true, 5),
            device("second", "macOS", false, true, true, 5),
        ];
        let feed = synthesize_at(&devices, fixed_now()).unwrap();
        assert_eq!(feed[0].hostname, "first");
        assert_eq!(feed[1].hostname, "second");
    }

    #[test]
    fn entry_ids_are_device_scoped() {
        let devices = vec![device("host", "macOS", false, false, false, 30)];
        let feed = synthesize_at(&devices, fixed_now()).unwrap();
        let ids: Vec<&str> = feed.iter().map(|e| e.id.as_str()).collect();
        let prefix = devices[0].id.to_string();
        for suffix in ["av", "disk", "os", "sleep"] {
            assert!(ids.contains(&format!("{prefix}-{suffix}").as_str()));
        }
    }

    #[test]
    fn alert_wording_matches_dashboard() {
        let devices = vec![device("hr-mac", "macOS", true, true, true, 45)];
        let feed = synthesize_at(&devices, fixed_now()).unwrap();
        assert_eq!(feed[0].title, "Sleep Timeout Too Long");
        assert_eq!(
            feed[0].message,
            "hr-mac sleep timeout exceeds recommended 10 minutes"
        );
    }

    #[test]
    fn activity_feed_uses_check_wording() {
        let devices = vec![device("hr-mac", "macOS", true, true, true, 45)];
        let feed = activity_feed(&devices, fixed_now(), ActivityFilter::All).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].event, "Sleep Settings Check");
        assert_eq!(feed[0].details, "Sleep timeout is set to 45 minutes");
        assert_eq!(feed[0].system, "hr-mac");
    }

    #[test]
    fn activity_filter_narrows_by_severity() {
        let devices = vec![device("mixed", "macOS", false, false, true, 5)];
        let all = activity_feed(&devices, fixed_now(), ActivityFilter::All).unwrap();
        assert_eq!(all.len(), 2);

        let critical = activity_feed(&devices, fixed_now(), ActivityFilter::Critical).unwrap();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].event, "Disk Encryption Check");

        let warning = activity_feed(&devices, fixed_now(), ActivityFilter::Warning).unwrap();
        assert_eq!(warning.len(), 1);
        assert_eq!(warning[0].event, "OS Update Check");
    }

    #[test]
    fn unknown_activity_filter_is_rejected() {
        assert!(matches!(
            "everything".parse::<ActivityFilter>(),
            Err(ComplianceError::InvalidArgument { what: "activity filter", .. })
        ));
    }
}
