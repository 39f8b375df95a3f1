//! View builder - sort and filter
//!
//! Stable, deterministic orderings and filtered subsets for the device table.
//! Pure functions of (records, field, direction); the current sort key and
//! direction toggle are presentation state and live with the caller.

use std::cmp::Ordering;
use std::str::FromStr;

use super::evaluator::evaluate;
use super::types::{ComplianceError, Severity};
use crate::models::Device;

// ============================================================================
// SORT
// ============================================================================

/// Sortable device table columns, named as the external store names them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Hostname,
    Ip,
    Os,
    OsVersion,
    Model,
    Processor,
    SerialNumber,
    User,
    DiskEncrypted,
    OsUpdated,
    AntivirusActive,
    InactivitySleep,
    Memory,
    LastCheckin,
}

impl FromStr for SortField {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Hostname" => Ok(SortField::Hostname),
            "IP" => Ok(SortField::Ip),
            "OS" => Ok(SortField::Os),
            "OSVersion" => Ok(SortField::OsVersion),
            "Model" => Ok(SortField::Model),
            "Processor" => Ok(SortField::Processor),
            "SerialNumber" => Ok(SortField::SerialNumber),
            "User" => Ok(SortField::User),
            "DiskEncrypted" => Ok(SortField::DiskEncrypted),
            "OSUpdated" => Ok(SortField::OsUpdated),
            "AntivirusActive" => Ok(SortField::AntivirusActive),
            "InactivitySleep" => Ok(SortField::InactivitySleep),
            "Memory" => Ok(SortField::Memory),
            "last_checkin" => Ok(SortField::LastCheckin),
            other => Err(ComplianceError::InvalidArgument {
                what: "sort field",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(ComplianceError::InvalidArgument {
                what: "sort direction",
                value: other.to_string(),
            }),
        }
    }
}

/// Case-insensitive lexicographic comparison, byte order as tie break.
/// Approximates the dashboard's collated string sort without pulling in a
/// full ICU collator.
fn str_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn field_cmp(a: &Device, b: &Device, field: SortField) -> Ordering {
    match field {
        SortField::Hostname => str_cmp(&a.hostname, &b.hostname),
        SortField::Ip => str_cmp(&a.ip, &b.ip),
        SortField::Os => str_cmp(&a.os, &b.os),
        SortField::OsVersion => str_cmp(&a.os_version, &b.os_version),
        SortField::Model => str_cmp(&a.model, &b.model),
        SortField::Processor => str_cmp(&a.processor, &b.processor),
        SortField::SerialNumber => str_cmp(&a.serial_number, &b.serial_number),
        SortField::User => str_cmp(&a.user, &b.user),
        // false < true ascending
        SortField::DiskEncrypted => a.disk_encrypted.cmp(&b.disk_encrypted),
        SortField::OsUpdated => a.os_updated.cmp(&b.os_updated),
        SortField::AntivirusActive => a.antivirus_active.cmp(&b.antivirus_active),
        SortField::InactivitySleep => a.inactivity_sleep.cmp(&b.inactivity_sleep),
        SortField::Memory => a.memory_gb.total_cmp(&b.memory_gb),
        SortField::LastCheckin => a.last_checkin.cmp(&b.last_checkin),
    }
}

/// Sort a snapshot by one field. Stable: records comparing equal on the sort
/// field keep their relative input order. Always returns a new collection.
pub fn sorted(devices: &[Device], field: SortField, direction: SortDirection) -> Vec<Device> {
    let mut out = devices.to_vec();
    out.sort_by(|a, b| {
        let ord = field_cmp(a, b, field);
        match direction {
            SortDirection::Asc => ord,
            // reverse() maps Equal to Equal, so descending stays stable too
            SortDirection::Desc => ord.reverse(),
        }
    });
    out
}

// ============================================================================
// FILTER
// ============================================================================

/// Named device table filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceFilter {
    #[default]
    All,
    WithIssues,
    CriticalOnly,
}

impl FromStr for DeviceFilter {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(DeviceFilter::All),
            "withIssues" => Ok(DeviceFilter::WithIssues),
            "criticalOnly" => Ok(DeviceFilter::CriticalOnly),
            other => Err(ComplianceError::InvalidArgument {
                what: "filter",
                value: other.to_string(),
            }),
        }
    }
}

/// Apply a named filter. Returns a newly allocated collection, never the
/// original, preserving input order.
pub fn filtered(devices: &[Device], filter: DeviceFilter) -> Result<Vec<Device>, ComplianceError> {
    let mut out = Vec::new();
    for device in devices {
        let keep = match filter {
            DeviceFilter::All => true,
            DeviceFilter::WithIssues => evaluate(device)?.has_issues(),
            DeviceFilter::CriticalOnly => evaluate(device)?.severity == Severity::Critical,
        };
        if keep {
            out.push(device.clone());
        }
    }
    Ok(out)
}

// ============================================================================
// TESTS
// ============================================================================
