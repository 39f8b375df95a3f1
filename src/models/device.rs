//! Device model - latest telemetry snapshot per managed machine
//!
//! Serialized field names follow the external store contract (`Hostname`,
//! `IP`, `OSUpdated`, ...), which is also what the collecting agent sends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::compliance::ComplianceError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Device {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub owner_id: Uuid,
    #[serde(rename = "Hostname")]
    pub hostname: String,
    #[serde(rename = "IP")]
    pub ip: String,
    #[serde(rename = "OS")]
    pub os: String,
    #[serde(rename = "OSVersion")]
    pub os_version: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Processor")]
    pub processor: String,
    #[serde(rename = "Memory")]
    pub memory_gb: f64,
    #[serde(rename = "SerialNumber")]
    pub serial_number: String,
    #[serde(rename = "User")]
    #[sqlx(rename = "device_user")]
    pub user: String,
    #[serde(rename = "DiskEncrypted")]
    pub disk_encrypted: bool,
    #[serde(rename = "OSUpdated")]
    pub os_updated: bool,
    #[serde(rename = "AntivirusActive")]
    pub antivirus_active: bool,
    #[serde(rename = "InactivitySleep")]
    pub inactivity_sleep: i32,
    pub last_checkin: DateTime<Utc>,
}

/// Raw row as posted by the collecting agent. Compliance fields arrive as
/// options so that an absent value fails validation instead of silently
/// reading as a pass or a fail.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentReport {
    #[serde(rename = "OwnerID")]
    pub owner_id: Uuid,
    #[serde(rename = "Hostname")]
    pub hostname: String,
    #[serde(rename = "IP", default)]
    pub ip: String,
    #[serde(rename = "OS", default)]
    pub os: String,
    #[serde(rename = "OSVersion", default)]
    pub os_version: String,
    #[serde(rename = "Model", default)]
    pub model: String,
    #[serde(rename = "Processor", default)]
    pub processor: String,
    #[serde(rename = "Memory", default)]
    pub memory_gb: f64,
    #[serde(rename = "SerialNumber")]
    pub serial_number: String,
    #[serde(rename = "User", default)]
    pub user: String,
    #[serde(rename = "DiskEncrypted")]
    pub disk_encrypted: Option<bool>,
    #[serde(rename = "OSUpdated")]
    pub os_updated: Option<bool>,
    #[serde(rename = "AntivirusActive")]
    pub antivirus_active: Option<bool>,
    #[serde(rename = "InactivitySleep")]
    pub inactivity_sleep: Option<i32>,
}

/// Validated device telemetry ready for the store
#[derive(Debug, Clone)]
pub struct NewDevice {
    pub owner_id: Uuid,
    pub hostname: String,
    pub ip: String,
    pub os: String,
    pub os_version: String,
    pub model: String,
    pub processor: String,
    pub memory_gb: f64,
    pub serial_number: String,
    pub user: String,
    pub disk_encrypted: bool,
    pub os_updated: bool,
    pub antivirus_active: bool,
    pub inactivity_sleep: i32,
}

impl AgentReport {
    /// Check the compliance contract fields, naming the offending field on
    /// failure.
    pub fn validate(self) -> Result<NewDevice, ComplianceError> {
        fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ComplianceError> {
            value.ok_or(ComplianceError::Validation {
                field,
                reason: "missing".to_string(),
            })
        }

        if self.hostname.trim().is_empty() {
            return Err(ComplianceError::Validation {
                field: "Hostname",
                reason: "empty".to_string(),
            });
        }
        if self.serial_number.trim().is_empty() {
            return Err(ComplianceError::Validation {
                field: "SerialNumber",
                reason: "empty".to_string(),
            });
        }

        let disk_encrypted = required(self.disk_encrypted, "DiskEncrypted")?;
        let os_updated = required(self.os_updated, "OSUpdated")?;
        let antivirus_active = required(self.antivirus_active, "AntivirusActive")?;
        let inactivity_sleep = required(self.inactivity_sleep, "InactivitySleep")?;

        if inactivity_sleep < 0 {
            return Err(ComplianceError::Validation {
                field: "InactivitySleep",
                reason: format!("negative timeout {inactivity_sleep} minutes"),
            });
        }

        Ok(NewDevice {
            owner_id: self.owner_id,
            hostname: self.hostname,
            ip: self.ip,
            os: self.os,
            os_version: self.os_version,
            model: self.model,
            processor: self.processor,
            memory_gb: self.memory_gb,
            serial_number: self.serial_number,
            user: self.user,
            disk_encrypted,
            os_updated,
            antivirus_active,
            inactivity_sleep,
        })
    }
}

impl Device {
    /// Owner-scoped snapshot, newest check-ins first. Id tie break keeps the
    /// snapshot order deterministic for the derived views.
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Device>(
            r#"
            SELECT * FROM devices
            WHERE owner_id = $1
            ORDER BY last_checkin DESC, id
            "#
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or refresh the device row keyed by (owner, serial number) and
    /// stamp the check-in time.
    pub async fn upsert(pool: &PgPool, data: &NewDevice) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (
                owner_id, hostname, ip, os, os_version, model, processor,
                memory_gb, serial_number, device_user, disk_encrypted,
                os_updated, antivirus_active, inactivity_sleep, last_checkin
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW())
            ON CONFLICT (owner_id, serial_number) DO UPDATE SET
                hostname = EXCLUDED.hostname,
                ip = EXCLUDED.ip,
                os = EXCLUDED.os,
                os_version = EXCLUDED.os_version,
                model = EXCLUDED.model,
                processor = EXCLUDED.processor,
                memory_gb = EXCLUDED.memory_gb,
                device_user = EXCLUDED.device_user,
                disk_encrypted = EXCLUDED.disk_encrypted,
                os_updated = EXCLUDED.os_updated,
                antivirus_active = EXCLUDED.antivirus_active,
                inactivity_sleep = EXCLUDED.inactivity_sleep,
                last_checkin = NOW(),
                updated_at = NOW()
            RETURNING *
            "#
        )
        .bind(data.owner_id)
        .bind(&data.hostname)
        .bind(&data.ip)
        .bind(&data.os)
        .bind(&data.os_version)
        .bind(&data.model)
        .bind(&data.processor)
        .bind(data.memory_gb)
        .bind(&data.serial_number)
        .bind(&data.user)
        .bind(data.disk_encrypted)
        .bind(data.os_updated)
        .bind(data.antivirus_active)
        .bind(data.inactivity_sleep)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> AgentReport {
        AgentReport {
            owner_id: Uuid::new_v4(),
            hostname: "mac-01".to_string(),
            ip: "10.0.0.7".to_string(),
            os: "macOS".to_string(),
            os_version: "14.2".to_string(),
            model: "MacBook Pro".to_string(),
            processor: "Apple M3".to_string(),
            memory_gb: 16.0,
            serial_number: "C02XL0GZJGH5".to_string(),
            user: "jdoe".to_string(),
            disk_encrypted: Some(true),
            os_updated: Some(true),
            antivirus_active: Some(true),
            inactivity_sleep: Some(5),
        }
    }

    #[test]
    fn complete_report_validates() {
        let record = report().validate().unwrap();
        assert_eq!(record.hostname, "mac-01");
        assert!(record.disk_encrypted);
        assert_eq!(record.inactivity_sleep, 5);
    }

    #[test]
    fn missing_compliance_booleans_name_the_field() {
        let cases: [(&'static str, fn(&mut AgentReport)); 4] = [
            ("DiskEncrypted", |r| r.disk_encrypted = None),
            ("OSUpdated", |r| r.os_updated = None),
            ("AntivirusActive", |r| r.antivirus_active = None),
            ("InactivitySleep", |r| r.inactivity_sleep = None),
        ];

        for (expected_field, strip) in cases {
            let mut r = report();
            strip(&mut r);
            match r.validate().unwrap_err() {
                ComplianceError::Validation { field, .. } => assert_eq!(field, expected_field),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn negative_sleep_is_rejected() {
        let mut r = report();
        r.inactivity_sleep = Some(-1);
        assert!(matches!(
            r.validate().unwrap_err(),
            ComplianceError::Validation { field: "InactivitySleep", .. }
        ));
    }

    #[test]
    fn blank_identity_fields_are_rejected() {
        let mut r = report();
        r.hostname = "  ".to_string();
        assert!(matches!(
            r.validate().unwrap_err(),
            ComplianceError::Validation { field: "Hostname", .. }
        ));

        let mut r = report();
        r.serial_number = String::new();
        assert!(matches!(
            r.validate().unwrap_err(),
            ComplianceError::Validation { field: "SerialNumber", .. }
        ));
    }

    #[test]
    fn device_serializes_with_external_names() {
        let d = Device {
            id: Uuid::nil(),
            owner_id: Uuid::nil(),
            hostname: "mac-01".to_string(),
            ip: "10.0.0.7".to_string(),
            os: "macOS".to_string(),
            os_version: "14.2".to_string(),
            model: "MacBook Pro".to_string(),
            processor: "Apple M3".to_string(),
            memory_gb: 16.0,
            serial_number: "C02XL0GZJGH5".to_string(),
            user: "jdoe".to_string(),
            disk_encrypted: true,
            os_updated: false,
            antivirus_active: true,
            inactivity_sleep: 5,
            last_checkin: Utc::now(),
        };

        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["Hostname"], "mac-01");
        assert_eq!(json["OSUpdated"], false);
        assert_eq!(json["InactivitySleep"], 5);
        assert!(json.get("owner_id").is_none());
        assert!(json.get("last_checkin").is_some());
    }
}
