//! Asset records, their closed enumerations, and the field-merge rules used
//! by the lifecycle manager.
//!
//! Status and category tags cross the wire as strings. Each enum has exactly
//! one parse function ([`AssetStatus::parse`], [`AssetCategory::parse`]) and
//! serde deserialization is routed through it, so no free-text status can
//! ever reach the store.

pub mod export;
pub mod filter;
pub mod stats;

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Date, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Operational status of an asset.
///
/// The four values form an unordered set: any status may move to any other
/// status through an update or a bulk status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum AssetStatus {
    InService,
    Broken,
    InMaintenance,
    OutOfService,
}

impl AssetStatus {
    /// Every status, in declaration order.
    pub const ALL: [AssetStatus; 4] = [
        Self::InService,
        Self::Broken,
        Self::InMaintenance,
        Self::OutOfService,
    ];

    /// Parse a status tag, ignoring ASCII case.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid asset status '{s}'. Must be one of: \
                     IN_SERVICE, BROKEN, IN_MAINTENANCE, OUT_OF_SERVICE"
                ))
            })
    }

    /// Wire and database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InService => "IN_SERVICE",
            Self::Broken => "BROKEN",
            Self::InMaintenance => "IN_MAINTENANCE",
            Self::OutOfService => "OUT_OF_SERVICE",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for AssetStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Closed tag set classifying an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum AssetCategory {
    Topographic,
    It,
    Vehicle,
    Furniture,
    Other,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 5] = [
        Self::Topographic,
        Self::It,
        Self::Vehicle,
        Self::Furniture,
        Self::Other,
    ];

    /// Parse a category tag, ignoring ASCII case.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid asset category '{s}'. Must be one of: \
                     TOPOGRAPHIC, IT, VEHICLE, FURNITURE, OTHER"
                ))
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topographic => "TOPOGRAPHIC",
            Self::It => "IT",
            Self::Vehicle => "VEHICLE",
            Self::Furniture => "FURNITURE",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for AssetCategory {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Every stored attribute of an asset except its id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetData {
    pub name: String,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub category: Option<AssetCategory>,
    pub status: AssetStatus,
    pub acquisition_date: Option<Date>,
    /// Monetary value. `None` is distinct from zero.
    pub value: Option<Decimal>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    /// Weak reference to the owning service; may point at a deleted service.
    pub service_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
    pub created_by: String,
    pub modified_by: Option<String>,
}

/// A persisted asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub id: DbId,
    #[serde(flatten)]
    pub data: AssetData,
}

/// An asset about to be written: no id means insert, an id means full
/// replacement of that row.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    pub id: Option<DbId>,
    pub data: AssetData,
}

impl From<Asset> for AssetRecord {
    fn from(asset: Asset) -> Self {
        Self {
            id: Some(asset.id),
            data: asset.data,
        }
    }
}

/// Materialized view returned to callers: the asset plus the resolved name
/// of its service (`None` when unassigned or orphaned).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetView {
    #[serde(flatten)]
    pub asset: Asset,
    pub service_name: Option<String>,
}

impl AssetView {
    pub fn id(&self) -> DbId {
        self.asset.id
    }
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Payload for registering a new asset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAsset {
    pub name: String,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub category: Option<AssetCategory>,
    pub status: AssetStatus,
    pub acquisition_date: Option<Date>,
    pub value: Option<Decimal>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub service_id: Option<DbId>,
}

/// Partial update. Present fields overwrite, absent or null fields leave the
/// stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAsset {
    pub name: Option<String>,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub category: Option<AssetCategory>,
    pub status: Option<AssetStatus>,
    pub acquisition_date: Option<Date>,
    pub value: Option<Decimal>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub service_id: Option<DbId>,
}

impl CreateAsset {
    /// Check field-level constraints before anything is written.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        validate_value(self.value)
    }

    /// Build the stored attributes for a new asset. The service reference is
    /// resolved by the caller and passed in.
    pub fn into_data(
        self,
        service_id: Option<DbId>,
        actor: &str,
        now: Timestamp,
    ) -> AssetData {
        AssetData {
            name: self.name,
            reference: self.reference,
            description: self.description,
            category: self.category,
            status: self.status,
            acquisition_date: self.acquisition_date,
            value: self.value,
            serial_number: self.serial_number,
            location: self.location,
            service_id,
            created_at: now,
            updated_at: None,
            created_by: actor.to_string(),
            modified_by: None,
        }
    }
}

impl UpdateAsset {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_value(self.value)
    }
}

impl AssetData {
    /// Merge a partial update into these attributes.
    ///
    /// `service_id` is not touched here: it needs resolution against the
    /// service directory first.
    pub fn merge(&mut self, changes: &UpdateAsset) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(reference) = &changes.reference {
            self.reference = Some(reference.clone());
        }
        if let Some(description) = &changes.description {
            self.description = Some(description.clone());
        }
        if let Some(category) = changes.category {
            self.category = Some(category);
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(date) = changes.acquisition_date {
            self.acquisition_date = Some(date);
        }
        if let Some(value) = changes.value {
            self.value = Some(value);
        }
        if let Some(serial) = &changes.serial_number {
            self.serial_number = Some(serial.clone());
        }
        if let Some(location) = &changes.location {
            self.location = Some(location.clone());
        }
    }

    /// Stamp a modification by `actor`.
    pub fn touch(&mut self, actor: &str, now: Timestamp) {
        self.updated_at = Some(now);
        self.modified_by = Some(actor.to_string());
    }
}

/// Asset names must contain at least one non-whitespace character.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Asset name must not be blank".into()));
    }
    Ok(())
}

/// Monetary values are never negative. Absent is allowed.
pub fn validate_value(value: Option<Decimal>) -> Result<(), CoreError> {
    match value {
        Some(v) if v.is_sign_negative() && !v.is_zero() => Err(CoreError::Validation(format!(
            "Asset value must not be negative (got {v})"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
