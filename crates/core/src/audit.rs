//! Asset audit trail: action tags, entry shapes and detail wording.
//!
//! Entries are immutable once written. The storage traits expose an append
//! (inside a unit of work) and an ordered read; there is no update or delete.

use std::fmt;

use chrono::Utc;
use serde::Serialize;

use crate::assets::AssetStatus;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Action tags
// ---------------------------------------------------------------------------

/// What happened to the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    StatusChanged,
}

impl AuditAction {
    pub const ALL: [AuditAction; 4] = [
        Self::Created,
        Self::Updated,
        Self::Deleted,
        Self::StatusChanged,
    ];

    /// Parse a stored action tag (exact match).
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| CoreError::Internal(format!("Unknown audit action '{s}'")))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::Deleted => "DELETED",
            Self::StatusChanged => "STATUS_CHANGED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Detail wording
// ---------------------------------------------------------------------------

/// Fixed human-readable details.
pub mod details {
    pub const CREATED: &str = "Asset created";
    pub const UPDATED: &str = "Asset updated";
    pub const DELETED: &str = "Asset deleted";
    pub const BULK_DELETED: &str = "Asset deleted (bulk)";
}

/// Detail for a bulk status change, naming the new status.
pub fn status_changed_detail(status: AssetStatus) -> String {
    format!("Status changed to {status}")
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A stored audit entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: DbId,
    /// Weak reference: the asset may since have been deleted.
    pub asset_id: DbId,
    pub action: AuditAction,
    pub detail: String,
    pub timestamp: Timestamp,
    pub actor: String,
}

/// An entry to append.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub asset_id: DbId,
    pub action: AuditAction,
    pub detail: String,
    pub timestamp: Timestamp,
    pub actor: String,
}

impl NewAuditEntry {
    /// Build an entry stamped with the current time.
    pub fn now(asset_id: DbId, action: AuditAction, detail: impl Into<String>, actor: &str) -> Self {
        Self {
            asset_id,
            action,
            detail: detail.into(),
            timestamp: Utc::now(),
            actor: actor.to_string(),
        }
    }
}

/// Order entries most recent first, id descending on equal timestamps.
pub fn sort_newest_first(entries: &mut [AuditEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
