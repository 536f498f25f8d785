//! Service directory: organizational units that may own assets.
//!
//! Services have their own lifecycle. Assets refer to them weakly, so
//! deleting a service leaves its assets in place with a dangling
//! `serviceId` that resolves to no name.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::DbId;

/// An organizational unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub code: Option<String>,
    /// Name of the person responsible for the unit.
    pub responsible: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
}

/// Payload for creating a service. `active` defaults to true.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateService {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub code: Option<String>,
    pub responsible: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub active: Option<bool>,
}

/// Partial update for a service; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateService {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub code: Option<String>,
    pub responsible: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub active: Option<bool>,
}

impl Service {
    /// Merge a partial update into this service.
    pub fn merge(&mut self, changes: &UpdateService) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(description) = &changes.description {
            self.description = Some(description.clone());
        }
        if let Some(code) = &changes.code {
            self.code = Some(code.clone());
        }
        if let Some(responsible) = &changes.responsible {
            self.responsible = Some(responsible.clone());
        }
        if let Some(email) = &changes.email {
            self.email = Some(email.clone());
        }
        if let Some(phone) = &changes.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
    }
}

/// Run derive-based validation, mapping failures to [`CoreError::Validation`].
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), CoreError> {
    payload
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))
}

// ---------------------------------------------------------------------------
// Relationship resolution policy
// ---------------------------------------------------------------------------

/// What to do when an asset request names a service that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceResolution {
    /// Create: no relationship. Update: relationship left unchanged.
    #[default]
    Degrade,
    /// Reject the request before anything is written.
    Strict,
}

impl ServiceResolution {
    /// Parse a configuration value (`degrade` or `strict`, any case).
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "degrade" => Ok(Self::Degrade),
            "strict" => Ok(Self::Strict),
            other => Err(CoreError::Validation(format!(
                "Invalid service resolution policy '{other}'. Must be one of: degrade, strict"
            ))),
        }
    }
}
