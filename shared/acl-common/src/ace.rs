//! Access control entries and the patch operations that mutate them.
//!
//! The store reads and writes entries with different field names: a patch
//! names the trustee `trustee` and the deny flag `denied`, while the object
//! representation uses `trusteeId` and `deny`. Both map onto the same
//! [`Ace`] fields. The store's `type` field is [`Ace::entry_type`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::rights::EffectiveRights;

/// Entry type for object access entries.
pub const OBJECT_ACCESS_ENTRY: i32 = 1;

const fn default_entry_type() -> i32 {
    OBJECT_ACCESS_ENTRY
}

/// ACL update operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AclOp {
    Add,
    Remove,
    Replace,
}

impl AclOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Remove => "REMOVE",
            Self::Replace => "REPLACE",
        }
    }
}

impl fmt::Display for AclOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AclOp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(Self::Add),
            "REMOVE" => Ok(Self::Remove),
            "REPLACE" => Ok(Self::Replace),
            other => Err(ValidationError::UnknownOperation(other.to_string())),
        }
    }
}

/// One grant or deny record for a trustee on an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ace {
    #[serde(rename = "trusteeId", alias = "trustee")]
    pub trustee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trustee_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trustee_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trustee_subtype: Option<i32>,
    pub rights: EffectiveRights,
    #[serde(rename = "deny", alias = "denied")]
    pub denied: bool,
    #[serde(default)]
    pub inheritable: bool,
    #[serde(rename = "type", default = "default_entry_type")]
    pub entry_type: i32,
}

impl Ace {
    /// Object access entry for `trustee_id` with no trustee details.
    pub fn new(
        trustee_id: impl Into<String>,
        rights: EffectiveRights,
        denied: bool,
        inheritable: bool,
    ) -> Self {
        Self {
            trustee_id: trustee_id.into(),
            trustee_name: None,
            trustee_type: None,
            trustee_subtype: None,
            rights,
            denied,
            inheritable,
            entry_type: OBJECT_ACCESS_ENTRY,
        }
    }

    /// Patch operation applying `op` with this entry.
    #[must_use]
    pub fn build_patch(&self, op: AclOp) -> AcePatch {
        AcePatch {
            op,
            trustee: self.trustee_id.clone(),
            rights: self.rights,
            entry_type: self.entry_type,
            denied: self.denied,
            inheritable: self.inheritable,
        }
    }

    /// Decode an entry from the store's JSON representation.
    pub fn from_wire(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// A single entry of the `acl` list in an update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcePatch {
    pub op: AclOp,
    pub trustee: String,
    pub rights: EffectiveRights,
    #[serde(rename = "type")]
    pub entry_type: i32,
    pub denied: bool,
    pub inheritable: bool,
}
