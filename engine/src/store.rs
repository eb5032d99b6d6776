//! Object store seam.
//!
//! The engine needs exactly two store operations: reading an object (with its
//! ACL) and applying an ACL patch to it. [`crate::http::HttpObjectStore`] talks
//! to the REST API; tests plug in an in-memory implementation.

use std::fmt::Debug;

use acl_common::{Ace, AcePatch, ObjectType, PropagationBehavior};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Object representation returned by the store.
///
/// Only the fields the engine reads are typed; the rest is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<i32>,
    #[serde(default)]
    pub acl: Vec<Ace>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ObjectInfo {
    pub fn new(id: impl Into<String>, acl: Vec<Ace>) -> Self {
        Self {
            id: id.into(),
            name: None,
            object_type: None,
            acl,
            extra: serde_json::Map::new(),
        }
    }
}

/// Body of an ACL update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclUpdateBody {
    pub acl: Vec<AcePatch>,
    #[serde(
        rename = "propagateACLToChildren",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub propagate_acl_to_children: Option<bool>,
    #[serde(
        rename = "propagationBehavior",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub propagation_behavior: Option<PropagationBehavior>,
}

impl AclUpdateBody {
    #[must_use]
    pub const fn new(acl: Vec<AcePatch>) -> Self {
        Self {
            acl,
            propagate_acl_to_children: None,
            propagation_behavior: None,
        }
    }

    #[must_use]
    pub fn single(patch: AcePatch) -> Self {
        Self::new(vec![patch])
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Fetch an object together with its current ACL.
    async fn get_object_info(
        &self,
        object_type: ObjectType,
        id: &str,
        project_id: Option<&str>,
    ) -> Result<ObjectInfo, StoreError>;

    /// Apply an ACL update and return the updated object.
    async fn update_object_acl(
        &self,
        object_type: ObjectType,
        id: &str,
        project_id: Option<&str>,
        body: &AclUpdateBody,
    ) -> Result<ObjectInfo, StoreError>;
}

#[cfg(test)]
mod tests {
    use acl_common::{AclOp, EffectiveRights, RightsMask};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_body_without_propagation() {
        let patch = Ace::new("U1", EffectiveRights::new(RightsMask::BROWSE), false, false)
            .build_patch(AclOp::Add);
        let value = serde_json::to_value(AclUpdateBody::single(patch)).unwrap();

        assert_eq!(
            value,
            json!({
                "acl": [{
                    "op": "ADD",
                    "trustee": "U1",
                    "rights": 1,
                    "type": 1,
                    "denied": false,
                    "inheritable": false,
                }]
            })
        );
    }

    #[test]
    fn test_body_with_propagation() {
        let mut body = AclUpdateBody::new(Vec::new());
        body.propagate_acl_to_children = Some(true);
        body.propagation_behavior = Some(PropagationBehavior::OverwriteRecursive);

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["propagateACLToChildren"], json!(true));
        assert_eq!(value["propagationBehavior"], json!("overwrite_recursive"));
    }

    #[test]
    fn test_object_info_keeps_unknown_fields() {
        let info: ObjectInfo = serde_json::from_value(json!({
            "id": "OBJ1",
            "name": "Revenue",
            "type": 3,
            "owner": {"id": "U9"},
            "acl": [{"trusteeId": "U1", "rights": 197, "deny": false, "type": 1}],
        }))
        .unwrap();

        assert_eq!(info.object_type, Some(3));
        assert_eq!(info.acl.len(), 1);
        assert_eq!(info.acl[0].rights.mask, RightsMask::VIEW);
        assert_eq!(info.extra["owner"], json!({"id": "U9"}));
    }

    #[test]
    fn test_object_info_without_acl() {
        let info: ObjectInfo = serde_json::from_value(json!({"id": "OBJ1"})).unwrap();
        assert!(info.acl.is_empty());
    }
}
