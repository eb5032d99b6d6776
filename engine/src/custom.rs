//! Per-right grant/deny/default settings for a trustee.

use std::fmt;
use std::str::FromStr;

use acl_common::{AclOp, ObjectType, ProjectRef, Right, RightsMask, TrusteeRef, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::reconcile::{GrantPolicy, Pass, Phase, ReconcileReport};
use crate::store::ObjectStore;

/// Requested state of a single right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RightState {
    Grant,
    Deny,
    /// No explicit entry in either direction.
    Default,
}

impl RightState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grant => "grant",
            Self::Deny => "deny",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for RightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RightState {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "grant" => Ok(Self::Grant),
            "deny" => Ok(Self::Deny),
            "default" => Ok(Self::Default),
            other => Err(ValidationError::InvalidRightState(other.to_string())),
        }
    }
}

/// Requested state per customizable right. `None` leaves the right untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomRights {
    #[serde(default)]
    pub execute: Option<RightState>,
    #[serde(default, rename = "use")]
    pub use_: Option<RightState>,
    #[serde(default)]
    pub control: Option<RightState>,
    #[serde(default)]
    pub delete: Option<RightState>,
    #[serde(default)]
    pub write: Option<RightState>,
    #[serde(default)]
    pub read: Option<RightState>,
    #[serde(default)]
    pub browse: Option<RightState>,
}

impl CustomRights {
    /// Build from `(right, state)` string pairs such as `("read", "deny")`.
    ///
    /// Every pair is validated; a later pair for the same right wins.
    pub fn from_pairs<'a, I>(pairs: I) -> std::result::Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut rights = Self::default();
        for (right, state) in pairs {
            let right: Right = right.parse()?;
            let state: RightState = state.parse()?;
            rights.set_state(right, Some(state))?;
        }
        Ok(rights)
    }

    /// Set the state of one right. `USE_EXECUTE` cannot be set on its own.
    pub fn set_state(
        &mut self,
        right: Right,
        state: Option<RightState>,
    ) -> std::result::Result<(), ValidationError> {
        let slot = match right {
            Right::Execute => &mut self.execute,
            Right::Use => &mut self.use_,
            Right::Control => &mut self.control,
            Right::Delete => &mut self.delete,
            Right::Write => &mut self.write,
            Right::Read => &mut self.read,
            Right::Browse => &mut self.browse,
            Right::UseExecute => {
                return Err(ValidationError::UnknownRight(right.name().to_string()));
            }
        };
        *slot = state;
        Ok(())
    }

    #[must_use]
    pub const fn state(&self, right: Right) -> Option<RightState> {
        match right {
            Right::Execute => self.execute,
            Right::Use => self.use_,
            Right::Control => self.control,
            Right::Delete => self.delete,
            Right::Write => self.write,
            Right::Read => self.read,
            Right::Browse => self.browse,
            Right::UseExecute => None,
        }
    }

    /// OR of every right requested in `state`.
    #[must_use]
    pub fn mask_for(&self, state: RightState) -> RightsMask {
        RightsMask::from_rights(
            Right::CUSTOMIZABLE
                .into_iter()
                .filter(|right| self.state(*right) == Some(state)),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        Right::CUSTOMIZABLE
            .into_iter()
            .all(|right| self.state(right).is_none())
    }
}

/// Parameters of [`set_custom_permissions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCustomPermissions {
    pub trustee: TrusteeRef,
    pub to_objects: Vec<String>,
    pub object_type: ObjectType,
    pub project: Option<ProjectRef>,
    pub rights: CustomRights,
}

impl SetCustomPermissions {
    pub fn new<I, S>(
        trustee: impl Into<TrusteeRef>,
        object_type: ObjectType,
        to_objects: I,
        rights: CustomRights,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trustee: trustee.into(),
            to_objects: to_objects.into_iter().map(Into::into).collect(),
            object_type,
            project: None,
            rights,
        }
    }

    #[must_use]
    pub fn in_project(mut self, project: impl Into<ProjectRef>) -> Self {
        self.project = Some(project.into());
        self
    }
}

/// Apply per-right settings for the trustee on every object.
///
/// Each pass runs over every object, in this order:
/// - granted rights: REMOVE with `denied = true`, then ADD with `denied = false`
/// - denied rights: REMOVE with `denied = false`, then ADD with `denied = true`
/// - default rights: REMOVE with `denied = true`, twice
///
/// Groups with no rights issue no calls. A store failure skips the remaining
/// objects of its pass only.
#[tracing::instrument(
    skip(store, request),
    fields(trustee = request.trustee.resolve_id(), objects = request.to_objects.len())
)]
pub async fn set_custom_permissions(
    store: &dyn ObjectStore,
    request: &SetCustomPermissions,
    policy: GrantPolicy,
) -> Result<ReconcileReport> {
    if request.to_objects.is_empty() {
        return Err(ValidationError::Empty("object id").into());
    }

    let granted = request.rights.mask_for(RightState::Grant);
    let denied = request.rights.mask_for(RightState::Deny);
    let reset = request.rights.mask_for(RightState::Default);

    let mut plan: Vec<(AclOp, RightsMask, Phase)> = Vec::with_capacity(6);
    if !granted.is_empty() {
        plan.push((AclOp::Remove, granted, Phase::ClearDenied));
        plan.push((AclOp::Add, granted, Phase::Grant));
    }
    if !denied.is_empty() {
        plan.push((AclOp::Remove, denied, Phase::ClearGranted));
        plan.push((AclOp::Add, denied, Phase::Deny));
    }
    if !reset.is_empty() {
        plan.push((AclOp::Remove, reset, Phase::ClearDenied));
        plan.push((AclOp::Remove, reset, Phase::ResetDefault));
    }

    let mut report = ReconcileReport::default();
    let pass = Pass {
        object_type: request.object_type,
        to_objects: &request.to_objects,
        trustee: &request.trustee,
        project: request.project.as_ref(),
        propagate_to_children: None,
        propagation_behavior: None,
    };
    for (op, rights, phase) in plan {
        pass.run(store, op, rights, phase, policy, &mut report)
            .await?;
    }

    info!(
        granted = granted.bits(),
        denied = denied.bits(),
        reset = reset.bits(),
        suppressed = report.suppressed.len(),
        "Custom permissions set"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_state_parse_is_exact() {
        assert_eq!("grant".parse::<RightState>().unwrap(), RightState::Grant);
        assert_eq!("default".parse::<RightState>().unwrap(), RightState::Default);
        assert_eq!(
            "Grant".parse::<RightState>(),
            Err(ValidationError::InvalidRightState("Grant".to_string()))
        );
        assert!("allow".parse::<RightState>().is_err());
    }

    #[test]
    fn test_from_pairs_partitions_rights() {
        let rights = CustomRights::from_pairs([
            ("execute", "grant"),
            ("read", "deny"),
            ("browse", "default"),
            ("write", "grant"),
        ])
        .unwrap();

        assert_eq!(rights.mask_for(RightState::Grant), RightsMask::EXECUTE | RightsMask::WRITE);
        assert_eq!(rights.mask_for(RightState::Deny), RightsMask::READ);
        assert_eq!(rights.mask_for(RightState::Default), RightsMask::BROWSE);
        assert_eq!(rights.use_, None);
    }

    #[test]
    fn test_from_pairs_rejects_bad_state() {
        let err = CustomRights::from_pairs([("execute", "grant"), ("read", "maybe")]).unwrap_err();
        assert_eq!(err, ValidationError::InvalidRightState("maybe".to_string()));
    }

    #[test]
    fn test_use_execute_not_customizable() {
        let mut rights = CustomRights::default();
        assert!(rights
            .set_state(Right::UseExecute, Some(RightState::Grant))
            .is_err());
        assert!(CustomRights::from_pairs([("use_execute", "grant")]).is_err());
    }

    #[test]
    fn test_deserialize_uses_wire_names() {
        let rights: CustomRights =
            serde_json::from_str(r#"{"use":"deny","execute":null,"control":"grant"}"#).unwrap();
        assert_eq!(rights.use_, Some(RightState::Deny));
        assert_eq!(rights.execute, None);
        assert_eq!(rights.control, Some(RightState::Grant));

        assert!(serde_json::from_str::<CustomRights>(r#"{"read":"allow"}"#).is_err());
        assert!(serde_json::from_str::<CustomRights>(r#"{"share":"grant"}"#).is_err());
    }

    #[test]
    fn test_empty_rights() {
        assert!(CustomRights::default().is_empty());
        assert_eq!(CustomRights::default().mask_for(RightState::Grant), RightsMask::empty());
    }
}
