//! Trustee permission presets across a batch of objects.
//!
//! Setting a preset always clears the trustee's deny and grant entries first,
//! then adds the preset's rights (unless the preset is `Default All`). Each
//! pass is one batch mutation over every object, so a pass finishes for all
//! objects before the next pass starts.
//!
//! A store failure stops the rest of its pass (objects after the failing one
//! are skipped for that pass only). Such failures are expected (removing an
//! entry that does not exist) and are recorded in a [`ReconcileReport`]
//! instead of aborting. Validation errors are never suppressed.

use acl_common::{
    AclOp, ObjectType, Permission, PresetGrant, ProjectRef, PropagationBehavior, RightsMask,
    TrusteeRef, ValidationError,
};
use tracing::{info, warn};

use crate::error::{AclError, Result, StoreError};
use crate::mutator::{apply_mutation, AclMutation, MutationFailure};
use crate::store::{ObjectInfo, ObjectStore};

/// How a failure of the final grant/deny step is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrantPolicy {
    /// Record it in the report and carry on.
    #[default]
    Suppress,
    /// Return it as an error.
    Propagate,
}

/// Step of a reconciliation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// REMOVE with `denied = true`.
    ClearDenied,
    /// REMOVE with `denied = false`.
    ClearGranted,
    /// Second REMOVE with `denied = true` when resetting rights to default.
    ResetDefault,
    /// ADD with `denied = false`.
    Grant,
    /// ADD with `denied = true`.
    Deny,
}

impl Phase {
    /// Grant and deny steps apply the requested access; the others clear.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Grant | Self::Deny)
    }
}

/// A store failure that was recorded instead of returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressedFailure {
    pub object_id: String,
    pub phase: Phase,
    pub error: StoreError,
}

/// Outcome of a reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub suppressed: Vec<SuppressedFailure>,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.suppressed.is_empty()
    }

    /// True when a grant or deny step failed for any object.
    #[must_use]
    pub fn grant_failed(&self) -> bool {
        self.suppressed.iter().any(|f| f.phase.is_final())
    }

    /// Objects whose grant or deny step failed.
    pub fn failed_objects(&self) -> impl Iterator<Item = &str> {
        self.suppressed
            .iter()
            .filter(|f| f.phase.is_final())
            .map(|f| f.object_id.as_str())
    }
}

/// Shared target of every pass of a reconciliation.
pub(crate) struct Pass<'a> {
    pub(crate) object_type: ObjectType,
    pub(crate) to_objects: &'a [String],
    pub(crate) trustee: &'a TrusteeRef,
    pub(crate) project: Option<&'a ProjectRef>,
    pub(crate) propagate_to_children: Option<bool>,
    pub(crate) propagation_behavior: Option<PropagationBehavior>,
}

impl Pass<'_> {
    /// Run one REMOVE/ADD over every object and record a store failure in
    /// `report` unless `policy` says to return it.
    pub(crate) async fn run(
        &self,
        store: &dyn ObjectStore,
        op: AclOp,
        rights: RightsMask,
        phase: Phase,
        policy: GrantPolicy,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let denied = matches!(phase, Phase::ClearDenied | Phase::ResetDefault | Phase::Deny);
        let mutation = AclMutation::new(self.object_type, op, rights)
            .on(self.to_objects)
            .for_trustee(self.trustee.clone())
            .denied(denied)
            .propagate(self.propagate_to_children, self.propagation_behavior)
            .in_project(self.project.cloned());

        let outcome = apply_mutation(store, &mutation).await;
        suppress_store_error(outcome, phase, policy, report)
    }
}

/// Turn a store error into a [`SuppressedFailure`].
///
/// Validation errors always pass through, as do final-pass store errors
/// under [`GrantPolicy::Propagate`].
pub(crate) fn suppress_store_error(
    outcome: std::result::Result<Option<ObjectInfo>, MutationFailure>,
    phase: Phase,
    policy: GrantPolicy,
    report: &mut ReconcileReport,
) -> Result<()> {
    let failure = match outcome {
        Ok(_) => return Ok(()),
        Err(failure) => failure,
    };

    match failure.error {
        AclError::Store(error) if !(phase.is_final() && policy == GrantPolicy::Propagate) => {
            let object_id = failure.object_id.unwrap_or_default();
            warn!(%object_id, ?phase, error = %error, "Ignoring object store failure");
            report.suppressed.push(SuppressedFailure {
                object_id,
                phase,
                error,
            });
            Ok(())
        }
        other => Err(other),
    }
}

/// Parameters of [`set_permission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPermission {
    pub trustee: TrusteeRef,
    pub permission: Permission,
    pub to_objects: Vec<String>,
    pub object_type: ObjectType,
    pub project: Option<ProjectRef>,
    pub propagate_to_children: Option<bool>,
    pub propagation_behavior: Option<PropagationBehavior>,
}

impl SetPermission {
    pub fn new<I, S>(
        trustee: impl Into<TrusteeRef>,
        permission: Permission,
        object_type: ObjectType,
        to_objects: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trustee: trustee.into(),
            permission,
            to_objects: to_objects.into_iter().map(Into::into).collect(),
            object_type,
            project: None,
            propagate_to_children: None,
            propagation_behavior: None,
        }
    }

    #[must_use]
    pub fn in_project(mut self, project: impl Into<ProjectRef>) -> Self {
        self.project = Some(project.into());
        self
    }

    #[must_use]
    pub const fn propagate(
        mut self,
        propagate_to_children: bool,
        behavior: Option<PropagationBehavior>,
    ) -> Self {
        self.propagate_to_children = Some(propagate_to_children);
        self.propagation_behavior = behavior;
        self
    }
}

/// Set the trustee's access to every object to `request.permission`.
///
/// Three passes over all objects: REMOVE all rights with `denied = true`,
/// REMOVE all rights with `denied = false`, then ADD the preset's rights
/// (skipped for `Default All`, which leaves no explicit entry behind).
#[tracing::instrument(
    skip(store, request),
    fields(
        trustee = request.trustee.resolve_id(),
        permission = %request.permission,
        objects = request.to_objects.len(),
    )
)]
pub async fn set_permission(
    store: &dyn ObjectStore,
    request: &SetPermission,
    policy: GrantPolicy,
) -> Result<ReconcileReport> {
    if request.to_objects.is_empty() {
        return Err(ValidationError::Empty("object id").into());
    }

    let grant = request.permission.resolve();
    let mut report = ReconcileReport::default();

    let pass = Pass {
        object_type: request.object_type,
        to_objects: &request.to_objects,
        trustee: &request.trustee,
        project: request.project.as_ref(),
        propagate_to_children: request.propagate_to_children,
        propagation_behavior: request.propagation_behavior,
    };

    pass.run(
        store,
        AclOp::Remove,
        RightsMask::ALL,
        Phase::ClearDenied,
        policy,
        &mut report,
    )
    .await?;
    pass.run(
        store,
        AclOp::Remove,
        RightsMask::ALL,
        Phase::ClearGranted,
        policy,
        &mut report,
    )
    .await?;

    if let PresetGrant::Apply { rights, denied } = grant {
        let phase = if denied { Phase::Deny } else { Phase::Grant };
        pass.run(store, AclOp::Add, rights, phase, policy, &mut report)
            .await?;
    }

    info!(
        suppressed = report.suppressed.len(),
        grant_failed = report.grant_failed(),
        "Permission set"
    );
    Ok(report)
}
