//! ACL mutation protocol.
//!
//! [`modify_rights`] is the single mutation primitive used by the
//! reconcilers: one update request per (object, trustee) pair, objects in the
//! outer loop and trustees in the inner loop. For folders without an explicit
//! `inheritable` value, each pair first reads the folder's ACL and reuses the
//! trustee's existing inheritable flag.
//!
//! The per-object helpers ([`acl_add`], [`acl_remove`], [`acl_alter`]) bundle
//! one patch per trustee into a single request instead.

use acl_common::{
    Ace, AclOp, EffectiveRights, ObjectRef, ObjectType, ProjectRef, PropagationBehavior,
    TrusteeRef, ValidationError,
};
use tracing::debug;

use crate::error::{AclError, Result, StoreError};
use crate::store::{AclUpdateBody, ObjectInfo, ObjectStore};

/// Parameters of one [`modify_rights`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclMutation {
    pub object_type: ObjectType,
    pub ids: Vec<String>,
    pub op: AclOp,
    pub rights: EffectiveRights,
    pub trustees: Vec<TrusteeRef>,
    pub denied: bool,
    /// `None` on folders means "keep the trustee's current flag".
    pub inheritable: Option<bool>,
    pub propagate_to_children: Option<bool>,
    pub propagation_behavior: Option<PropagationBehavior>,
    pub project: Option<ProjectRef>,
}

impl AclMutation {
    pub fn new(object_type: ObjectType, op: AclOp, rights: impl Into<EffectiveRights>) -> Self {
        Self {
            object_type,
            ids: Vec::new(),
            op,
            rights: rights.into(),
            trustees: Vec::new(),
            denied: false,
            inheritable: None,
            propagate_to_children: None,
            propagation_behavior: None,
            project: None,
        }
    }

    /// Build a mutation from untyped input, validating each value.
    ///
    /// # Examples
    ///
    /// ```
    /// use acl_engine::AclMutation;
    ///
    /// assert!(AclMutation::parse(8, "ADD", 1).is_ok());
    /// assert!(AclMutation::parse(8, "UPSERT", 1).is_err());
    /// assert!(AclMutation::parse(8, "ADD", 256).is_err());
    /// assert!(AclMutation::parse(5, "ADD", 1).is_err());
    /// ```
    pub fn parse(
        object_type: i32,
        op: &str,
        rights: i64,
    ) -> std::result::Result<Self, ValidationError> {
        let op = op.parse::<AclOp>()?;
        let object_type = ObjectType::try_from(object_type)?;
        let rights = EffectiveRights::from_wire(rights)?;
        Ok(Self::new(object_type, op, rights))
    }

    #[must_use]
    pub fn on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn on_object(self, id: impl Into<String>) -> Self {
        self.on([id.into()])
    }

    #[must_use]
    pub fn for_trustees<I, T>(mut self, trustees: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TrusteeRef>,
    {
        self.trustees.extend(trustees.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn for_trustee(self, trustee: impl Into<TrusteeRef>) -> Self {
        self.for_trustees([trustee.into()])
    }

    #[must_use]
    pub const fn denied(mut self, denied: bool) -> Self {
        self.denied = denied;
        self
    }

    #[must_use]
    pub const fn inheritable(mut self, inheritable: Option<bool>) -> Self {
        self.inheritable = inheritable;
        self
    }

    #[must_use]
    pub const fn propagate(
        mut self,
        propagate_to_children: Option<bool>,
        behavior: Option<PropagationBehavior>,
    ) -> Self {
        self.propagate_to_children = propagate_to_children;
        self.propagation_behavior = behavior;
        self
    }

    #[must_use]
    pub fn in_project(mut self, project: Option<ProjectRef>) -> Self {
        self.project = project;
        self
    }

    /// Checks that need no I/O.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.ids.is_empty() {
            return Err(ValidationError::Empty("object id"));
        }
        if self.trustees.is_empty() {
            return Err(ValidationError::Empty("trustee"));
        }
        Ok(())
    }

    fn project_id(&self) -> Option<&str> {
        self.project.as_ref().map(ProjectRef::resolve_id)
    }
}

/// Add folder propagation fields to `body` when they apply.
fn apply_propagation(
    body: &mut AclUpdateBody,
    object_type: ObjectType,
    propagate_to_children: Option<bool>,
    behavior: Option<PropagationBehavior>,
) {
    if object_type.supports_inheritance() && propagate_to_children == Some(true) {
        body.propagate_acl_to_children = Some(true);
        body.propagation_behavior = Some(behavior.unwrap_or_default());
    }
}

/// Inheritable flag of the trustee's existing entry with the same deny flag,
/// or `false` when there is none.
async fn discover_inheritable(
    store: &dyn ObjectStore,
    object_type: ObjectType,
    id: &str,
    project_id: Option<&str>,
    trustee_id: &str,
    denied: bool,
) -> std::result::Result<bool, StoreError> {
    let object = store.get_object_info(object_type, id, project_id).await?;
    Ok(object
        .acl
        .iter()
        .find(|ace| ace.trustee_id == trustee_id && ace.denied == denied)
        .is_some_and(|ace| ace.inheritable))
}

/// A failed [`modify_rights`] call and the object it stopped at.
#[derive(Debug)]
pub(crate) struct MutationFailure {
    /// `None` when validation failed before any request.
    pub(crate) object_id: Option<String>,
    pub(crate) error: AclError,
}

impl From<ValidationError> for MutationFailure {
    fn from(err: ValidationError) -> Self {
        Self {
            object_id: None,
            error: err.into(),
        }
    }
}

/// Apply `mutation.op` for every (object, trustee) pair.
///
/// Returns the updated object when exactly one object id was given, `None`
/// otherwise. The first store error aborts the call; pairs already applied
/// stay applied.
pub async fn modify_rights(
    store: &dyn ObjectStore,
    mutation: &AclMutation,
) -> Result<Option<ObjectInfo>> {
    apply_mutation(store, mutation).await.map_err(|f| f.error)
}

#[tracing::instrument(
    skip(store, mutation),
    fields(
        object_type = ?mutation.object_type,
        op = %mutation.op,
        denied = mutation.denied,
        objects = mutation.ids.len(),
        trustees = mutation.trustees.len(),
    )
)]
pub(crate) async fn apply_mutation(
    store: &dyn ObjectStore,
    mutation: &AclMutation,
) -> std::result::Result<Option<ObjectInfo>, MutationFailure> {
    mutation.validate()?;

    let project_id = mutation.project_id();
    let mut last = None;

    for id in &mutation.ids {
        let failed_at = |error: StoreError| MutationFailure {
            object_id: Some(id.clone()),
            error: error.into(),
        };

        for trustee in &mutation.trustees {
            let trustee_id = trustee.resolve_id();

            let inheritable = match mutation.inheritable {
                Some(inheritable) => inheritable,
                None if mutation.object_type.supports_inheritance() => discover_inheritable(
                    store,
                    mutation.object_type,
                    id,
                    project_id,
                    trustee_id,
                    mutation.denied,
                )
                .await
                .map_err(failed_at)?,
                None => false,
            };

            let ace = Ace::new(trustee_id, mutation.rights, mutation.denied, inheritable);
            let mut body = AclUpdateBody::single(ace.build_patch(mutation.op));
            apply_propagation(
                &mut body,
                mutation.object_type,
                mutation.propagate_to_children,
                mutation.propagation_behavior,
            );

            debug!(
                object_id = %id,
                trustee_id,
                rights = mutation.rights.to_wire(),
                inheritable,
                "Updating ACL entry"
            );
            last = Some(
                store
                    .update_object_acl(mutation.object_type, id, project_id, &body)
                    .await
                    .map_err(failed_at)?,
            );
        }
    }

    Ok(if mutation.ids.len() == 1 { last } else { None })
}

/// Entry values shared by every trustee of a bundled update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAclUpdate {
    pub rights: EffectiveRights,
    pub trustees: Vec<TrusteeRef>,
    pub denied: bool,
    pub inheritable: bool,
    pub propagate_to_children: Option<bool>,
    pub propagation_behavior: Option<PropagationBehavior>,
}

impl ObjectAclUpdate {
    pub fn new<I, T>(rights: impl Into<EffectiveRights>, trustees: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TrusteeRef>,
    {
        Self {
            rights: rights.into(),
            trustees: trustees.into_iter().map(Into::into).collect(),
            denied: false,
            inheritable: false,
            propagate_to_children: None,
            propagation_behavior: None,
        }
    }

    #[must_use]
    pub const fn denied(mut self, denied: bool) -> Self {
        self.denied = denied;
        self
    }

    #[must_use]
    pub const fn inheritable(mut self, inheritable: bool) -> Self {
        self.inheritable = inheritable;
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

/// Add an entry for every trustee of `update` to the object's ACL.
pub async fn acl_add(
    store: &dyn ObjectStore,
    object: &ObjectRef,
    update: &ObjectAclUpdate,
) -> Result<ObjectInfo> {
    update_acl(store, object, AclOp::Add, update).await
}

/// Remove the rights of `update` from every trustee's entry.
pub async fn acl_remove(
    store: &dyn ObjectStore,
    object: &ObjectRef,
    update: &ObjectAclUpdate,
) -> Result<ObjectInfo> {
    update_acl(store, object, AclOp::Remove, update).await
}

/// Replace every trustee's entry with the rights of `update`.
pub async fn acl_alter(
    store: &dyn ObjectStore,
    object: &ObjectRef,
    update: &ObjectAclUpdate,
) -> Result<ObjectInfo> {
    update_acl(store, object, AclOp::Replace, update).await
}

#[tracing::instrument(
    skip(store, object, update),
    fields(object_id = %object.id, object_type = ?object.object_type, op = %op)
)]
async fn update_acl(
    store: &dyn ObjectStore,
    object: &ObjectRef,
    op: AclOp,
    update: &ObjectAclUpdate,
) -> Result<ObjectInfo> {
    if update.trustees.is_empty() {
        return Err(ValidationError::Empty("trustee").into());
    }

    let patches = update
        .trustees
        .iter()
        .map(|trustee| {
            Ace::new(
                trustee.resolve_id(),
                update.rights,
                update.denied,
                update.inheritable,
            )
            .build_patch(op)
        })
        .collect();

    let mut body = AclUpdateBody::new(patches);
    if object.object_type.supports_inheritance() {
        if let Some(propagate) = update.propagate_to_children {
            body.propagate_acl_to_children = Some(propagate);
            if propagate {
                body.propagation_behavior = Some(update.propagation_behavior.unwrap_or_default());
            }
        }
    }

    debug!(patches = body.acl.len(), "Updating object ACL");
    Ok(store
        .update_object_acl(object.object_type, &object.id, object.project_id(), &body)
        .await?)
}
