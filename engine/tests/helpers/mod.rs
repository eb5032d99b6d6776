//! In-memory object store for integration tests.
//!
//! `RecordingStore` keeps an ACL per object id, applies ADD/REMOVE/REPLACE
//! patches the way the REST API does, and records every call in order.
//! Individual calls can be made to fail.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use acl_engine::acl_common::{Ace, AclOp, AcePatch, EffectiveRights, ObjectType, RightsMask};
use acl_engine::{AclUpdateBody, ObjectInfo, ObjectStore, StoreError};
use async_trait::async_trait;

/// A single call made against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get {
        object_type: ObjectType,
        id: String,
        project_id: Option<String>,
    },
    Update {
        object_type: ObjectType,
        id: String,
        project_id: Option<String>,
        body: AclUpdateBody,
    },
}

impl Call {
    pub fn is_update(&self) -> bool {
        matches!(self, Self::Update { .. })
    }

    /// The only patch of an update call.
    pub fn patch(&self) -> &AcePatch {
        match self {
            Self::Update { body, .. } => {
                assert_eq!(body.acl.len(), 1, "expected a single patch");
                &body.acl[0]
            }
            Self::Get { .. } => panic!("not an update call: {self:?}"),
        }
    }

    pub fn body(&self) -> &AclUpdateBody {
        match self {
            Self::Update { body, .. } => body,
            Self::Get { .. } => panic!("not an update call: {self:?}"),
        }
    }

    pub fn object_id(&self) -> &str {
        match self {
            Self::Get { id, .. } | Self::Update { id, .. } => id,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    objects: HashMap<String, Vec<Ace>>,
    calls: Vec<Call>,
    updates_seen: usize,
    failing_updates: HashSet<usize>,
    failing_objects: HashSet<String>,
    fail_gets: bool,
    reject_missing_removes: bool,
}

#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: Mutex<Inner>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object with an existing ACL.
    pub fn with_object(self, id: &str, acl: Vec<Ace>) -> Self {
        self.inner.lock().unwrap().objects.insert(id.to_string(), acl);
        self
    }

    /// Fail the `index`-th update call (0-based, counted across all objects).
    pub fn failing_update(self, index: usize) -> Self {
        self.inner.lock().unwrap().failing_updates.insert(index);
        self
    }

    /// Fail every call touching `id`.
    pub fn failing_object(self, id: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .failing_objects
            .insert(id.to_string());
        self
    }

    pub fn failing_gets(self) -> Self {
        self.inner.lock().unwrap().fail_gets = true;
        self
    }

    /// Reject REMOVE patches that match no existing entry, like the server.
    pub fn rejecting_missing_removes(self) -> Self {
        self.inner.lock().unwrap().reject_missing_removes = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn updates(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_update).collect()
    }

    pub fn acl(&self, id: &str) -> Vec<Ace> {
        self.inner
            .lock()
            .unwrap()
            .objects
            .get(id)
            .cloned()
            .unwrap_or_default()
    }
}

fn rejected(message: &str) -> StoreError {
    StoreError::Status {
        status: 400,
        code: Some("ERR001".to_string()),
        message: message.to_string(),
        ticket_id: None,
    }
}

fn not_found(id: &str) -> StoreError {
    StoreError::Status {
        status: 404,
        code: Some("ERR004".to_string()),
        message: format!("Object {id} not found"),
        ticket_id: None,
    }
}

/// Apply one patch to `acl`; `false` when a REMOVE matched nothing.
fn apply_patch(acl: &mut Vec<Ace>, patch: &AcePatch) -> bool {
    let position = acl
        .iter()
        .position(|ace| ace.trustee_id == patch.trustee && ace.denied == patch.denied);

    match (patch.op, position) {
        (AclOp::Add, Some(i)) => {
            acl[i].rights.mask |= patch.rights.mask;
            acl[i].inheritable = patch.inheritable;
        }
        (AclOp::Add | AclOp::Replace, None) => {
            acl.push(Ace::new(
                patch.trustee.clone(),
                EffectiveRights::new(patch.rights.mask),
                patch.denied,
                patch.inheritable,
            ));
        }
        (AclOp::Replace, Some(i)) => {
            acl[i].rights.mask = patch.rights.mask;
            acl[i].inheritable = patch.inheritable;
        }
        (AclOp::Remove, Some(i)) => {
            acl[i].rights.mask.remove(patch.rights.mask);
            if acl[i].rights.mask == RightsMask::empty() {
                acl.remove(i);
            }
        }
        (AclOp::Remove, None) => return false,
    }
    true
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn get_object_info(
        &self,
        object_type: ObjectType,
        id: &str,
        project_id: Option<&str>,
    ) -> Result<ObjectInfo, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Get {
            object_type,
            id: id.to_string(),
            project_id: project_id.map(str::to_string),
        });

        if inner.fail_gets || inner.failing_objects.contains(id) {
            return Err(not_found(id));
        }

        let acl = inner.objects.get(id).cloned().unwrap_or_default();
        Ok(ObjectInfo::new(id, acl))
    }

    async fn update_object_acl(
        &self,
        object_type: ObjectType,
        id: &str,
        project_id: Option<&str>,
        body: &AclUpdateBody,
    ) -> Result<ObjectInfo, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Update {
            object_type,
            id: id.to_string(),
            project_id: project_id.map(str::to_string),
            body: body.clone(),
        });

        let index = inner.updates_seen;
        inner.updates_seen += 1;
        if inner.failing_updates.contains(&index) {
            return Err(rejected("Injected failure"));
        }
        if inner.failing_objects.contains(id) {
            return Err(not_found(id));
        }

        let reject_missing = inner.reject_missing_removes;
        let mut acl = inner.objects.get(id).cloned().unwrap_or_default();
        for patch in &body.acl {
            if !apply_patch(&mut acl, patch) && reject_missing {
                return Err(rejected("Entry does not exist"));
            }
        }
        inner.objects.insert(id.to_string(), acl.clone());

        Ok(ObjectInfo::new(id, acl))
    }
}
