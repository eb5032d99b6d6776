//! ACL Engine
//!
//! Applies access control changes to objects held by a remote object store:
//! the ADD/REMOVE/REPLACE mutation protocol with folder inheritance and
//! propagation, plus the two trustee reconcilers (permission presets and
//! per-right custom settings).

pub mod config;
pub mod custom;
pub mod error;
pub mod http;
pub mod mutator;
pub mod reconcile;
pub mod store;
pub mod telemetry;

pub use acl_common;

pub use config::EngineConfig;
pub use custom::{set_custom_permissions, CustomRights, RightState, SetCustomPermissions};
pub use error::{AclError, Result, StoreError};
pub use http::HttpObjectStore;
pub use mutator::{acl_add, acl_alter, acl_remove, modify_rights, AclMutation, ObjectAclUpdate};
pub use reconcile::{
    set_permission, GrantPolicy, Phase, ReconcileReport, SetPermission, SuppressedFailure,
};
pub use store::{AclUpdateBody, ObjectInfo, ObjectStore};
