//! ACL Common Library
//!
//! Value types for object-level access control: rights masks, aggregated
//! rights, permission presets, access control entries and ACL filtering.
//! Nothing here performs I/O.

pub mod ace;
pub mod error;
pub mod filter;
pub mod object;
pub mod permission;
pub mod rights;

pub use ace::{Ace, AclOp, AcePatch, OBJECT_ACCESS_ENTRY};
pub use error::{Result, ValidationError};
pub use filter::{list_acl, AclFilter};
pub use object::{
    ObjectRef, ObjectType, Project, ProjectRef, PropagationBehavior, Trustee, TrusteeKind,
    TrusteeRef,
};
pub use permission::{Permission, PresetGrant};
pub use rights::{AggregatedRights, EffectiveRights, Right, RightsMask, INHERITABLE_FLAG};
