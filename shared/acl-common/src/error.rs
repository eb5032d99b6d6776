//! Validation errors for ACL values.
//!
//! Every variant is raised before any request reaches the object store.

use thiserror::Error;

/// Input that cannot be turned into a rights, preset or ACE value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Rights value outside `0..=255` and `536870912..=536871167`.
    #[error(
        "Wrong rights value {0}, provide a value in range 0-255 or a combination of rights \
         with the inheritable flag"
    )]
    RightsOutOfRange(i64),

    /// Right name that is not one of the atomic rights.
    #[error(
        "Invalid right {0:?}, available values are: EXECUTE, USE, CONTROL, DELETE, WRITE, READ, \
         USE_EXECUTE, BROWSE"
    )]
    UnknownRight(String),

    /// Permission preset name that is not recognised.
    #[error(
        "Invalid permission {0:?}, available values are: 'Denied All', 'Default All', \
         'Consume', 'View', 'Modify', 'Full Control'"
    )]
    UnknownPermission(String),

    /// ACL operator other than ADD, REMOVE or REPLACE.
    #[error("Wrong ACL operator {0:?}, use ADD, REMOVE or REPLACE")]
    UnknownOperation(String),

    /// Object type code with no matching object type.
    #[error("Unknown object type code {0}")]
    UnknownObjectType(i32),

    /// Custom right state other than grant, deny or default.
    #[error("Invalid value {0:?} of the right, available values are 'grant', 'deny' or 'default'")]
    InvalidRightState(String),

    /// Propagation behavior name that is not recognised.
    #[error(
        "Invalid propagation behavior {0:?}, use 'overwrite_recursive' or 'precise_recursive'"
    )]
    UnknownPropagationBehavior(String),

    /// A list of targets (object ids, trustees) was empty.
    #[error("At least one {0} is required")]
    Empty(&'static str),
}

pub type Result<T> = std::result::Result<T, ValidationError>;
