//! References to securable objects, projects and trustees.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Object type codes understood by the object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
#[repr(i32)]
pub enum ObjectType {
    Filter = 1,
    Template = 2,
    ReportDefinition = 3,
    Metric = 4,
    AggMetric = 7,
    Folder = 8,
    SubscriptionDevice = 9,
    Prompt = 10,
    Function = 11,
    Attribute = 12,
    Fact = 13,
    Dimension = 14,
    Table = 15,
    ShortcutType = 18,
    Monitor = 20,
    AttributeForm = 21,
    Column = 26,
    PropertySet = 28,
    DbRole = 29,
    DbLogin = 30,
    DbConnection = 31,
    Project = 32,
    /// Users and user groups share one code.
    UserOrGroup = 34,
    SubscriptionTransmitter = 35,
    Configuration = 36,
    Search = 39,
    Role = 43,
    SecurityRole = 44,
    Locale = 45,
    Consolidation = 47,
    ConsolidationElement = 48,
    ScheduleEvent = 49,
    ScheduleObject = 50,
    ScheduleTrigger = 51,
    DbTable = 53,
    DocumentDefinition = 55,
    DrillMap = 56,
    Dbms = 57,
    SecurityFilter = 58,
    GraphStyle = 61,
    Shortcut = 67,
    ShortcutTarget = 68,
    Palette = 71,
    Script = 76,
    ContentBundle = 77,
    Application = 78,
    Timezone = 79,
    Runtime = 80,
    Calendar = 81,
    Driver = 84,
}

impl ObjectType {
    const KNOWN: [Self; 50] = [
        Self::Filter,
        Self::Template,
        Self::ReportDefinition,
        Self::Metric,
        Self::AggMetric,
        Self::Folder,
        Self::SubscriptionDevice,
        Self::Prompt,
        Self::Function,
        Self::Attribute,
        Self::Fact,
        Self::Dimension,
        Self::Table,
        Self::ShortcutType,
        Self::Monitor,
        Self::AttributeForm,
        Self::Column,
        Self::PropertySet,
        Self::DbRole,
        Self::DbLogin,
        Self::DbConnection,
        Self::Project,
        Self::UserOrGroup,
        Self::SubscriptionTransmitter,
        Self::Configuration,
        Self::Search,
        Self::Role,
        Self::SecurityRole,
        Self::Locale,
        Self::Consolidation,
        Self::ConsolidationElement,
        Self::ScheduleEvent,
        Self::ScheduleObject,
        Self::ScheduleTrigger,
        Self::DbTable,
        Self::DocumentDefinition,
        Self::DrillMap,
        Self::Dbms,
        Self::SecurityFilter,
        Self::GraphStyle,
        Self::Shortcut,
        Self::ShortcutTarget,
        Self::Palette,
        Self::Script,
        Self::ContentBundle,
        Self::Application,
        Self::Timezone,
        Self::Runtime,
        Self::Calendar,
        Self::Driver,
    ];

    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Only folders carry inheritable entries and propagate to children.
    #[must_use]
    pub const fn supports_inheritance(self) -> bool {
        matches!(self, Self::Folder)
    }
}

impl TryFrom<i32> for ObjectType {
    type Error = ValidationError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::KNOWN
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(ValidationError::UnknownObjectType(code))
    }
}

impl From<ObjectType> for i32 {
    fn from(value: ObjectType) -> Self {
        value.code()
    }
}

/// A project, as handed out by the project listing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: Option<String>,
}

/// Either a bare project id or a loaded project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef {
    Id(String),
    Handle(Project),
}

impl ProjectRef {
    #[must_use]
    pub fn resolve_id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Handle(project) => &project.id,
        }
    }
}

impl From<&str> for ProjectRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for ProjectRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<Project> for ProjectRef {
    fn from(project: Project) -> Self {
        Self::Handle(project)
    }
}

/// Kind of trustee an entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrusteeKind {
    User,
    UserGroup,
}

/// A loaded user or user group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trustee {
    pub id: String,
    pub name: Option<String>,
    pub kind: TrusteeKind,
}

/// Either a bare trustee id or a loaded user/group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrusteeRef {
    Id(String),
    Handle(Trustee),
}

impl TrusteeRef {
    #[must_use]
    pub fn resolve_id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Handle(trustee) => &trustee.id,
        }
    }
}

impl From<&str> for TrusteeRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for TrusteeRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<Trustee> for TrusteeRef {
    fn from(trustee: Trustee) -> Self {
        Self::Handle(trustee)
    }
}

/// A securable object in a project (or at configuration level when
/// `project` is `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub object_type: ObjectType,
    pub id: String,
    pub project: Option<ProjectRef>,
}

impl ObjectRef {
    pub fn new(object_type: ObjectType, id: impl Into<String>) -> Self {
        Self {
            object_type,
            id: id.into(),
            project: None,
        }
    }

    #[must_use]
    pub fn in_project(mut self, project: impl Into<ProjectRef>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project.as_ref().map(ProjectRef::resolve_id)
    }
}

/// How a folder's ACL change is pushed onto its existing children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationBehavior {
    #[default]
    OverwriteRecursive,
    PreciseRecursive,
}

impl PropagationBehavior {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OverwriteRecursive => "overwrite_recursive",
            Self::PreciseRecursive => "precise_recursive",
        }
    }
}

impl fmt::Display for PropagationBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropagationBehavior {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite_recursive" => Ok(Self::OverwriteRecursive),
            "precise_recursive" => Ok(Self::PreciseRecursive),
            _ => Err(ValidationError::UnknownPropagationBehavior(s.to_string())),
        }
    }
}
