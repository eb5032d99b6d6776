//! Read-side filtering of an object's ACL.

use serde::Deserialize;

use crate::ace::Ace;
use crate::rights::EffectiveRights;

/// Exact-match conditions over [`Ace`] fields. Unset fields match anything.
///
/// Deserializes from a map keyed by field name, so filters collected as
/// key/value pairs can be checked up front:
///
/// ```
/// use acl_common::AclFilter;
///
/// let filter: AclFilter =
///     serde_json::from_value(serde_json::json!({"deny": true, "trustee_name": "John"})).unwrap();
/// assert_eq!(filter.denied, Some(true));
///
/// let unknown = serde_json::from_value::<AclFilter>(serde_json::json!({"colour": "red"}));
/// assert!(unknown.is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AclFilter {
    #[serde(default, alias = "deny")]
    pub denied: Option<bool>,
    #[serde(default, alias = "type")]
    pub entry_type: Option<i32>,
    #[serde(default)]
    pub rights: Option<EffectiveRights>,
    #[serde(default)]
    pub trustee_id: Option<String>,
    #[serde(default)]
    pub trustee_name: Option<String>,
    #[serde(default)]
    pub trustee_type: Option<i32>,
    #[serde(default)]
    pub trustee_subtype: Option<i32>,
    #[serde(default)]
    pub inheritable: Option<bool>,
}

impl AclFilter {
    #[must_use]
    pub fn trustee_name(mut self, name: impl Into<String>) -> Self {
        self.trustee_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn trustee_id(mut self, id: impl Into<String>) -> Self {
        self.trustee_id = Some(id.into());
        self
    }

    #[must_use]
    pub const fn denied(mut self, denied: bool) -> Self {
        self.denied = Some(denied);
        self
    }

    /// True when every set condition equals the entry's field.
    pub fn matches(&self, ace: &Ace) -> bool {
        fn check<T: PartialEq>(want: Option<&T>, have: &T) -> bool {
            want.is_none_or(|w| w == have)
        }

        check(self.denied.as_ref(), &ace.denied)
            && check(self.entry_type.as_ref(), &ace.entry_type)
            && check(self.rights.as_ref(), &ace.rights)
            && check(self.trustee_id.as_ref(), &ace.trustee_id)
            && check(self.inheritable.as_ref(), &ace.inheritable)
            && self
                .trustee_name
                .as_ref()
                .is_none_or(|w| ace.trustee_name.as_ref() == Some(w))
            && self
                .trustee_type
                .is_none_or(|w| ace.trustee_type == Some(w))
            && self
                .trustee_subtype
                .is_none_or(|w| ace.trustee_subtype == Some(w))
    }
}

/// Entries of `acl` matching `filter`, in their original order.
pub fn list_acl(acl: &[Ace], filter: &AclFilter) -> Vec<Ace> {
    acl.iter().filter(|ace| filter.matches(ace)).cloned().collect()
}
