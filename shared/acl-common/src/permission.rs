//! Human-facing permission presets.
//!
//! Presets are string-valued: `Denied All` and `Full Control` share the same
//! mask and differ only in the deny flag, so the mask alone cannot identify
//! a preset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::rights::{AggregatedRights, RightsMask};

/// Permission preset applied to a trustee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "Denied All")]
    DeniedAll,
    #[serde(rename = "Default All")]
    DefaultAll,
    #[serde(rename = "Consume")]
    Consume,
    #[serde(rename = "View")]
    View,
    #[serde(rename = "Modify")]
    Modify,
    #[serde(rename = "Full Control")]
    FullControl,
}

/// What applying a preset means for the grant step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetGrant {
    /// Add an entry with these rights and deny flag.
    Apply { rights: RightsMask, denied: bool },
    /// Clear existing entries and add nothing.
    ClearOnly,
}

impl Permission {
    pub const ALL: [Self; 6] = [
        Self::DeniedAll,
        Self::DefaultAll,
        Self::Consume,
        Self::View,
        Self::Modify,
        Self::FullControl,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeniedAll => "Denied All",
            Self::DefaultAll => "Default All",
            Self::Consume => "Consume",
            Self::View => "View",
            Self::Modify => "Modify",
            Self::FullControl => "Full Control",
        }
    }

    /// Rights bundle behind the preset.
    #[must_use]
    pub const fn aggregated_rights(self) -> AggregatedRights {
        match self {
            Self::Consume => AggregatedRights::Consume,
            Self::View => AggregatedRights::View,
            Self::Modify => AggregatedRights::Modify,
            Self::FullControl | Self::DeniedAll => AggregatedRights::All,
            Self::DefaultAll => AggregatedRights::None,
        }
    }

    /// Resolve the preset into the grant step.
    ///
    /// # Examples
    ///
    /// ```
    /// use acl_common::{Permission, PresetGrant, RightsMask};
    ///
    /// assert_eq!(
    ///     Permission::DeniedAll.resolve(),
    ///     PresetGrant::Apply { rights: RightsMask::ALL, denied: true }
    /// );
    /// assert_eq!(Permission::DefaultAll.resolve(), PresetGrant::ClearOnly);
    /// ```
    #[must_use]
    pub const fn resolve(self) -> PresetGrant {
        match self {
            Self::DefaultAll => PresetGrant::ClearOnly,
            other => PresetGrant::Apply {
                rights: other.aggregated_rights().mask(),
                denied: matches!(other, Self::DeniedAll),
            },
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownPermission(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_full_control() {
        assert_eq!(
            Permission::FullControl.resolve(),
            PresetGrant::Apply {
                rights: RightsMask::ALL,
                denied: false
            }
        );
    }

    #[test]
    fn test_resolve_denied_all() {
        assert_eq!(
            Permission::DeniedAll.resolve(),
            PresetGrant::Apply {
                rights: RightsMask::ALL,
                denied: true
            }
        );
    }

    #[test]
    fn test_resolve_default_all_is_clear_only() {
        assert_eq!(Permission::DefaultAll.resolve(), PresetGrant::ClearOnly);
        assert_eq!(
            Permission::DefaultAll.aggregated_rights(),
            AggregatedRights::None
        );
    }

    #[test]
    fn test_resolve_bundles() {
        let cases = [
            (Permission::Consume, RightsMask::CONSUME),
            (Permission::View, RightsMask::VIEW),
            (Permission::Modify, RightsMask::MODIFY),
        ];

        for (permission, rights) in cases {
            assert_eq!(
                permission.resolve(),
                PresetGrant::Apply {
                    rights,
                    denied: false
                },
                "{permission} resolved to the wrong bundle"
            );
        }
    }

    #[test]
    fn test_denied_all_and_full_control_share_mask() {
        assert_eq!(
            Permission::DeniedAll.aggregated_rights().mask(),
            Permission::FullControl.aggregated_rights().mask()
        );
        assert_ne!(Permission::DeniedAll, Permission::FullControl);
    }

    #[test]
    fn test_parse_display_strings() {
        for permission in Permission::ALL {
            assert_eq!(permission.as_str().parse::<Permission>(), Ok(permission));
        }
        assert!(matches!(
            "Everything".parse::<Permission>(),
            Err(ValidationError::UnknownPermission(_))
        ));
    }

    #[test]
    fn test_serde_uses_display_strings() {
        let json = serde_json::to_string(&Permission::FullControl).unwrap();
        assert_eq!(json, "\"Full Control\"");

        let parsed: Permission = serde_json::from_str("\"Denied All\"").unwrap();
        assert_eq!(parsed, Permission::DeniedAll);
    }
}
