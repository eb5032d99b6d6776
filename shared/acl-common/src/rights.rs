//! Object rights using bitflags.
//!
//! Rights occupy the low 8 bits of the store's 32-bit rights word:
//! - bit 0: BROWSE
//! - bit 1: `USE_EXECUTE` (deprecated, reserved)
//! - bits 2-7: READ, WRITE, DELETE, CONTROL, USE, EXECUTE
//!
//! The inheritable flag lives at bit 29 and is kept out of [`RightsMask`].
//! [`EffectiveRights`] pairs the two and is the only place they are combined
//! into one integer, at serialization time.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

bitflags! {
    /// Rights granted or denied by an access control entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct RightsMask: u8 {
        /// See the object in folder listings
        const BROWSE      = 0b0000_0001;
        /// Deprecated combined use/execute bit, kept so masks round-trip
        const USE_EXECUTE = 0b0000_0010;
        /// Read the object definition
        const READ        = 0b0000_0100;
        /// Modify the object definition
        const WRITE       = 0b0000_1000;
        /// Delete the object
        const DELETE      = 0b0001_0000;
        /// Change the object's ACL and take ownership
        const CONTROL     = 0b0010_0000;
        /// Use the object inside other objects
        const USE         = 0b0100_0000;
        /// Execute reports and documents based on the object
        const EXECUTE     = 0b1000_0000;
    }
}

/// Bit 29 of the store's rights word.
pub const INHERITABLE_FLAG: u32 = 1 << 29;

const INHERITABLE_MIN: i64 = INHERITABLE_FLAG as i64;
const INHERITABLE_MAX: i64 = INHERITABLE_MIN + 0xFF;

impl RightsMask {
    // === Aggregated Rights ===

    /// Use, read and browse.
    pub const CONSUME: Self = Self::USE.union(Self::READ).union(Self::BROWSE);

    /// Consume plus execute.
    pub const VIEW: Self = Self::CONSUME.union(Self::EXECUTE);

    /// View plus write and delete.
    pub const MODIFY: Self = Self::VIEW.union(Self::WRITE).union(Self::DELETE);

    /// Every right bit, including the deprecated one.
    pub const ALL: Self = Self::all();

    /// OR of the given rights; empty for an empty iterator.
    pub fn from_rights<I>(rights: I) -> Self
    where
        I: IntoIterator<Item = Right>,
    {
        rights
            .into_iter()
            .fold(Self::empty(), |acc, right| acc | right.mask())
    }

    /// Per-right view of the mask, one entry for every atomic right.
    pub fn to_map(self) -> BTreeMap<Right, bool> {
        Right::ALL
            .iter()
            .map(|right| (*right, self.contains(right.mask())))
            .collect()
    }

    /// Inverse of [`RightsMask::to_map`]. Rights mapped to `false` or absent
    /// from the map are left unset.
    pub fn from_map(map: &BTreeMap<Right, bool>) -> Self {
        Self::from_rights(
            map.iter()
                .filter(|(_, granted)| **granted)
                .map(|(right, _)| *right),
        )
    }
}

impl Default for RightsMask {
    fn default() -> Self {
        Self::empty()
    }
}

/// A single atomic right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Right {
    Execute,
    Use,
    Control,
    Delete,
    Write,
    Read,
    UseExecute,
    Browse,
}

impl Right {
    pub const ALL: [Self; 8] = [
        Self::Execute,
        Self::Use,
        Self::Control,
        Self::Delete,
        Self::Write,
        Self::Read,
        Self::UseExecute,
        Self::Browse,
    ];

    /// Rights that can be set one by one; the deprecated `USE_EXECUTE` bit
    /// is excluded.
    pub const CUSTOMIZABLE: [Self; 7] = [
        Self::Execute,
        Self::Use,
        Self::Control,
        Self::Delete,
        Self::Write,
        Self::Read,
        Self::Browse,
    ];

    #[must_use]
    pub const fn mask(self) -> RightsMask {
        match self {
            Self::Execute => RightsMask::EXECUTE,
            Self::Use => RightsMask::USE,
            Self::Control => RightsMask::CONTROL,
            Self::Delete => RightsMask::DELETE,
            Self::Write => RightsMask::WRITE,
            Self::Read => RightsMask::READ,
            Self::UseExecute => RightsMask::USE_EXECUTE,
            Self::Browse => RightsMask::BROWSE,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Execute => "EXECUTE",
            Self::Use => "USE",
            Self::Control => "CONTROL",
            Self::Delete => "DELETE",
            Self::Write => "WRITE",
            Self::Read => "READ",
            Self::UseExecute => "USE_EXECUTE",
            Self::Browse => "BROWSE",
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Right {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|right| right.name() == upper)
            .ok_or_else(|| ValidationError::UnknownRight(s.to_string()))
    }
}

/// Named rights bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregatedRights {
    None,
    Consume,
    View,
    Modify,
    All,
}

impl AggregatedRights {
    #[must_use]
    pub const fn mask(self) -> RightsMask {
        match self {
            Self::None => RightsMask::empty(),
            Self::Consume => RightsMask::CONSUME,
            Self::View => RightsMask::VIEW,
            Self::Modify => RightsMask::MODIFY,
            Self::All => RightsMask::ALL,
        }
    }
}

impl From<AggregatedRights> for RightsMask {
    fn from(value: AggregatedRights) -> Self {
        value.mask()
    }
}

/// Rights as carried on the wire: the 8-bit mask plus the inheritable flag.
///
/// Valid wire values are `0..=255` (rights only) and
/// `536870912..=536871167` (rights with the inheritable flag). Nothing in
/// between is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct EffectiveRights {
    pub mask: RightsMask,
    pub inheritable: bool,
}

impl EffectiveRights {
    #[must_use]
    pub const fn new(mask: RightsMask) -> Self {
        Self {
            mask,
            inheritable: false,
        }
    }

    #[must_use]
    pub const fn inheritable(mask: RightsMask) -> Self {
        Self {
            mask,
            inheritable: true,
        }
    }

    /// Validate a raw rights value.
    ///
    /// # Examples
    ///
    /// ```
    /// use acl_common::{EffectiveRights, RightsMask};
    ///
    /// let rights = EffectiveRights::from_wire(0b1100_0101).unwrap();
    /// assert_eq!(rights.mask, RightsMask::VIEW);
    /// assert!(!rights.inheritable);
    ///
    /// let rights = EffectiveRights::from_wire(536_870_913).unwrap();
    /// assert_eq!(rights.mask, RightsMask::BROWSE);
    /// assert!(rights.inheritable);
    ///
    /// assert!(EffectiveRights::from_wire(256).is_err());
    /// ```
    pub fn from_wire(value: i64) -> Result<Self, ValidationError> {
        match value {
            0..=0xFF => Ok(Self::new(RightsMask::from_bits_retain(value as u8))),
            INHERITABLE_MIN..=INHERITABLE_MAX => Ok(Self::inheritable(
                RightsMask::from_bits_retain((value - INHERITABLE_MIN) as u8),
            )),
            _ => Err(ValidationError::RightsOutOfRange(value)),
        }
    }

    /// Combined value sent to the store.
    #[must_use]
    pub const fn to_wire(self) -> u32 {
        let bits = self.mask.bits() as u32;
        if self.inheritable {
            bits | INHERITABLE_FLAG
        } else {
            bits
        }
    }
}

impl From<RightsMask> for EffectiveRights {
    fn from(mask: RightsMask) -> Self {
        Self::new(mask)
    }
}

impl From<AggregatedRights> for EffectiveRights {
    fn from(value: AggregatedRights) -> Self {
        Self::new(value.mask())
    }
}

impl TryFrom<i64> for EffectiveRights {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_wire(value)
    }
}

impl From<EffectiveRights> for u32 {
    fn from(value: EffectiveRights) -> Self {
        value.to_wire()
    }
}
