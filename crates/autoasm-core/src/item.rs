#![forbid(unsafe_code)]

//! Canonical item identities.
//!
//! The platform describes a stored stack by an object-builder type id
//! (`MyObjectBuilder_Component`) and a subtype (`SteelPlate`). Inventory
//! accounting keys everything by the shorter `Component/SteelPlate` form.
//!
//! The reverse direction, from an inventory id to a production blueprint,
//! has no exact mapping: blueprint names mostly mirror the item subtype, but
//! some carry a `Component` suffix and hand tools drop their `Item` suffix.
//! [`ItemId::blueprint_candidates`] produces the two names worth probing.

use std::fmt;
use std::str::FromStr;

/// Prefix the platform puts in front of every object-builder type id.
pub const OBJECT_BUILDER_PREFIX: &str = "MyObjectBuilder_";

/// Namespace of production blueprint definitions.
pub const BLUEPRINT_NAMESPACE: &str = "MyObjectBuilder_BlueprintDefinition/";

const ITEM_SUFFIX: &str = "Item";
const COMPONENT_SUFFIX: &str = "Component";

/// Canonical `Category/Subtype` identifier.
///
/// Compared by exact string equality. Parsed ids are validated; ids built
/// with [`ItemId::normalize`] trust the platform's descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId {
    repr: String,
    split: usize,
}

impl ItemId {
    /// Build a canonical id from a raw platform descriptor.
    ///
    /// Strips [`OBJECT_BUILDER_PREFIX`] from the category if present. Total:
    /// unknown categories pass through unchanged.
    #[must_use]
    pub fn normalize(raw_category: &str, raw_subtype: &str) -> Self {
        let category = raw_category
            .strip_prefix(OBJECT_BUILDER_PREFIX)
            .unwrap_or(raw_category);
        Self::join(category, raw_subtype)
    }

    /// Build an id from an already-normalized category and subtype.
    pub fn new(category: &str, subtype: &str) -> Result<Self, ItemIdError> {
        Self::join(category, subtype).validated()
    }

    fn join(category: &str, subtype: &str) -> Self {
        let mut repr = String::with_capacity(category.len() + 1 + subtype.len());
        repr.push_str(category);
        repr.push('/');
        repr.push_str(subtype);
        Self {
            repr,
            split: category.len(),
        }
    }

    fn validated(self) -> Result<Self, ItemIdError> {
        if !self.repr.is_ascii() {
            return Err(ItemIdError::NonAscii(self.repr));
        }
        if self.category().is_empty() || self.category().contains('/') {
            return Err(ItemIdError::EmptyCategory(self.repr));
        }
        if self.subtype().is_empty() {
            return Err(ItemIdError::EmptySubtype(self.repr));
        }
        Ok(self)
    }

    /// Full `Category/Subtype` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.repr
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.repr[..self.split]
    }

    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.repr[self.split + 1..]
    }

    /// Blueprint definitions to try, in order, when queueing this item.
    #[must_use]
    pub fn blueprint_candidates(&self) -> BlueprintCandidates {
        let mut primary = format!("{BLUEPRINT_NAMESPACE}{}", self.subtype());
        if primary.ends_with(ITEM_SUFFIX) {
            primary.truncate(primary.len() - ITEM_SUFFIX.len());
        }
        let fallback = format!("{primary}{COMPONENT_SUFFIX}");
        BlueprintCandidates { primary, fallback }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.repr)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.repr
    }
}

impl FromStr for ItemId {
    type Err = ItemIdError;

    /// Parse `Category/Subtype`. The subtype is everything after the first `/`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((category, subtype)) => Self::new(category, subtype),
            None => Err(ItemIdError::MissingSeparator(s.to_string())),
        }
    }
}

/// Ordered pair of blueprint definitions for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueprintCandidates {
    /// Subtype-mirroring name; correct for most items.
    pub primary: String,
    /// `primary` with a `Component` suffix.
    pub fallback: String,
}

impl BlueprintCandidates {
    /// Candidates in probe order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [self.primary.as_str(), self.fallback.as_str()].into_iter()
    }
}

/// Malformed canonical id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemIdError {
    /// No `/` between category and subtype.
    MissingSeparator(String),
    /// Category segment is empty.
    EmptyCategory(String),
    /// Subtype segment is empty.
    EmptySubtype(String),
    /// Identifier contains non-ASCII characters.
    NonAscii(String),
}

impl fmt::Display for ItemIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator(s) => write!(f, "item id \"{s}\" is missing a '/' separator"),
            Self::EmptyCategory(s) => write!(f, "item id \"{s}\" has an empty category"),
            Self::EmptySubtype(s) => write!(f, "item id \"{s}\" has an empty subtype"),
            Self::NonAscii(s) => write!(f, "item id \"{s}\" is not ASCII"),
        }
    }
}

impl std::error::Error for ItemIdError {}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::ItemId;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for ItemId {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.as_str())
        }
    }

    impl<'de> Deserialize<'de> for ItemId {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = String::deserialize(deserializer)?;
            raw.parse().map_err(serde::de::Error::custom)
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalize_twice_is_noop(
            category in "[A-Z][a-z]{0,15}",
            subtype in "[A-Za-z0-9_]{1,20}",
        ) {
            let raw = format!("{OBJECT_BUILDER_PREFIX}{category}");
            let once = ItemId::normalize(&raw, &subtype);
            let twice = ItemId::normalize(once.category(), once.subtype());
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once.as_str().parse::<ItemId>(), Ok(once.clone()));
        }
    }
}
