//! Representable domain items.
//!
//! Items are owned by the surrounding domain model; the registry and pools
//! hold shared references, never exclusive ownership.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Stable identity of a representable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of a representable item.
///
/// The registry partitions its members by kind and pools attend to exactly
/// one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Base item: a raw image stack.
    Stack,
    /// Derived item: a segmentation extracted from a stack.
    Segmentation,
}

impl ItemKind {
    /// Base items exist independently of any other item.
    pub fn is_base(&self) -> bool {
        matches!(self, Self::Stack)
    }

    /// Derived items are computed from base items.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::Segmentation)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stack => write!(f, "stack"),
            Self::Segmentation => write!(f, "segmentation"),
        }
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stack" => Ok(Self::Stack),
            "segmentation" => Ok(Self::Segmentation),
            _ => Err(format!("Invalid item kind: {s}")),
        }
    }
}

/// A representable domain item.
///
/// Equality is by identity, not by name: two items with the same name are
/// still distinct members of the registry.
#[derive(Debug, Serialize, Deserialize)]
pub struct ViewItem {
    id: ItemId,
    kind: ItemKind,
    name: String,
}

/// Items are shared between the domain model, the registry and pools.
pub type ViewItemRef = Arc<ViewItem>;

impl ViewItem {
    pub fn new(kind: ItemKind, name: impl Into<String>) -> ViewItemRef {
        Arc::new(Self {
            id: ItemId::new(),
            kind,
            name: name.into(),
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for ViewItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ViewItem {}
