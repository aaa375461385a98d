#![forbid(unsafe_code)]

//! Typed block handles.
//!
//! A name lookup yields a handle whose type states which capability the
//! block was checked for. Holding a [`ProducerHandle`] means the block was a
//! producer when the registry was scanned.

use std::fmt;

use crate::platform::{BlockCaps, BlockId, BlockInfo};

/// A block reference narrowed to one capability.
pub trait BlockHandle: Copy + fmt::Debug {
    /// Capabilities the block must have.
    const REQUIRED: BlockCaps;

    /// Human-readable kind used in lookup errors.
    const KIND: &'static str;

    /// Wrap a block already checked against [`Self::REQUIRED`].
    fn from_block(block: &BlockInfo) -> Self;

    fn id(&self) -> BlockId;
}

macro_rules! block_handle {
    ($(#[$meta:meta])* $name:ident, $caps:expr, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(BlockId);

        impl BlockHandle for $name {
            const REQUIRED: BlockCaps = $caps;
            const KIND: &'static str = $kind;

            fn from_block(block: &BlockInfo) -> Self {
                Self(block.id)
            }

            fn id(&self) -> BlockId {
                self.0
            }
        }
    };
}

block_handle!(
    /// Any terminal block.
    TerminalHandle,
    BlockCaps::empty(),
    "terminal block"
);
block_handle!(
    /// Block with at least one inventory.
    StorageHandle,
    BlockCaps::INVENTORY,
    "storage block"
);
block_handle!(
    /// Assembler-like block accepting work orders.
    ProducerHandle,
    BlockCaps::PRODUCER,
    "production block"
);
block_handle!(
    /// Text panel.
    PanelHandle,
    BlockCaps::TEXT_PANEL,
    "text panel"
);
block_handle!(
    /// Programmable block.
    ControllerHandle,
    BlockCaps::PROGRAMMABLE,
    "programmable block"
);

/// Failed name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No block with this name passes the filter.
    NotFound { name: String },
    /// The block exists but lacks the requested capability.
    WrongKind { name: String, expected: &'static str },
    /// The block exists but exposes no inventory.
    NoInventory { name: String },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { name } => write!(f, "failed to find block \"{name}\""),
            Self::WrongKind { name, expected } => {
                write!(f, "block \"{name}\" is not a {expected}")
            }
            Self::NoInventory { name } => write!(f, "no inventory in block \"{name}\""),
        }
    }
}

impl std::error::Error for LookupError {}
