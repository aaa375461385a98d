#![forbid(unsafe_code)]

//! The contract between the controller and the grid it runs on.
//!
//! Everything the controller knows about the world comes through
//! [`Platform`]: the list of blocks, the contents of their inventories,
//! producer queues, and text panels. Backends decide how blocks are stored;
//! the controller only holds opaque [`BlockId`]s between calls.

use std::fmt;

use bitflags::bitflags;

use crate::amount::Amount;

/// Opaque block identifier assigned by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

/// Opaque identifier of a physical structure (grid) blocks belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridId(pub u32);

bitflags! {
    /// What a block can be used as.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BlockCaps: u8 {
        /// Has one or more item inventories.
        const INVENTORY = 0b0001;
        /// Accepts production/removal work orders.
        const PRODUCER = 0b0010;
        /// Character display surface.
        const TEXT_PANEL = 0b0100;
        /// Can run a controller program.
        const PROGRAMMABLE = 0b1000;
    }
}

/// Static description of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    pub id: BlockId,
    /// Player-assigned name; lookups match it exactly.
    pub name: String,
    pub grid: GridId,
    pub caps: BlockCaps,
    /// Only meaningful for programmable blocks: whether it is currently executing.
    pub running: bool,
    /// Number of inventories the block exposes.
    pub inventory_count: usize,
}

/// One inventory of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InventoryRef {
    pub block: BlockId,
    pub index: usize,
}

/// A raw stored stack as the platform reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStack {
    /// Object-builder type id, e.g. `MyObjectBuilder_Component`.
    pub type_id: String,
    /// Subtype name, e.g. `SteelPlate`.
    pub subtype: String,
    pub amount: Amount,
}

impl RawStack {
    #[must_use]
    pub fn new(type_id: impl Into<String>, subtype: impl Into<String>, amount: Amount) -> Self {
        Self {
            type_id: type_id.into(),
            subtype: subtype.into(),
            amount,
        }
    }
}

/// Reasons a producer refuses a work order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueError {
    /// The definition string does not parse as `Type/Subtype`.
    MalformedDefinition(String),
    /// The producer has no blueprint with this definition.
    UnknownDefinition(String),
    /// The producer's queue is at capacity.
    QueueFull { capacity: usize },
    /// The target block does not accept work orders.
    NotAProducer(BlockId),
}

impl fmt::Display for EnqueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDefinition(d) => write!(f, "malformed definition \"{d}\""),
            Self::UnknownDefinition(d) => write!(f, "unknown definition \"{d}\""),
            Self::QueueFull { capacity } => write!(f, "queue full ({capacity} orders)"),
            Self::NotAProducer(id) => write!(f, "block {} is not a producer", id.0),
        }
    }
}

impl std::error::Error for EnqueueError {}

/// Grid backend.
///
/// Implementations are driven from a single thread for the duration of one
/// invocation. Panel writes are assumed to succeed.
pub trait Platform {
    /// Every block reachable from the controller, in a stable order.
    fn blocks(&self) -> Vec<BlockInfo>;

    /// Contents of one inventory; `None` if the block has no such inventory.
    fn inventory(&self, inventory: InventoryRef) -> Option<Vec<RawStack>>;

    /// Whether a producer has no outstanding work.
    fn is_queue_empty(&self, producer: BlockId) -> bool;

    /// Queue `amount` units of `definition` at `producer`.
    fn enqueue(
        &mut self,
        producer: BlockId,
        definition: &str,
        amount: Amount,
    ) -> Result<(), EnqueueError>;

    /// Switch a panel to public-text display at the given font size.
    fn prepare_panel(&mut self, panel: BlockId, font_size: f32);

    /// Replace a panel's public text.
    fn write_panel(&mut self, panel: BlockId, text: &str);
}

impl<P: Platform + ?Sized> Platform for &mut P {
    fn blocks(&self) -> Vec<BlockInfo> {
        (**self).blocks()
    }

    fn inventory(&self, inventory: InventoryRef) -> Option<Vec<RawStack>> {
        (**self).inventory(inventory)
    }

    fn is_queue_empty(&self, producer: BlockId) -> bool {
        (**self).is_queue_empty(producer)
    }

    fn enqueue(
        &mut self,
        producer: BlockId,
        definition: &str,
        amount: Amount,
    ) -> Result<(), EnqueueError> {
        (**self).enqueue(producer, definition, amount)
    }

    fn prepare_panel(&mut self, panel: BlockId, font_size: f32) {
        (**self).prepare_panel(panel, font_size);
    }

    fn write_panel(&mut self, panel: BlockId, text: &str) {
        (**self).write_panel(panel, text);
    }
}
