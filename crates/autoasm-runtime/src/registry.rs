#![forbid(unsafe_code)]

//! Name-keyed block registry scanned once per invocation.

use autoasm_core::{
    BlockCaps, BlockHandle, BlockId, BlockInfo, InventoryRef, LookupError, Platform,
    TerminalHandle,
};

/// Which blocks a lookup or scan considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridFilter {
    /// Every reachable block, including docked or connected grids.
    #[default]
    None,
    /// Only blocks on the same grid as the running controller.
    Current,
}

/// Snapshot of the block list plus the running controller.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    blocks: Vec<BlockInfo>,
    controller: Option<usize>,
}

impl BlockRegistry {
    /// Scan the platform's block list.
    pub fn scan<P: Platform + ?Sized>(platform: &P) -> Self {
        Self::from_blocks(platform.blocks())
    }

    /// The first programmable block that is currently running is the controller.
    #[must_use]
    pub fn from_blocks(blocks: Vec<BlockInfo>) -> Self {
        let controller = blocks
            .iter()
            .position(|b| b.caps.contains(BlockCaps::PROGRAMMABLE) && b.running);
        tracing::debug!(
            blocks = blocks.len(),
            controller = controller.map(|i| blocks[i].name.as_str()),
            "scanned block registry"
        );
        Self { blocks, controller }
    }

    #[must_use]
    pub fn controller(&self) -> Option<&BlockInfo> {
        self.controller.map(|i| &self.blocks[i])
    }

    #[must_use]
    pub fn blocks(&self) -> &[BlockInfo] {
        &self.blocks
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BlockInfo> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Whether `block` passes `filter`.
    ///
    /// `Current` rejects everything when no controller is running.
    #[must_use]
    pub fn passes(&self, filter: GridFilter, block: &BlockInfo) -> bool {
        match filter {
            GridFilter::None => true,
            GridFilter::Current => self.controller().is_some_and(|c| c.grid == block.grid),
        }
    }

    /// Blocks passing `filter`, in scan order.
    pub fn iter(&self, filter: GridFilter) -> impl Iterator<Item = &BlockInfo> {
        self.blocks.iter().filter(move |b| self.passes(filter, b))
    }

    /// Strict lookup: the first block named `name` passing `filter`.
    pub fn find<H: BlockHandle>(&self, name: &str, filter: GridFilter) -> Result<H, LookupError> {
        let block = self
            .iter(filter)
            .find(|b| b.name == name)
            .ok_or_else(|| LookupError::NotFound {
                name: name.to_string(),
            })?;
        if block.caps.contains(H::REQUIRED) {
            Ok(H::from_block(block))
        } else {
            Err(LookupError::WrongKind {
                name: name.to_string(),
                expected: H::KIND,
            })
        }
    }

    /// Lenient lookup: `None` when missing or of the wrong kind.
    #[must_use]
    pub fn find_if_exists<H: BlockHandle>(&self, name: &str, filter: GridFilter) -> Option<H> {
        self.find(name, filter).ok()
    }

    /// Every inventory of every block passing `filter`.
    #[must_use]
    pub fn inventories(&self, filter: GridFilter) -> Vec<InventoryRef> {
        self.iter(filter)
            .flat_map(|b| {
                (0..b.inventory_count).map(move |index| InventoryRef { block: b.id, index })
            })
            .collect()
    }

    /// First inventory of the block named `name`.
    pub fn find_inventory(
        &self,
        name: &str,
        filter: GridFilter,
    ) -> Result<InventoryRef, LookupError> {
        let handle: TerminalHandle = self.find(name, filter)?;
        match self.block(handle.id()) {
            Some(block) if block.inventory_count > 0 => Ok(InventoryRef {
                block: block.id,
                index: 0,
            }),
            _ => Err(LookupError::NoInventory {
                name: name.to_string(),
            }),
        }
    }
}
