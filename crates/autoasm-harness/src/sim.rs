#![forbid(unsafe_code)]

//! JSON-backed simulated grid.
//!
//! # File Format
//!
//! ```json
//! {
//!   "blocks": [
//!     { "name": "PB-Assembly", "kind": "controller" },
//!     { "name": "Screen-Assembly-0", "kind": "panel" },
//!     {
//!       "name": "Cargo",
//!       "kind": "container",
//!       "inventories": [[
//!         { "type_id": "MyObjectBuilder_Component", "subtype": "SteelPlate", "amount": 12000 }
//!       ]]
//!     },
//!     {
//!       "name": "AutoAssembler",
//!       "kind": "assembler",
//!       "producer": {
//!         "blueprints": ["MyObjectBuilder_BlueprintDefinition/SteelPlate"],
//!         "capacity": 8
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Block ids are positions in `blocks`. `grid` defaults to 1 and `running`
//! to `true`.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use autoasm_core::{
    Amount, BlockCaps, BlockId, BlockInfo, EnqueueError, GridId, InventoryRef, Platform, RawStack,
};
use serde::{Deserialize, Serialize};

/// Grid id used when none is given.
pub const DEFAULT_GRID: u32 = 1;

// ============================================================================
// Errors
// ============================================================================

/// Loading or saving a grid file failed.
#[derive(Debug)]
pub enum HarnessError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "grid file I/O error: {e}"),
            Self::Json(e) => write!(f, "invalid grid file: {e}"),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

// ============================================================================
// Model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Controller,
    Container,
    /// Assemblers also serve as disassemblers.
    Assembler,
    Panel,
}

impl BlockKind {
    #[must_use]
    pub fn caps(self) -> BlockCaps {
        match self {
            Self::Controller => BlockCaps::PROGRAMMABLE,
            Self::Container => BlockCaps::INVENTORY,
            Self::Assembler => BlockCaps::PRODUCER | BlockCaps::INVENTORY,
            Self::Panel => BlockCaps::TEXT_PANEL,
        }
    }

    /// Inventories a freshly added block of this kind has.
    fn default_inventories(self) -> usize {
        match self {
            Self::Container => 1,
            Self::Assembler => 2,
            Self::Controller | Self::Panel => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimStack {
    pub type_id: String,
    pub subtype: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedOrder {
    pub definition: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimProducer {
    /// Definitions this producer can build.
    #[serde(default)]
    pub blueprints: BTreeSet<String>,
    #[serde(default)]
    pub queue: Vec<QueuedOrder>,
    /// Maximum queued orders; unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimPanel {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default)]
    pub show_public: bool,
}

fn default_grid() -> u32 {
    DEFAULT_GRID
}

fn default_running() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimBlock {
    pub name: String,
    pub kind: BlockKind,
    #[serde(default = "default_grid")]
    pub grid: u32,
    /// Controllers only.
    #[serde(default = "default_running")]
    pub running: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inventories: Vec<Vec<SimStack>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<SimProducer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel: Option<SimPanel>,
}

impl SimBlock {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: BlockKind, grid: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            grid,
            running: true,
            inventories: vec![Vec::new(); kind.default_inventories()],
            producer: (kind == BlockKind::Assembler).then(SimProducer::default),
            panel: (kind == BlockKind::Panel).then(SimPanel::default),
        }
    }
}

/// Whole grid state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimGrid {
    #[serde(default)]
    pub blocks: Vec<SimBlock>,
}

// ============================================================================
// Loading & Saving
// ============================================================================

impl SimGrid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, HarnessError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, HarnessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        let grid = Self::from_json(&fs::read_to_string(path)?)?;
        tracing::debug!(path = %path.display(), blocks = grid.blocks.len(), "loaded grid");
        Ok(grid)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HarnessError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        tracing::debug!(path = %path.display(), blocks = self.blocks.len(), "saved grid");
        Ok(())
    }
}

// ============================================================================
// Building
// ============================================================================

/// Fluent editor for one block, returned by the `add_*` methods.
pub struct BlockBuilder<'a> {
    block: &'a mut SimBlock,
}

impl BlockBuilder<'_> {
    /// Add whole units of an item to the first inventory.
    pub fn stack(self, type_id: &str, subtype: &str, units: i64) -> Self {
        self.stack_amount(type_id, subtype, Amount::from_units(units))
    }

    pub fn stack_amount(self, type_id: &str, subtype: &str, amount: Amount) -> Self {
        if self.block.inventories.is_empty() {
            self.block.inventories.push(Vec::new());
        }
        self.block.inventories[0].push(SimStack {
            type_id: type_id.to_string(),
            subtype: subtype.to_string(),
            amount,
        });
        self
    }

    /// Accept `definition` as a buildable blueprint.
    pub fn blueprint(self, definition: &str) -> Self {
        self.block
            .producer
            .get_or_insert_with(SimProducer::default)
            .blueprints
            .insert(definition.to_string());
        self
    }

    /// Pre-fill the queue, making the producer busy.
    pub fn queued(self, definition: &str, units: i64) -> Self {
        self.block
            .producer
            .get_or_insert_with(SimProducer::default)
            .queue
            .push(QueuedOrder {
                definition: definition.to_string(),
                amount: Amount::from_units(units),
            });
        self
    }

    pub fn capacity(self, capacity: usize) -> Self {
        self.block
            .producer
            .get_or_insert_with(SimProducer::default)
            .capacity = Some(capacity);
        self
    }

    pub fn running(self, running: bool) -> Self {
        self.block.running = running;
        self
    }
}

impl SimGrid {
    fn push(&mut self, block: SimBlock) -> BlockBuilder<'_> {
        self.blocks.push(block);
        let last = self.blocks.len() - 1;
        BlockBuilder {
            block: &mut self.blocks[last],
        }
    }

    pub fn add_block(&mut self, name: &str, kind: BlockKind, grid: u32) -> BlockBuilder<'_> {
        self.push(SimBlock::new(name, kind, grid))
    }

    pub fn add_controller(&mut self, name: &str) -> BlockBuilder<'_> {
        self.add_block(name, BlockKind::Controller, DEFAULT_GRID)
    }

    pub fn add_panel(&mut self, name: &str) -> BlockBuilder<'_> {
        self.add_block(name, BlockKind::Panel, DEFAULT_GRID)
    }

    pub fn add_container(&mut self, name: &str) -> BlockBuilder<'_> {
        self.add_block(name, BlockKind::Container, DEFAULT_GRID)
    }

    /// Container on another grid, e.g. a docked ship.
    pub fn add_container_on(&mut self, name: &str, grid: u32) -> BlockBuilder<'_> {
        self.add_block(name, BlockKind::Container, grid)
    }

    pub fn add_assembler(&mut self, name: &str) -> BlockBuilder<'_> {
        self.add_block(name, BlockKind::Assembler, DEFAULT_GRID)
    }
}

// ============================================================================
// Inspection
// ============================================================================

impl SimGrid {
    #[must_use]
    pub fn block(&self, name: &str) -> Option<&SimBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }

    #[must_use]
    pub fn panel_text(&self, name: &str) -> Option<&str> {
        self.block(name)?.panel.as_ref().map(|p| p.text.as_str())
    }

    #[must_use]
    pub fn panel_font_size(&self, name: &str) -> Option<f32> {
        self.block(name)?.panel.as_ref()?.font_size
    }

    /// Queued orders of the named producer; empty when it has none.
    #[must_use]
    pub fn queue(&self, name: &str) -> Vec<(String, Amount)> {
        self.block(name)
            .and_then(|b| b.producer.as_ref())
            .map(|p| {
                p.queue
                    .iter()
                    .map(|o| (o.definition.clone(), o.amount))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn block_mut(&mut self, id: BlockId) -> Option<&mut SimBlock> {
        self.blocks.get_mut(id.0 as usize)
    }

    /// Panel state of a panel block, created on first use for files that omit it.
    fn panel_mut(&mut self, id: BlockId) -> Option<&mut SimPanel> {
        self.block_mut(id)
            .filter(|b| b.kind == BlockKind::Panel)
            .map(|b| b.panel.get_or_insert_with(SimPanel::default))
    }
}

// ============================================================================
// Platform
// ============================================================================

/// `Type/Subtype` with both halves non-empty.
fn is_definition(definition: &str) -> bool {
    definition
        .split_once('/')
        .is_some_and(|(ty, sub)| !ty.is_empty() && !sub.is_empty())
}

impl Platform for SimGrid {
    fn blocks(&self) -> Vec<BlockInfo> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, b)| BlockInfo {
                id: BlockId(i as u32),
                name: b.name.clone(),
                grid: GridId(b.grid),
                caps: b.kind.caps(),
                running: b.kind == BlockKind::Controller && b.running,
                inventory_count: b.inventories.len(),
            })
            .collect()
    }

    fn inventory(&self, inventory: InventoryRef) -> Option<Vec<RawStack>> {
        let stacks = self
            .blocks
            .get(inventory.block.0 as usize)?
            .inventories
            .get(inventory.index)?;
        Some(
            stacks
                .iter()
                .map(|s| RawStack::new(s.type_id.as_str(), s.subtype.as_str(), s.amount))
                .collect(),
        )
    }

    fn is_queue_empty(&self, producer: BlockId) -> bool {
        self.blocks
            .get(producer.0 as usize)
            .and_then(|b| b.producer.as_ref())
            .is_none_or(|p| p.queue.is_empty())
    }

    fn enqueue(
        &mut self,
        producer: BlockId,
        definition: &str,
        amount: Amount,
    ) -> Result<(), EnqueueError> {
        let queue = self
            .block_mut(producer)
            .and_then(|b| b.producer.as_mut())
            .ok_or(EnqueueError::NotAProducer(producer))?;
        if !is_definition(definition) {
            return Err(EnqueueError::MalformedDefinition(definition.to_string()));
        }
        if !queue.blueprints.contains(definition) {
            return Err(EnqueueError::UnknownDefinition(definition.to_string()));
        }
        if let Some(capacity) = queue.capacity {
            if queue.queue.len() >= capacity {
                return Err(EnqueueError::QueueFull { capacity });
            }
        }
        queue.queue.push(QueuedOrder {
            definition: definition.to_string(),
            amount,
        });
        Ok(())
    }

    fn prepare_panel(&mut self, panel: BlockId, font_size: f32) {
        if let Some(p) = self.panel_mut(panel) {
            p.show_public = true;
            p.font_size = Some(font_size);
        }
    }

    fn write_panel(&mut self, panel: BlockId, text: &str) {
        if let Some(p) = self.panel_mut(panel) {
            p.text = text.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steel() -> SimGrid {
        let mut grid = SimGrid::new();
        grid.add_controller("PB-Assembly");
        grid.add_assembler("AutoAssembler")
            .blueprint("MyObjectBuilder_BlueprintDefinition/SteelPlate")
            .capacity(1);
        grid.add_container("Cargo")
            .stack("MyObjectBuilder_Component", "SteelPlate", 12);
        grid
    }

    #[test]
    fn blocks_expose_kind_capabilities() {
        let grid = steel();
        let blocks = grid.blocks();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].running);
        assert_eq!(blocks[1].caps, BlockCaps::PRODUCER | BlockCaps::INVENTORY);
        assert_eq!(blocks[1].inventory_count, 2);
        assert!(!blocks[1].running);
        assert_eq!(blocks[2].inventory_count, 1);
    }

    #[test]
    fn inventory_reads_stacks() {
        let grid = steel();
        let stacks = grid
            .inventory(InventoryRef {
                block: BlockId(2),
                index: 0,
            })
            .unwrap();
        assert_eq!(
            stacks,
            vec![RawStack::new("MyObjectBuilder_Component", "SteelPlate", Amount::from_units(12))]
        );
        assert!(grid.inventory(InventoryRef { block: BlockId(2), index: 1 }).is_none());
        assert!(grid.inventory(InventoryRef { block: BlockId(9), index: 0 }).is_none());
    }

    #[test]
    fn enqueue_validates_definitions() {
        let mut grid = steel();
        let assembler = BlockId(1);
        assert_eq!(
            grid.enqueue(assembler, "SteelPlate", Amount::ONE),
            Err(EnqueueError::MalformedDefinition("SteelPlate".into()))
        );
        assert_eq!(
            grid.enqueue(assembler, "MyObjectBuilder_BlueprintDefinition/Motor", Amount::ONE),
            Err(EnqueueError::UnknownDefinition(
                "MyObjectBuilder_BlueprintDefinition/Motor".into()
            ))
        );
        assert_eq!(
            grid.enqueue(BlockId(2), "MyObjectBuilder_BlueprintDefinition/SteelPlate", Amount::ONE),
            Err(EnqueueError::NotAProducer(BlockId(2)))
        );
        assert!(grid.is_queue_empty(assembler));
    }

    #[test]
    fn enqueue_respects_capacity() {
        let mut grid = steel();
        let assembler = BlockId(1);
        let def = "MyObjectBuilder_BlueprintDefinition/SteelPlate";
        assert_eq!(grid.enqueue(assembler, def, Amount::from_units(18)), Ok(()));
        assert!(!grid.is_queue_empty(assembler));
        assert_eq!(
            grid.enqueue(assembler, def, Amount::ONE),
            Err(EnqueueError::QueueFull { capacity: 1 })
        );
        assert_eq!(grid.queue("AutoAssembler"), vec![(def.to_string(), Amount::from_units(18))]);
    }

    #[test]
    fn panels_record_font_and_text() {
        let mut grid = SimGrid::new();
        grid.add_panel("Screen-Assembly-0");
        grid.prepare_panel(BlockId(0), 0.928);
        grid.write_panel(BlockId(0), " Done \n");
        assert_eq!(grid.panel_font_size("Screen-Assembly-0"), Some(0.928));
        assert_eq!(grid.panel_text("Screen-Assembly-0"), Some(" Done \n"));
        assert!(grid.block("Screen-Assembly-0").unwrap().panel.as_ref().unwrap().show_public);
    }

    #[test]
    fn json_defaults_fill_missing_fields() {
        let grid = SimGrid::from_json(
            r#"{"blocks":[
                {"name":"PB-Assembly","kind":"controller"},
                {"name":"Cargo","kind":"container","grid":2,
                 "inventories":[[{"type_id":"MyObjectBuilder_Ore","subtype":"Ice","amount":"2.5"}]]}
            ]}"#,
        )
        .unwrap();
        let blocks = grid.blocks();
        assert!(blocks[0].running);
        assert_eq!(blocks[0].grid, GridId(DEFAULT_GRID));
        assert_eq!(blocks[1].grid, GridId(2));
        assert_eq!(
            grid.blocks[1].inventories[0][0].amount,
            "2.5".parse::<Amount>().unwrap()
        );
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.json");
        let grid = steel();
        grid.save(&path).unwrap();
        assert_eq!(SimGrid::load(&path).unwrap(), grid);
    }

    #[test]
    fn load_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(SimGrid::load(&path), Err(HarnessError::Json(_))));
        assert!(matches!(
            SimGrid::load(dir.path().join("missing.json")),
            Err(HarnessError::Io(_))
        ));
    }
}
