#![forbid(unsafe_code)]

//! Test harness for the assembly controller.
//!
//! - [`sim`] - a JSON-backed [`Platform`](autoasm_core::Platform) with
//!   blocks, inventories, producer queues, and panels
//! - [`snapshot`] - golden-file assertions for panel transcripts
//!
//! # Quick Start
//!
//! ```
//! use autoasm_core::Platform;
//! use autoasm_harness::SimGrid;
//!
//! let mut grid = SimGrid::new();
//! grid.add_controller("PB-Assembly");
//! grid.add_panel("Screen-Assembly-0");
//! grid.add_container("Cargo")
//!     .stack("MyObjectBuilder_Component", "SteelPlate", 12000);
//!
//! assert_eq!(grid.blocks().len(), 3);
//! ```

pub mod sim;
pub mod snapshot;

pub use sim::{
    BlockBuilder, BlockKind, DEFAULT_GRID, HarnessError, QueuedOrder, SimBlock, SimGrid, SimPanel,
    SimProducer, SimStack,
};
pub use snapshot::{MatchMode, assert_text_snapshot, diff_text};
