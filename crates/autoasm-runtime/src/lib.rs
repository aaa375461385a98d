#![forbid(unsafe_code)]

//! Per-invocation runtime for the assembly controller.
//!
//! One invocation opens a [`Session`], runs a program body against it, and
//! flushes the buffered output to the discovered panels:
//!
//! ```text
//! discover panels → aggregate inventories → reconcile goals → submit orders → render
//! ```
//!
//! # Modules
//!
//! - [`session`] - request-scoped registry, buffer, memoized counts, flush
//! - [`registry`] - name lookups returning typed handles
//! - [`inventory`] - grid-wide item totals
//! - [`reconcile`] - goal reconciliation and surplus removal
//! - [`submit`] - work orders with blueprint fallback
//! - [`panels`] - panel discovery by naming convention
//! - [`counter`] - launch counter persistence
//! - [`run`] - invocation boundary and error types

pub mod counter;
pub mod inventory;
pub mod output;
pub mod panels;
pub mod reconcile;
pub mod registry;
pub mod run;
pub mod session;
pub mod submit;

pub use counter::{
    CounterStore, MemoryCounter, SPINNER, StorageError, StorageResult, next_launch, spinner_glyph,
};
#[cfg(feature = "state-persistence")]
pub use counter::FileCounter;
pub use inventory::{InventoryCache, InventorySnapshot, aggregate};
pub use output::OutputBuffer;
pub use panels::{NamingConvention, PanelLocator, PanelSet};
pub use reconcile::{GoalLine, GoalTable, Outcome, RemovalLine, Sign, reconcile, sweep_surplus};
pub use registry::{BlockRegistry, GridFilter};
pub use run::{Fatal, ProgramError, Transcript, run_invocation};
pub use session::Session;
pub use submit::{RejectedOrder, Submitter, WorkOrders};
