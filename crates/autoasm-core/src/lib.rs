#![forbid(unsafe_code)]

//! Core types for the assembly controller.
//!
//! - [`ItemId`] - canonical `Category/Subtype` item identity
//! - [`Amount`] - fixed-point quantity matching the platform's representation
//! - [`Platform`] - the contract every grid backend implements
//! - [`BlockHandle`] - typed handles returned by name lookups
//!
//! # Example
//! ```
//! use autoasm_core::{Amount, ItemId};
//!
//! let id = ItemId::normalize("MyObjectBuilder_Component", "SteelPlate");
//! assert_eq!(id.as_str(), "Component/SteelPlate");
//!
//! let total = Amount::from_units(12) + "0.5".parse::<Amount>().unwrap();
//! assert_eq!(total.to_string(), "12.5");
//! ```

pub mod amount;
pub mod handle;
pub mod item;
pub mod platform;

pub use amount::{Amount, AmountParseError};
pub use handle::{
    BlockHandle, ControllerHandle, LookupError, PanelHandle, ProducerHandle, StorageHandle,
    TerminalHandle,
};
pub use item::{
    BLUEPRINT_NAMESPACE, BlueprintCandidates, ItemId, ItemIdError, OBJECT_BUILDER_PREFIX,
};
pub use platform::{
    BlockCaps, BlockId, BlockInfo, EnqueueError, GridId, InventoryRef, Platform, RawStack,
};
