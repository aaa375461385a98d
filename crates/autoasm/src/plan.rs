#![forbid(unsafe_code)]

//! Stock plan: which producers to drive and what to keep in stock.
//!
//! # File Format
//!
//! ```json
//! {
//!   "assembler": "AutoAssembler",
//!   "disassembler": "AutoDisassembler",
//!   "goals": { "Component/SteelPlate": 30000, "Component/Motor": 1000 },
//!   "removals": ["PhysicalGunObject/WelderItem"],
//!   "retained": 1
//! }
//! ```
//!
//! Missing fields take their [`Plan::default`] values. Goals keep file order.

use std::fmt;
use std::fs;
use std::path::Path;

use autoasm_core::{Amount, ItemId};
use autoasm_harness::HarnessError;
use autoasm_runtime::{GoalTable, StorageError};
use serde::{Deserialize, Serialize};

// ============================================================================
// Errors
// ============================================================================

/// Startup configuration could not be loaded.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Grid(HarnessError),
    Counter(StorageError),
    /// Parsed but unusable.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read plan: {e}"),
            Self::Json(e) => write!(f, "invalid plan: {e}"),
            Self::Grid(e) => write!(f, "{e}"),
            Self::Counter(e) => write!(f, "launch counter: {e}"),
            Self::Invalid(msg) => write!(f, "invalid plan: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Grid(e) => Some(e),
            Self::Counter(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<HarnessError> for ConfigError {
    fn from(e: HarnessError) -> Self {
        Self::Grid(e)
    }
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        Self::Counter(e)
    }
}

// ============================================================================
// Plan
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    /// Producer that builds goal deficits.
    pub assembler: String,
    /// Producer that breaks down surplus removal items.
    pub disassembler: String,
    pub goals: GoalTable,
    /// Items kept at `retained` units; anything above is disassembled.
    pub removals: Vec<ItemId>,
    pub retained: Amount,
}

const DEFAULT_GOALS: &[(&str, u64)] = &[
    ("SteelPlate", 30000),
    ("InteriorPlate", 1000),
    ("Construction", 5000),
    ("Motor", 1000),
    ("Computer", 1000),
    ("MetalGrid", 100),
    ("SmallTube", 3000),
    ("LargeTube", 2000),
    ("Display", 1000),
    ("PowerCell", 100),
    ("Girder", 100),
    ("BulletproofGlass", 100),
    ("Reactor", 100),
    ("Thrust", 1000),
    ("GravityGenerator", 100),
    ("Medical", 10),
    ("RadioCommunication", 10),
    ("Detector", 100),
    ("Explosives", 100),
    ("SolarCell", 100),
    ("Superconductor", 100),
];

const DEFAULT_REMOVALS: &[&str] = &[
    "AutomaticRifleItem",
    "AngleGrinderItem",
    "HandDrillItem",
    "WelderItem",
];

impl Default for Plan {
    fn default() -> Self {
        Self {
            assembler: "AutoAssembler".into(),
            disassembler: "AutoDisassembler".into(),
            goals: DEFAULT_GOALS
                .iter()
                .map(|&(subtype, target)| (ItemId::normalize("Component", subtype), target))
                .collect(),
            removals: DEFAULT_REMOVALS
                .iter()
                .map(|subtype| ItemId::normalize("PhysicalGunObject", subtype))
                .collect(),
            retained: Amount::ONE,
        }
    }
}

impl Plan {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let plan: Self = serde_json::from_str(json)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let plan = Self::from_json(&fs::read_to_string(path)?)?;
        tracing::debug!(
            path = %path.display(),
            goals = plan.goals.len(),
            removals = plan.removals.len(),
            "loaded plan"
        );
        Ok(plan)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assembler.is_empty() {
            return Err(ConfigError::Invalid("assembler name is empty".into()));
        }
        if self.disassembler.is_empty() {
            return Err(ConfigError::Invalid("disassembler name is empty".into()));
        }
        if self.retained < Amount::ZERO {
            return Err(ConfigError::Invalid(format!(
                "retained must not be negative, got {}",
                self.retained
            )));
        }
        Ok(())
    }
}
