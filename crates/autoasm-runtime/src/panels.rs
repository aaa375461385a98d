#![forbid(unsafe_code)]

//! Locating the text panels that make up the virtual display.

use autoasm_core::{BlockInfo, PanelHandle};
use autoasm_text::VirtualDisplay;

use crate::registry::{BlockRegistry, GridFilter};

/// Panels found for one controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelSet {
    /// Name prefix searched for, reported when nothing is found.
    pub prefix: String,
    /// Panels in display order.
    pub panels: Vec<PanelHandle>,
    pub wide: bool,
    pub raw: bool,
}

impl PanelSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Virtual display spanning these panels.
    #[must_use]
    pub fn display(&self) -> VirtualDisplay {
        VirtualDisplay::for_panels(self.panels.len(), self.wide, self.raw)
    }
}

/// Strategy for finding a controller's panels.
pub trait PanelLocator {
    fn locate(&self, registry: &BlockRegistry, controller: &BlockInfo) -> PanelSet;
}

/// `PB-{Name}` drives `Screen-{Name}-0`, `Screen-{Name}-1`, ...
///
/// Each index may carry a `w` suffix (wide panels) or an `r` suffix (raw
/// passthrough). Discovery stops at the first missing index. Only panels on
/// the controller's grid are considered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingConvention;

impl NamingConvention {
    /// Characters dropped from the controller name (`PB-`).
    pub const CONTROLLER_PREFIX_LEN: usize = 3;

    /// `Screen-` followed by the controller name minus its prefix.
    #[must_use]
    pub fn base_name(controller: &str) -> String {
        let name: String = controller.chars().skip(Self::CONTROLLER_PREFIX_LEN).collect();
        format!("Screen-{name}")
    }
}

impl PanelLocator for NamingConvention {
    fn locate(&self, registry: &BlockRegistry, controller: &BlockInfo) -> PanelSet {
        let mut set = PanelSet {
            prefix: Self::base_name(&controller.name),
            ..PanelSet::default()
        };
        let find =
            |name: String| registry.find_if_exists::<PanelHandle>(&name, GridFilter::Current);
        for i in 0.. {
            let base = &set.prefix;
            if let Some(panel) = find(format!("{base}-{i}")) {
                set.panels.push(panel);
            } else if let Some(panel) = find(format!("{base}-{i}w")) {
                set.panels.push(panel);
                set.wide = true;
            } else if let Some(panel) = find(format!("{base}-{i}r")) {
                set.panels.push(panel);
                set.raw = true;
            } else {
                break;
            }
        }
        tracing::debug!(
            prefix = %set.prefix,
            panels = set.panels.len(),
            wide = set.wide,
            raw = set.raw,
            "located panels"
        );
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoasm_core::{BlockCaps, BlockHandle, BlockId, GridId};
    use autoasm_text::RenderMode;

    fn block(id: u32, name: &str, grid: u32, caps: BlockCaps) -> BlockInfo {
        BlockInfo {
            id: BlockId(id),
            name: name.to_string(),
            grid: GridId(grid),
            caps,
            running: caps.contains(BlockCaps::PROGRAMMABLE),
            inventory_count: 0,
        }
    }

    fn locate(panels: &[(u32, &str, u32)]) -> PanelSet {
        let mut blocks = vec![block(0, "PB-Assembly", 1, BlockCaps::PROGRAMMABLE)];
        blocks.extend(
            panels
                .iter()
                .map(|&(id, name, grid)| block(id, name, grid, BlockCaps::TEXT_PANEL)),
        );
        let registry = BlockRegistry::from_blocks(blocks);
        let controller = registry.controller().cloned().unwrap();
        NamingConvention.locate(&registry, &controller)
    }

    fn ids(set: &PanelSet) -> Vec<u32> {
        set.panels.iter().map(|p| p.id().0).collect()
    }

    #[test]
    fn base_name_drops_controller_prefix() {
        assert_eq!(NamingConvention::base_name("PB-Assembly"), "Screen-Assembly");
        assert_eq!(NamingConvention::base_name("PB"), "Screen-");
    }

    #[test]
    fn panels_are_found_in_index_order() {
        let set = locate(&[
            (2, "Screen-Assembly-1", 1),
            (1, "Screen-Assembly-0", 1),
        ]);
        assert_eq!(set.prefix, "Screen-Assembly");
        assert_eq!(ids(&set), [1, 2]);
        assert!(!set.wide);
        assert!(!set.raw);
    }

    #[test]
    fn wide_suffix_widens_every_panel() {
        let set = locate(&[(1, "Screen-Assembly-0w", 1), (2, "Screen-Assembly-1", 1)]);
        assert_eq!(ids(&set), [1, 2]);
        assert!(set.wide);
        assert_eq!(set.display().columns(), 55);
        assert_eq!(set.display().rows(), 38);
    }

    #[test]
    fn raw_suffix_selects_raw_mode() {
        let set = locate(&[(1, "Screen-Assembly-0r", 1)]);
        assert!(set.raw);
        assert_eq!(set.display().mode(), RenderMode::Raw);
    }

    #[test]
    fn discovery_stops_at_first_gap() {
        let set = locate(&[(1, "Screen-Assembly-0", 1), (3, "Screen-Assembly-2", 1)]);
        assert_eq!(ids(&set), [1]);
    }

    #[test]
    fn panels_on_other_grids_are_ignored() {
        let set = locate(&[(1, "Screen-Assembly-0", 2)]);
        assert!(set.is_empty());
    }
}
