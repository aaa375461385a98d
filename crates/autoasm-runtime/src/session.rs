#![forbid(unsafe_code)]

//! Request-scoped state for one invocation.
//!
//! A [`Session`] owns the output buffer, the block registry, the discovered
//! panels, and the memoized inventory snapshot. It finalizes exactly once:
//! through [`Session::finish`], or from `Drop` when a program exits early.

use std::fmt;

use autoasm_core::{
    Amount, BlockHandle, BlockId, InventoryRef, ItemId, LookupError, Platform, ProducerHandle,
};
use autoasm_text::{PANEL_FONT_SIZE, RenderMode};

use crate::counter::spinner_glyph;
use crate::inventory::{InventoryCache, InventorySnapshot};
use crate::output::OutputBuffer;
use crate::panels::{NamingConvention, PanelLocator, PanelSet};
use crate::reconcile::{self, GoalLine, GoalTable, RemovalLine};
use crate::registry::{BlockRegistry, GridFilter};
use crate::run::{Fatal, Transcript};
use crate::submit::{Submitter, WorkOrders};

/// Name printed in the header when no controller is running.
pub const UNKNOWN_CONTROLLER: &str = "Unknown";

pub struct Session<'p, P: Platform + ?Sized> {
    platform: &'p mut P,
    registry: BlockRegistry,
    panels: PanelSet,
    output: OutputBuffer,
    inventory: InventoryCache,
    launch: u64,
    argument: String,
    had_error: bool,
    finished: bool,
}

impl<'p, P: Platform + ?Sized> Session<'p, P> {
    /// Open a session using the standard panel naming convention.
    pub fn open(platform: &'p mut P, launch: u64) -> Self {
        Self::open_with(platform, launch, &NamingConvention)
    }

    /// Scan blocks, print the status header, and prepare the panels.
    pub fn open_with(platform: &'p mut P, launch: u64, locator: &dyn PanelLocator) -> Self {
        let registry = BlockRegistry::scan(&*platform);
        let mut output = OutputBuffer::new();

        let controller = registry.controller();
        let title = controller.map_or(UNKNOWN_CONTROLLER, |c| c.name.as_str());
        output.print(format_args!(" ({}) {title}", spinner_glyph(launch)));

        let panels = match controller {
            Some(controller) => {
                let panels = locator.locate(&registry, controller);
                if panels.is_empty() {
                    tracing::warn!(prefix = %panels.prefix, "no panels found");
                    output.print(format_args!(
                        "failed to find screen with prefix \"{}\"",
                        panels.prefix
                    ));
                }
                panels
            }
            None => {
                tracing::warn!("no running programmable block");
                output.print("failed to find this programmable block");
                PanelSet::default()
            }
        };

        for panel in &panels.panels {
            platform.prepare_panel(panel.id(), PANEL_FONT_SIZE);
        }

        tracing::info!(
            launch,
            controller = title,
            panels = panels.len(),
            wide = panels.wide,
            raw = panels.raw,
            "session opened"
        );

        Self {
            platform,
            registry,
            panels,
            output,
            inventory: InventoryCache::new(),
            launch,
            argument: String::new(),
            had_error: false,
            finished: false,
        }
    }

    /// Attach the free-form invocation argument.
    #[must_use]
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = argument.into();
        self
    }

    #[must_use]
    pub fn argument(&self) -> &str {
        &self.argument
    }

    #[must_use]
    pub fn launch(&self) -> u64 {
        self.launch
    }

    #[must_use]
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    #[must_use]
    pub fn panels(&self) -> &PanelSet {
        &self.panels
    }

    /// Text printed so far.
    #[must_use]
    pub fn output(&self) -> &str {
        self.output.as_str()
    }

    #[must_use]
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn print(&mut self, value: impl fmt::Display) {
        self.output.print(value);
    }

    /// Print an error and suppress the closing `Done` line.
    pub fn print_error(&mut self, err: impl fmt::Display) {
        self.had_error = true;
        self.output.print(err);
    }

    // ── Lookups ─────────────────────────────────────────────────────────

    pub fn find<H: BlockHandle>(&self, name: &str, filter: GridFilter) -> Result<H, LookupError> {
        let found = self.registry.find(name, filter);
        if let Err(err) = &found {
            tracing::warn!(name, error = %err, "block lookup failed");
        }
        found
    }

    #[must_use]
    pub fn find_if_exists<H: BlockHandle>(&self, name: &str, filter: GridFilter) -> Option<H> {
        self.registry.find_if_exists(name, filter)
    }

    #[must_use]
    pub fn inventories(&self, filter: GridFilter) -> Vec<InventoryRef> {
        self.registry.inventories(filter)
    }

    pub fn find_inventory(
        &self,
        name: &str,
        filter: GridFilter,
    ) -> Result<InventoryRef, LookupError> {
        self.registry.find_inventory(name, filter)
    }

    /// Registry name of a block, for messages.
    #[must_use]
    pub fn block_name(&self, id: BlockId) -> &str {
        self.registry.block(id).map_or("", |b| b.name.as_str())
    }

    // ── Inventory ───────────────────────────────────────────────────────

    /// Current-grid item totals, scanned once per session.
    pub fn item_counts(&self) -> &InventorySnapshot {
        self.inventory.get_or_scan(&*self.platform, &self.registry)
    }

    pub fn item_count(&self, id: &ItemId) -> Amount {
        self.item_counts().count(id)
    }

    // ── Production ──────────────────────────────────────────────────────

    #[must_use]
    pub fn is_idle(&self, producer: ProducerHandle) -> bool {
        self.platform.is_queue_empty(producer.id())
    }

    /// Queue `quantity` of `id` on `producer`, with blueprint fallback.
    pub fn add_assembler_task(
        &mut self,
        producer: ProducerHandle,
        id: &ItemId,
        quantity: Amount,
    ) -> bool {
        Submitter::new(&mut *self.platform, producer).submit(id, quantity, &mut self.output)
    }

    /// Report every goal; queue deficits when `producer` is idle.
    pub fn reconcile(&mut self, producer: ProducerHandle, goals: &GoalTable) -> Vec<GoalLine> {
        let idle = self.is_idle(producer);
        let snapshot = self
            .inventory
            .get_or_scan(&*self.platform, &self.registry);
        let mut submitter = Submitter::new(&mut *self.platform, producer);
        reconcile::reconcile(snapshot, goals, idle, &mut submitter, &mut self.output)
    }

    /// Queue disassembly of everything above `retained` for each listed item.
    ///
    /// A busy disassembler is reported and left alone.
    pub fn remove_surplus(
        &mut self,
        disassembler: ProducerHandle,
        ids: &[ItemId],
        retained: Amount,
    ) -> Vec<RemovalLine> {
        if !self.is_idle(disassembler) {
            let name = self.block_name(disassembler.id()).to_string();
            self.output.print(format_args!("{name} is busy"));
            return Vec::new();
        }
        let snapshot = self
            .inventory
            .get_or_scan(&*self.platform, &self.registry);
        let mut submitter = Submitter::new(&mut *self.platform, disassembler);
        reconcile::sweep_surplus(snapshot, ids, retained, &mut submitter, &mut self.output)
    }

    // ── Flush ───────────────────────────────────────────────────────────

    /// Print `Done` (unless an error was printed) and write the panels.
    pub fn finish(mut self) -> Result<Transcript, Fatal> {
        self.finalize(false)
    }

    fn finalize(&mut self, unwinding: bool) -> Result<Transcript, Fatal> {
        self.finished = true;
        if !self.had_error && !unwinding {
            self.output.print("Done");
        }
        self.flush()
    }

    fn flush(&mut self) -> Result<Transcript, Fatal> {
        if self.panels.is_empty() {
            return Err(Fatal::NoDisplay {
                transcript: self.output.take(),
            });
        }
        let virtual_display = self.panels.display();
        let pages = virtual_display.render(self.output.as_str());
        for (panel, text) in self.panels.panels.iter().zip(&pages) {
            self.platform.write_panel(panel.id(), text);
        }
        tracing::debug!(
            pages = pages.len(),
            rows = virtual_display.rows(),
            columns = virtual_display.columns(),
            raw = virtual_display.mode() == RenderMode::Raw,
            "flushed output"
        );
        Ok(Transcript {
            text: self.output.take(),
            pages,
            mode: virtual_display.mode(),
        })
    }
}

impl<P: Platform + ?Sized> Drop for Session<'_, P> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let unwinding = std::thread::panicking();
        if let Err(Fatal::NoDisplay { transcript }) = self.finalize(unwinding) {
            tracing::error!(?transcript, "no display available, output lost");
        }
    }
}

impl<P: Platform + ?Sized> fmt::Debug for Session<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("launch", &self.launch)
            .field("panels", &self.panels.len())
            .field("had_error", &self.had_error)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoasm_harness::SimGrid;
    use tracing_test::traced_test;

    fn item(s: &str) -> ItemId {
        s.parse().unwrap()
    }

    fn grid_with_panels(panels: &[&str]) -> SimGrid {
        let mut grid = SimGrid::new();
        grid.add_controller("PB-Assembly");
        for name in panels {
            grid.add_panel(name);
        }
        grid
    }

    #[test]
    fn header_shows_spinner_and_controller() {
        let mut grid = grid_with_panels(&["Screen-Assembly-0"]);
        let session = Session::open(&mut grid, 5);
        assert_eq!(session.output(), " (/) PB-Assembly\n");
        drop(session);
    }

    #[test]
    fn missing_controller_is_reported() {
        let mut grid = SimGrid::new();
        let session = Session::open(&mut grid, 0);
        assert_eq!(
            session.output(),
            " (|) Unknown\nfailed to find this programmable block\n"
        );
        let err = session.finish().unwrap_err();
        let Fatal::NoDisplay { transcript } = err;
        assert!(transcript.ends_with("Done\n"));
    }

    #[test]
    fn missing_panels_are_reported() {
        let mut grid = grid_with_panels(&[]);
        let mut session = Session::open(&mut grid, 2);
        session.print("hello");
        assert_eq!(
            session.finish(),
            Err(Fatal::NoDisplay {
                transcript: " (-) PB-Assembly\n\
                             failed to find screen with prefix \"Screen-Assembly\"\n\
                             hello\n\
                             Done\n"
                    .to_string()
            })
        );
    }

    #[test]
    fn panels_are_prepared_on_open() {
        let mut grid = grid_with_panels(&["Screen-Assembly-0", "Screen-Assembly-1"]);
        drop(Session::open(&mut grid, 1));
        assert_eq!(grid.panel_font_size("Screen-Assembly-0"), Some(PANEL_FONT_SIZE));
        assert_eq!(grid.panel_font_size("Screen-Assembly-1"), Some(PANEL_FONT_SIZE));
    }

    #[test]
    fn finish_writes_done_to_first_panel() {
        let mut grid = grid_with_panels(&["Screen-Assembly-0", "Screen-Assembly-1"]);
        let transcript = Session::open(&mut grid, 4).finish().unwrap();
        assert_eq!(transcript.text, " (|) PB-Assembly\nDone\n");
        assert_eq!(transcript.pages.len(), 2);
        assert_eq!(
            grid.panel_text("Screen-Assembly-0"),
            Some("  (|) PB-Assembly \n Done \n")
        );
        assert_eq!(grid.panel_text("Screen-Assembly-1"), Some(""));
    }

    #[test]
    fn error_suppresses_done() {
        let mut grid = grid_with_panels(&["Screen-Assembly-0r"]);
        let mut session = Session::open(&mut grid, 0);
        session.print_error("failed to find block \"AutoAssembler\"");
        let transcript = session.finish().unwrap();
        assert_eq!(transcript.mode, RenderMode::Raw);
        assert_eq!(
            grid.panel_text("Screen-Assembly-0r"),
            Some(" (|) PB-Assembly\nfailed to find block \"AutoAssembler\"\n")
        );
    }

    #[test]
    fn drop_flushes_unfinished_session() {
        let mut grid = grid_with_panels(&["Screen-Assembly-0r"]);
        {
            let mut session = Session::open(&mut grid, 0);
            session.print("partial");
        }
        assert_eq!(
            grid.panel_text("Screen-Assembly-0r"),
            Some(" (|) PB-Assembly\npartial\nDone\n")
        );
    }

    #[test]
    #[traced_test]
    fn drop_without_display_logs_the_transcript() {
        let mut grid = grid_with_panels(&[]);
        {
            let mut session = Session::open(&mut grid, 0);
            session.print("lost line");
        }
        assert!(logs_contain("no display available"));
        assert!(logs_contain("lost line"));
    }

    #[test]
    fn item_counts_cover_current_grid_only() {
        let mut grid = grid_with_panels(&["Screen-Assembly-0"]);
        grid.add_container("Cargo")
            .stack("MyObjectBuilder_Component", "SteelPlate", 40);
        grid.add_container_on("Docked", 2)
            .stack("MyObjectBuilder_Component", "SteelPlate", 1000);
        let session = Session::open(&mut grid, 0);
        assert_eq!(
            session.item_count(&item("Component/SteelPlate")),
            Amount::from_units(40)
        );
        assert_eq!(session.item_counts().len(), 1);
    }

    #[test]
    fn reconcile_queues_deficits_on_idle_producer() {
        let mut grid = grid_with_panels(&["Screen-Assembly-0"]);
        grid.add_assembler("AutoAssembler")
            .blueprint("MyObjectBuilder_BlueprintDefinition/SteelPlate");
        grid.add_container("Cargo")
            .stack("MyObjectBuilder_Component", "SteelPlate", 12000);

        let mut goals = GoalTable::new();
        goals.insert(item("Component/SteelPlate"), 30000);

        let mut session = Session::open(&mut grid, 0);
        let assembler: ProducerHandle = session.find("AutoAssembler", GridFilter::None).unwrap();
        let lines = session.reconcile(assembler, &goals);
        assert_eq!(lines[0].deficit, Amount::from_units(18000));
        assert!(
            session
                .output()
                .contains("- SteelPlate          :  12000 /  30000\n")
        );
        drop(session);

        assert_eq!(
            grid.queue("AutoAssembler"),
            vec![(
                "MyObjectBuilder_BlueprintDefinition/SteelPlate".to_string(),
                Amount::from_units(18000)
            )]
        );
    }

    #[test]
    fn busy_disassembler_is_left_alone() {
        let mut grid = grid_with_panels(&["Screen-Assembly-0"]);
        grid.add_assembler("AutoDisassembler")
            .blueprint("MyObjectBuilder_BlueprintDefinition/Welder")
            .queued("MyObjectBuilder_BlueprintDefinition/Welder", 1);
        grid.add_container("Cargo")
            .stack("MyObjectBuilder_PhysicalGunObject", "WelderItem", 5);

        let mut session = Session::open(&mut grid, 0);
        let disassembler: ProducerHandle =
            session.find("AutoDisassembler", GridFilter::None).unwrap();
        let lines = session.remove_surplus(
            disassembler,
            &[item("PhysicalGunObject/WelderItem")],
            Amount::ONE,
        );
        assert!(lines.is_empty());
        assert!(session.output().ends_with("AutoDisassembler is busy\n"));
        drop(session);
        assert_eq!(grid.queue("AutoDisassembler").len(), 1);
    }

    #[test]
    #[traced_test]
    fn flush_logs_display_geometry() {
        let mut grid = grid_with_panels(&["Screen-Assembly-0w"]);
        let transcript = Session::open(&mut grid, 0).finish().unwrap();
        assert_eq!(transcript.pages.len(), 1);
        assert!(logs_contain("flushed output"));
        assert!(logs_contain("rows=19"));
        assert!(logs_contain("columns=55"));
    }

    #[test]
    fn block_helpers_respect_grid_filter() {
        let mut grid = grid_with_panels(&["Screen-Assembly-0"]);
        grid.add_container("Cargo");
        grid.add_assembler("AutoAssembler");
        grid.add_container_on("Docked", 2);

        let session = Session::open(&mut grid, 0);
        assert_eq!(
            session.inventories(GridFilter::Current),
            vec![
                InventoryRef { block: BlockId(2), index: 0 },
                InventoryRef { block: BlockId(3), index: 0 },
                InventoryRef { block: BlockId(3), index: 1 },
            ]
        );
        assert_eq!(session.inventories(GridFilter::None).len(), 4);

        assert_eq!(
            session.find_inventory("Docked", GridFilter::None),
            Ok(InventoryRef { block: BlockId(4), index: 0 })
        );
        assert_eq!(
            session.find_inventory("Docked", GridFilter::Current),
            Err(LookupError::NotFound { name: "Docked".into() })
        );
        assert_eq!(
            session.find_inventory("Screen-Assembly-0", GridFilter::None),
            Err(LookupError::NoInventory {
                name: "Screen-Assembly-0".into()
            })
        );
    }

    #[test]
    fn assembler_task_falls_back_then_reports_rejection() {
        let mut grid = grid_with_panels(&["Screen-Assembly-0"]);
        grid.add_assembler("AutoAssembler")
            .blueprint("MyObjectBuilder_BlueprintDefinition/ComputerComponent");

        let mut session = Session::open(&mut grid, 0);
        let assembler: ProducerHandle = session.find("AutoAssembler", GridFilter::None).unwrap();
        assert!(session.add_assembler_task(
            assembler,
            &item("Component/Computer"),
            Amount::from_units(5)
        ));
        assert!(!session.add_assembler_task(
            assembler,
            &item("Component/Unobtainium"),
            Amount::ONE
        ));
        assert!(session.output().ends_with(
            "AddQueueItem failed for Component/Unobtainium\n\
             tried: MyObjectBuilder_BlueprintDefinition/Unobtainium, \
             MyObjectBuilder_BlueprintDefinition/UnobtainiumComponent\n"
        ));
        drop(session);

        assert_eq!(
            grid.queue("AutoAssembler"),
            vec![(
                "MyObjectBuilder_BlueprintDefinition/ComputerComponent".to_string(),
                Amount::from_units(5)
            )]
        );
    }
}
