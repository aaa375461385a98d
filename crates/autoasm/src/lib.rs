#![forbid(unsafe_code)]

//! Assembly controller driven against a simulated grid.
//!
//! - [`plan`] - stock goals, removal list, producer names
//! - [`programs`] - `assembler-control` and `list-item-ids`
//! - [`cli`] - argument and environment parsing

pub mod cli;
pub mod plan;
pub mod programs;

use autoasm_harness::SimGrid;
use autoasm_runtime::{
    CounterStore, Fatal, FileCounter, MemoryCounter, Transcript, next_launch, run_invocation,
};

pub use cli::{Action, Opts};
pub use plan::{ConfigError, Plan};
pub use programs::Program;

/// Load the grid, plan, and launch counter, then run one invocation.
///
/// The outer `Result` covers startup configuration; the inner one is the
/// invocation's own outcome.
pub fn execute(opts: &Opts) -> Result<Result<Transcript, Fatal>, ConfigError> {
    let grid_path = opts
        .grid
        .as_deref()
        .ok_or_else(|| ConfigError::Invalid("no grid file given".into()))?;
    let mut grid = SimGrid::load(grid_path)?;
    let plan = match &opts.plan {
        Some(path) => Plan::load(path)?,
        None => Plan::default(),
    };

    let counter = counter_store(opts);
    let launch = next_launch(counter.as_ref())?;

    let result = run_invocation(&mut grid, launch, &opts.argument, |session| {
        opts.program.run(session, &plan)
    });

    if opts.write_back {
        grid.save(grid_path)?;
    }
    Ok(result)
}

fn counter_store(opts: &Opts) -> Box<dyn CounterStore> {
    match &opts.state {
        Some(path) => Box::new(FileCounter::new(path)),
        None => Box::new(MemoryCounter::new()),
    }
}
