#![forbid(unsafe_code)]

//! Programs that can run inside one invocation.

use std::fmt;
use std::str::FromStr;

use autoasm_core::{Platform, ProducerHandle};
use autoasm_runtime::{GridFilter, ProgramError, Session};
use autoasm_text::format_count;

use crate::plan::Plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Program {
    /// Keep goal stock topped up and disassemble surplus tools.
    #[default]
    AssemblerControl,
    /// Print every stored item with its count.
    ListItemIds,
}

impl Program {
    pub const ALL: [Program; 2] = [Program::AssemblerControl, Program::ListItemIds];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AssemblerControl => "assembler-control",
            Self::ListItemIds => "list-item-ids",
        }
    }

    /// Run this program's body against an open session.
    pub fn run<P: Platform + ?Sized>(
        self,
        session: &mut Session<'_, P>,
        plan: &Plan,
    ) -> Result<(), ProgramError> {
        match self {
            Self::AssemblerControl => assembler_control(session, plan),
            Self::ListItemIds => list_item_ids(session),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Program {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown program \"{s}\""))
    }
}

/// Report producer state, reconcile goals, then sweep removal items.
pub fn assembler_control<P: Platform + ?Sized>(
    session: &mut Session<'_, P>,
    plan: &Plan,
) -> Result<(), ProgramError> {
    let assembler: ProducerHandle = session.find(&plan.assembler, GridFilter::None)?;
    let state = if session.is_idle(assembler) { "ready" } else { "busy" };
    session.print(format_args!("{} is {state}", plan.assembler));

    session.reconcile(assembler, &plan.goals);

    session.print("");
    let disassembler: ProducerHandle = session.find(&plan.disassembler, GridFilter::None)?;
    session.remove_surplus(disassembler, &plan.removals, plan.retained);
    Ok(())
}

/// Print `{count} x {id}` for every item on the current grid.
pub fn list_item_ids<P: Platform + ?Sized>(
    session: &mut Session<'_, P>,
) -> Result<(), ProgramError> {
    let lines: Vec<String> = session
        .item_counts()
        .iter()
        .map(|(id, amount)| format!("{} x {id}", format_count(amount.whole())))
        .collect();
    for line in lines {
        session.print(line);
    }
    Ok(())
}
