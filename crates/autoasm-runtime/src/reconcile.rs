#![forbid(unsafe_code)]

//! Goal reconciliation and surplus removal.
//!
//! Both passes compare observed totals against fixed thresholds, print one
//! line per item, and hand shortfalls or surpluses to a [`WorkOrders`] sink.

use std::fmt;

use autoasm_core::{Amount, ItemId};
use indexmap::IndexMap;

use crate::inventory::InventorySnapshot;
use crate::output::OutputBuffer;
use crate::submit::WorkOrders;

/// Target stock per item, iterated in insertion order.
pub type GoalTable = IndexMap<ItemId, u64>;

/// Which side of the target an item is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Observed strictly below target.
    Deficit,
    Surplus,
}

impl Sign {
    #[must_use]
    pub fn marker(self) -> char {
        match self {
            Self::Deficit => '-',
            Self::Surplus => '+',
        }
    }
}

/// What happened to an item's order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NotAttempted,
    Submitted,
    Rejected,
}

impl Outcome {
    fn from_submitted(ok: bool) -> Self {
        if ok { Self::Submitted } else { Self::Rejected }
    }
}

/// One evaluated goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalLine {
    pub id: ItemId,
    pub observed: Amount,
    pub target: u64,
    pub sign: Sign,
    /// `max(0, target - observed)`.
    pub deficit: Amount,
    pub outcome: Outcome,
}

impl GoalLine {
    #[must_use]
    pub fn evaluate(id: ItemId, observed: Amount, target: u64) -> Self {
        let target_amount = Amount::from_units(i64::try_from(target).unwrap_or(i64::MAX));
        let deficit = target_amount.shortfall_from(observed);
        let sign = if deficit.is_positive() {
            Sign::Deficit
        } else {
            Sign::Surplus
        };
        Self {
            id,
            observed,
            target,
            sign,
            deficit,
            outcome: Outcome::NotAttempted,
        }
    }
}

impl fmt::Display for GoalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<20}: {:>6} / {:>6}",
            self.sign.marker(),
            self.id.subtype(),
            self.observed,
            self.target
        )
    }
}

/// Print every goal and, when the producer is idle, queue each deficit.
///
/// Goals are visited in table order. Nothing is queued while the producer
/// is busy.
pub fn reconcile<W: WorkOrders + ?Sized>(
    snapshot: &InventorySnapshot,
    goals: &GoalTable,
    producer_idle: bool,
    orders: &mut W,
    out: &mut OutputBuffer,
) -> Vec<GoalLine> {
    let _span = tracing::debug_span!("reconcile", goals = goals.len(), producer_idle).entered();
    let mut lines = Vec::with_capacity(goals.len());
    for (id, &target) in goals {
        let mut line = GoalLine::evaluate(id.clone(), snapshot.count(id), target);
        out.print(&line);
        if producer_idle && line.sign == Sign::Deficit {
            line.outcome = Outcome::from_submitted(orders.submit(id, line.deficit, out));
        }
        lines.push(line);
    }
    tracing::debug!(
        deficits = lines.iter().filter(|l| l.sign == Sign::Deficit).count(),
        submitted = lines.iter().filter(|l| l.outcome == Outcome::Submitted).count(),
        "reconciled goals"
    );
    lines
}

/// One item considered for disassembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalLine {
    pub id: ItemId,
    pub observed: Amount,
    /// `observed - retained`, zero when nothing is surplus.
    pub surplus: Amount,
    pub outcome: Outcome,
}

/// Queue everything above `retained` for each listed item.
///
/// Callers check that the disassembler is idle first.
pub fn sweep_surplus<W: WorkOrders + ?Sized>(
    snapshot: &InventorySnapshot,
    ids: &[ItemId],
    retained: Amount,
    orders: &mut W,
    out: &mut OutputBuffer,
) -> Vec<RemovalLine> {
    let _span = tracing::debug_span!("sweep_surplus", items = ids.len(), %retained).entered();
    ids.iter()
        .map(|id| {
            let observed = snapshot.count(id);
            let surplus = observed.shortfall_from(retained);
            let mut outcome = Outcome::NotAttempted;
            if surplus.is_positive() {
                let ok = orders.submit(id, surplus, out);
                if ok {
                    out.print(format_args!("disassembling queued: {surplus} x {id}"));
                }
                outcome = Outcome::from_submitted(ok);
            }
            RemovalLine {
                id: id.clone(),
                observed,
                surplus,
                outcome,
            }
        })
        .collect()
}
