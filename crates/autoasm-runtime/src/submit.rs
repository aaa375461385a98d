#![forbid(unsafe_code)]

//! Work-order submission with blueprint fallback.

use std::fmt;

use autoasm_core::{
    Amount, BlockHandle, BlueprintCandidates, EnqueueError, ItemId, Platform, ProducerHandle,
};

use crate::output::OutputBuffer;

/// Something that accepts production or disassembly orders.
pub trait WorkOrders {
    /// Queue `quantity` of `id`.
    ///
    /// Returns whether an order was committed. Failure diagnostics are
    /// printed to `out`.
    fn submit(&mut self, id: &ItemId, quantity: Amount, out: &mut OutputBuffer) -> bool;
}

/// Both blueprint candidates were refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOrder {
    pub id: ItemId,
    pub candidates: BlueprintCandidates,
    /// Errors in candidate order.
    pub errors: Vec<EnqueueError>,
}

impl fmt::Display for RejectedOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AddQueueItem failed for {}", self.id)?;
        for (candidate, err) in self.candidates.iter().zip(&self.errors) {
            write!(f, "; {candidate}: {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RejectedOrder {}

/// Queues orders on one producer block.
pub struct Submitter<'a, P: Platform + ?Sized> {
    platform: &'a mut P,
    producer: ProducerHandle,
}

impl<'a, P: Platform + ?Sized> Submitter<'a, P> {
    pub fn new(platform: &'a mut P, producer: ProducerHandle) -> Self {
        Self { platform, producer }
    }

    /// Try the primary blueprint, then the fallback.
    ///
    /// Returns the definition that was accepted. At most one order is
    /// committed.
    pub fn try_submit(&mut self, id: &ItemId, quantity: Amount) -> Result<String, RejectedOrder> {
        let candidates = id.blueprint_candidates();
        let mut errors = Vec::with_capacity(2);
        for definition in candidates.iter() {
            match self.platform.enqueue(self.producer.id(), definition, quantity) {
                Ok(()) => return Ok(definition.to_string()),
                Err(err) => {
                    tracing::debug!(%id, definition, error = %err, "blueprint candidate refused");
                    errors.push(err);
                }
            }
        }
        Err(RejectedOrder {
            id: id.clone(),
            candidates,
            errors,
        })
    }
}

impl<P: Platform + ?Sized> WorkOrders for Submitter<'_, P> {
    fn submit(&mut self, id: &ItemId, quantity: Amount, out: &mut OutputBuffer) -> bool {
        match self.try_submit(id, quantity) {
            Ok(definition) => {
                tracing::info!(
                    %id,
                    %quantity,
                    %definition,
                    producer = self.producer.id().0,
                    "order queued"
                );
                true
            }
            Err(rejected) => {
                out.print(format_args!("AddQueueItem failed for {id}"));
                out.print(format_args!(
                    "tried: {}, {}",
                    rejected.candidates.primary, rejected.candidates.fallback
                ));
                tracing::warn!(%rejected, "order not queued");
                false
            }
        }
    }
}
