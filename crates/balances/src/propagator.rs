//! Reacts to payment creation by recomputing the attributed party's balance.

use std::sync::Arc;

use tracing::warn;

use taller_events::{EventBus, Worker, WorkerHandle};
use taller_payments::PaymentRecorded;

use crate::store::{BalanceError, PartyBalanceStore};

/// Consumes `PaymentRecorded` notifications and updates party balances.
///
/// Dispatch is either a direct call to [`on_payment_recorded`] in the creating
/// request, or a bus subscription via [`spawn`]. The handler is idempotent
/// because `update_balance` is a full recomputation, so at-least-once delivery
/// through the bus is safe.
///
/// [`on_payment_recorded`]: BalancePropagator::on_payment_recorded
/// [`spawn`]: BalancePropagator::spawn
#[derive(Clone)]
pub struct BalancePropagator {
    store: Arc<dyn PartyBalanceStore>,
}

impl BalancePropagator {
    pub fn new(store: Arc<dyn PartyBalanceStore>) -> Self {
        Self { store }
    }

    /// Handle one payment-created notification.
    ///
    /// Attributed payment: exactly one `update_balance` call for that party.
    /// Unattributed payment: no store call and no error, but logged — a
    /// payment nobody owns usually means a data-entry problem upstream.
    pub fn on_payment_recorded(&self, event: &PaymentRecorded) -> Result<(), BalanceError> {
        match event.payable.party_ref() {
            Some(party) => self.store.update_balance(party),
            None => {
                warn!(
                    payment_id = %event.payment_id,
                    amount = event.amount,
                    "payment has no attributed party; balance left untouched"
                );
                Ok(())
            }
        }
    }

    /// Run the propagator as a background consumer of a bus subscription.
    ///
    /// Balances become eventually consistent: readers may see a stale value
    /// for a bounded delay after payment creation returns.
    pub fn spawn<B>(self, bus: B) -> WorkerHandle
    where
        B: EventBus<PaymentRecorded> + Send + Sync + 'static,
    {
        Worker::spawn("balance-propagator", bus, move |event: PaymentRecorded| {
            self.on_payment_recorded(&event)
        })
    }
}
