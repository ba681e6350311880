//! Party balances: the ledger boundary and the payment-to-balance propagator.
//!
//! The propagator reacts to [`taller_payments::PaymentRecorded`] notifications
//! and asks the balance store to recompute the attributed party's balance.
//! Recomputation is full (not incremental), so at-least-once delivery is safe.

pub mod propagator;
pub mod store;

pub use propagator::BalancePropagator;
pub use store::{BalanceError, InMemoryPartyBalanceStore, PartyBalanceStore};
