//! Payments domain module (pagos).
//!
//! A payment is owed (Deuda) until it is settled (Pago); there is no reversal.
//! Each payment is attributed to at most one party, and its creation is
//! announced with a [`PaymentRecorded`] event once the write is committed.

pub mod payment;

pub use payment::{Payable, Payment, PaymentLifecycle, PaymentRecorded, PaymentState};
