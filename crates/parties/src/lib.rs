//! Parties domain module (clients, suppliers, employees).
//!
//! Parties are the counterparties payments are attributed to. This crate holds
//! their registry records and the typed reference used to key balances.

pub mod party;

pub use party::{ContactInfo, Party, PartyKind, PartyRef};
