//! Balance store boundary and the in-memory reference implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use taller_parties::PartyRef;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalanceError {
    /// A store lock was poisoned by a panicking writer.
    #[error("balance store lock poisoned")]
    Poisoned,
}

/// Ledger boundary the propagator calls into.
///
/// `update_balance` is a **full recomputation** of the party's balance from
/// its underlying ledger, never an incremental add. Repeated calls for the
/// same party are therefore idempotent and convergent. Serializing concurrent
/// updates for the same party is the store's responsibility.
pub trait PartyBalanceStore: Send + Sync {
    fn update_balance(&self, party: PartyRef) -> Result<(), BalanceError>;

    /// Last published balance for the party, in smallest currency unit.
    ///
    /// Reflects the state as of the most recent `update_balance`; readers may
    /// observe a stale value until propagation runs.
    fn balance(&self, party: PartyRef) -> Option<i64>;
}

/// Per-party ledger: amounts owed and amounts paid.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct PartyLedger {
    debts: Vec<u64>,
    payments: Vec<u64>,
}

impl PartyLedger {
    /// Balance = total owed minus total paid.
    ///
    /// Accumulated in i128 so oversized ledger entries clamp to the i64
    /// range instead of wrapping.
    fn compute(&self) -> i64 {
        let owed: i128 = self.debts.iter().map(|a| *a as i128).sum();
        let paid: i128 = self.payments.iter().map(|a| *a as i128).sum();
        (owed - paid).clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

#[derive(Debug, Default)]
struct Inner {
    ledgers: HashMap<PartyRef, PartyLedger>,
    /// Published balance snapshots, only written by `update_balance`.
    balances: HashMap<PartyRef, i64>,
}

/// In-memory balance store for tests/dev and single-process deployments.
///
/// The single RwLock serializes updates per store (coarser than the per-party
/// requirement, which is fine for correctness).
#[derive(Debug, Default)]
pub struct InMemoryPartyBalanceStore {
    inner: RwLock<Inner>,
}

impl InMemoryPartyBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an owed amount to the party's ledger.
    ///
    /// Does not touch the published balance; that only moves on
    /// `update_balance`.
    pub fn record_debt(&self, party: PartyRef, amount: u64) -> Result<(), BalanceError> {
        let mut inner = self.inner.write().map_err(|_| BalanceError::Poisoned)?;
        inner.ledgers.entry(party).or_default().debts.push(amount);
        Ok(())
    }

    /// Append a paid amount to the party's ledger.
    pub fn record_payment(&self, party: PartyRef, amount: u64) -> Result<(), BalanceError> {
        let mut inner = self.inner.write().map_err(|_| BalanceError::Poisoned)?;
        inner.ledgers.entry(party).or_default().payments.push(amount);
        Ok(())
    }
}

impl PartyBalanceStore for InMemoryPartyBalanceStore {
    fn update_balance(&self, party: PartyRef) -> Result<(), BalanceError> {
        let mut inner = self.inner.write().map_err(|_| BalanceError::Poisoned)?;
        let computed = inner.ledgers.get(&party).map(PartyLedger::compute).unwrap_or(0);
        inner.balances.insert(party, computed);
        Ok(())
    }

    fn balance(&self, party: PartyRef) -> Option<i64> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.balances.get(&party).copied())
    }
}
