use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taller_core::{BudgetId, ClientId, DomainError, Entity};
use taller_lifecycle::{LifecycleState, StateMachine, Stateful, TransitionError};

/// Budget lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetState {
    Presupuestado,
    Aprobado,
    Rechazado,
    EnProceso,
    Cancelado,
    Entregado,
}

impl BudgetState {
    pub const ALL: [BudgetState; 6] = [
        BudgetState::Presupuestado,
        BudgetState::Aprobado,
        BudgetState::Rechazado,
        BudgetState::EnProceso,
        BudgetState::Cancelado,
        BudgetState::Entregado,
    ];
}

impl LifecycleState for BudgetState {
    fn label(&self) -> &'static str {
        match self {
            BudgetState::Presupuestado => "presupuestado",
            BudgetState::Aprobado => "aprobado",
            BudgetState::Rechazado => "rechazado",
            BudgetState::EnProceso => "en_proceso",
            BudgetState::Cancelado => "cancelado",
            BudgetState::Entregado => "entregado",
        }
    }
}

impl core::fmt::Display for BudgetState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse reporting tag derived from [`BudgetState`].
///
/// Used by listings that only care about whether a budget cleared approval.
/// It is a derived view; the lifecycle state stays authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Pending,
    Approved,
    Rejected,
}

impl From<BudgetState> for BudgetStatus {
    fn from(state: BudgetState) -> Self {
        match state {
            BudgetState::Aprobado => BudgetStatus::Approved,
            BudgetState::Rechazado => BudgetStatus::Rejected,
            BudgetState::Presupuestado
            | BudgetState::EnProceso
            | BudgetState::Cancelado
            | BudgetState::Entregado => BudgetStatus::Pending,
        }
    }
}

/// Transition engine for budgets.
///
/// Construct once at process start and inject wherever budgets are mutated.
#[derive(Debug, Clone)]
pub struct BudgetLifecycle {
    machine: StateMachine<BudgetState>,
}

impl BudgetLifecycle {
    pub fn new() -> Self {
        use BudgetState::*;
        let machine = StateMachine::new(
            Presupuestado,
            &[
                (&[Presupuestado], Aprobado),
                (&[Aprobado, Rechazado], EnProceso),
                (&[Presupuestado, Aprobado], Rechazado),
                (&[Presupuestado, Aprobado, EnProceso, Rechazado], Cancelado),
                (&[EnProceso], Entregado),
                // Revival edge: a cancelled budget re-opens at Aprobado only.
                (&[Cancelado], Aprobado),
            ],
        );
        Self { machine }
    }

    pub fn default_state(&self) -> BudgetState {
        self.machine.default_state()
    }

    pub fn can_transition(&self, current: BudgetState, target: BudgetState) -> bool {
        self.machine.can_transition(current, target)
    }

    /// Validate and apply a state change; the budget is untouched on failure.
    pub fn transition(
        &self,
        budget: &mut Budget,
        target: BudgetState,
    ) -> Result<BudgetState, TransitionError<BudgetState>> {
        self.machine.transition(budget, target)
    }
}

impl Default for BudgetLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// A quoted piece of work for a client, tracked through approval and delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    id: BudgetId,
    client_id: ClientId,
    description: String,
    /// Quoted total in smallest currency unit (e.g., cents).
    total: u64,
    issued_at: DateTime<Utc>,
    state: BudgetState,
}

impl Budget {
    /// Create a budget in the lifecycle's default state.
    ///
    /// Any caller-supplied state is ignored by design; budgets always start
    /// at Presupuestado.
    pub fn new(
        id: BudgetId,
        client_id: ClientId,
        description: impl Into<String>,
        total: u64,
        issued_at: DateTime<Utc>,
        lifecycle: &BudgetLifecycle,
    ) -> Result<Self, DomainError> {
        if total == 0 {
            return Err(DomainError::validation("budget total must be positive"));
        }
        Ok(Self {
            id,
            client_id,
            description: description.into(),
            total,
            issued_at,
            state: lifecycle.default_state(),
        })
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn status(&self) -> BudgetStatus {
        self.state.into()
    }
}

impl Entity for Budget {
    type Id = BudgetId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Stateful for Budget {
    type State = BudgetState;

    fn state(&self) -> BudgetState {
        self.state
    }

    fn set_state(&mut self, state: BudgetState) {
        self.state = state;
    }
}
