use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taller_core::{BudgetId, ClientId, DomainError, Entity, WorkId};
use taller_lifecycle::{LifecycleState, StateMachine, Stateful, TransitionError};

/// Work lifecycle state.
///
/// The label doubles as the display status for listings; there is no separate
/// reporting enum to keep in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkState {
    Presupuestado,
    Aprobado,
    Elaborando,
    Entregado,
    Cancelado,
}

impl WorkState {
    pub const ALL: [WorkState; 5] = [
        WorkState::Presupuestado,
        WorkState::Aprobado,
        WorkState::Elaborando,
        WorkState::Entregado,
        WorkState::Cancelado,
    ];
}

impl LifecycleState for WorkState {
    fn label(&self) -> &'static str {
        match self {
            WorkState::Presupuestado => "presupuestado",
            WorkState::Aprobado => "aprobado",
            WorkState::Elaborando => "elaborando",
            WorkState::Entregado => "entregado",
            WorkState::Cancelado => "cancelado",
        }
    }
}

impl core::fmt::Display for WorkState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Transition engine for works.
///
/// Construct once at process start and inject wherever works are mutated.
#[derive(Debug, Clone)]
pub struct WorkLifecycle {
    machine: StateMachine<WorkState>,
}

impl WorkLifecycle {
    pub fn new() -> Self {
        use WorkState::*;
        let machine = StateMachine::new(
            Presupuestado,
            &[
                (&[Presupuestado], Aprobado),
                (&[Aprobado], Elaborando),
                (&[Elaborando], Entregado),
                (&[Presupuestado, Aprobado, Elaborando], Cancelado),
                // Revival edge: a cancelled work re-opens at Aprobado only.
                (&[Cancelado], Aprobado),
            ],
        )
        .with_initial_override();
        Self { machine }
    }

    pub fn default_state(&self) -> WorkState {
        self.machine.default_state()
    }

    /// State a new work starts in; honors an explicit caller-supplied state.
    pub fn initial_state(&self, requested: Option<WorkState>) -> WorkState {
        self.machine.initial_state(requested)
    }

    pub fn can_transition(&self, current: WorkState, target: WorkState) -> bool {
        self.machine.can_transition(current, target)
    }

    /// Validate and apply a state change; the work is untouched on failure.
    pub fn transition(
        &self,
        work: &mut Work,
        target: WorkState,
    ) -> Result<WorkState, TransitionError<WorkState>> {
        self.machine.transition(work, target)
    }
}

impl Default for WorkLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Execution of an approved budget for a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    id: WorkId,
    budget_id: BudgetId,
    client_id: ClientId,
    description: String,
    opened_at: DateTime<Utc>,
    state: WorkState,
}

impl Work {
    /// Create a work, optionally at an explicit initial state.
    ///
    /// The override is resolved through the lifecycle; when `initial` is
    /// `None` the work starts at the default (Presupuestado).
    pub fn new(
        id: WorkId,
        budget_id: BudgetId,
        client_id: ClientId,
        description: impl Into<String>,
        opened_at: DateTime<Utc>,
        initial: Option<WorkState>,
        lifecycle: &WorkLifecycle,
    ) -> Result<Self, DomainError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::validation("work description must not be empty"));
        }
        Ok(Self {
            id,
            budget_id,
            client_id,
            description,
            opened_at,
            state: lifecycle.initial_state(initial),
        })
    }

    pub fn budget_id(&self) -> BudgetId {
        self.budget_id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}

impl Entity for Work {
    type Id = WorkId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Stateful for Work {
    type State = WorkState;

    fn state(&self) -> WorkState {
        self.state
    }

    fn set_state(&mut self, state: WorkState) {
        self.state = state;
    }
}
