use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taller_core::{ClientId, DomainError, EmployeeId, Entity, PaymentId, SupplierId};
use taller_events::Event;
use taller_lifecycle::{LifecycleState, StateMachine, Stateful, TransitionError};
use taller_parties::PartyRef;

/// Payment lifecycle state: owed or settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Deuda,
    Pago,
}

impl LifecycleState for PaymentState {
    fn label(&self) -> &'static str {
        match self {
            PaymentState::Deuda => "deuda",
            PaymentState::Pago => "pago",
        }
    }
}

impl core::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// The party a payment is attributed to.
///
/// Replaces the legacy shape of three mutually-exclusive nullable columns;
/// "none set" is the explicit [`Payable::Unattributed`] case rather than an
/// implicit absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum Payable {
    Client(ClientId),
    Supplier(SupplierId),
    Employee(EmployeeId),
    Unattributed,
}

impl Payable {
    /// Resolve the legacy column triple into a single attribution.
    ///
    /// When more than one column is set the first wins, in the fixed order
    /// client, supplier, employee (observed legacy precedence).
    pub fn from_columns(
        client_id: Option<ClientId>,
        supplier_id: Option<SupplierId>,
        employee_id: Option<EmployeeId>,
    ) -> Self {
        if let Some(id) = client_id {
            Payable::Client(id)
        } else if let Some(id) = supplier_id {
            Payable::Supplier(id)
        } else if let Some(id) = employee_id {
            Payable::Employee(id)
        } else {
            Payable::Unattributed
        }
    }

    /// The attributed party, if any.
    pub fn party_ref(&self) -> Option<PartyRef> {
        match self {
            Payable::Client(id) => Some(PartyRef::Client(*id)),
            Payable::Supplier(id) => Some(PartyRef::Supplier(*id)),
            Payable::Employee(id) => Some(PartyRef::Employee(*id)),
            Payable::Unattributed => None,
        }
    }
}

/// Transition engine for payments: Deuda -> Pago, one way.
#[derive(Debug, Clone)]
pub struct PaymentLifecycle {
    machine: StateMachine<PaymentState>,
}

impl PaymentLifecycle {
    pub fn new() -> Self {
        use PaymentState::*;
        let machine = StateMachine::new(Deuda, &[(&[Deuda], Pago)]);
        Self { machine }
    }

    pub fn default_state(&self) -> PaymentState {
        self.machine.default_state()
    }

    pub fn can_transition(&self, current: PaymentState, target: PaymentState) -> bool {
        self.machine.can_transition(current, target)
    }

    /// Validate and apply a state change; the payment is untouched on failure.
    pub fn transition(
        &self,
        payment: &mut Payment,
        target: PaymentState,
    ) -> Result<PaymentState, TransitionError<PaymentState>> {
        self.machine.transition(payment, target)
    }
}

impl Default for PaymentLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Money owed to or by a party, settled at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,
    payable: Payable,
    /// Amount in smallest currency unit (e.g., cents).
    amount: u64,
    note: Option<String>,
    issued_at: DateTime<Utc>,
    settled_at: Option<DateTime<Utc>>,
    state: PaymentState,
}

impl Payment {
    /// Record a payment in the lifecycle's default state (Deuda).
    pub fn new(
        id: PaymentId,
        payable: Payable,
        amount: u64,
        note: Option<String>,
        issued_at: DateTime<Utc>,
        lifecycle: &PaymentLifecycle,
    ) -> Result<Self, DomainError> {
        if amount == 0 {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        Ok(Self {
            id,
            payable,
            amount,
            note,
            issued_at,
            settled_at: None,
            state: lifecycle.default_state(),
        })
    }

    pub fn payable(&self) -> Payable {
        self.payable
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.settled_at
    }

    /// Mark the payment as settled (Deuda -> Pago) and stamp the time.
    pub fn settle(
        &mut self,
        settled_at: DateTime<Utc>,
        lifecycle: &PaymentLifecycle,
    ) -> Result<(), TransitionError<PaymentState>> {
        lifecycle.transition(self, PaymentState::Pago)?;
        self.settled_at = Some(settled_at);
        Ok(())
    }

    /// The creation notification for this payment.
    ///
    /// Publish only after the creating write is durably committed.
    pub fn recorded(&self) -> PaymentRecorded {
        PaymentRecorded {
            payment_id: self.id,
            payable: self.payable,
            amount: self.amount,
            occurred_at: self.issued_at,
        }
    }
}

impl Entity for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Stateful for Payment {
    type State = PaymentState;

    fn state(&self) -> PaymentState {
        self.state
    }

    fn set_state(&mut self, state: PaymentState) {
        self.state = state;
    }
}

/// Event: a payment was created.
///
/// Consumed exactly once by the balance propagator; delivery may be
/// synchronous or via a queued worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecorded {
    pub payment_id: PaymentId,
    pub payable: Payable,
    pub amount: u64,
    pub occurred_at: DateTime<Utc>,
}

impl Event for PaymentRecorded {
    fn event_type(&self) -> &'static str {
        "payments.payment.recorded"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_payment(lifecycle: &PaymentLifecycle, payable: Payable) -> Payment {
        Payment::new(
            PaymentId::new(),
            payable,
            15_000,
            Some("anticipo".into()),
            Utc::now(),
            lifecycle,
        )
        .unwrap()
    }

    #[test]
    fn fresh_payment_starts_as_deuda() {
        let lifecycle = PaymentLifecycle::new();
        let payment = test_payment(&lifecycle, Payable::Client(ClientId::new()));
        assert_eq!(payment.state(), PaymentState::Deuda);
        assert_eq!(payment.settled_at(), None);
    }

    #[test]
    fn settling_moves_to_pago_and_stamps_time() {
        let lifecycle = PaymentLifecycle::new();
        let mut payment = test_payment(&lifecycle, Payable::Client(ClientId::new()));

        let when = Utc::now();
        payment.settle(when, &lifecycle).unwrap();

        assert_eq!(payment.state(), PaymentState::Pago);
        assert_eq!(payment.settled_at(), Some(when));
    }

    #[test]
    fn settlement_cannot_be_reversed() {
        let lifecycle = PaymentLifecycle::new();
        let mut payment = test_payment(&lifecycle, Payable::Client(ClientId::new()));
        payment.settle(Utc::now(), &lifecycle).unwrap();

        let err = lifecycle
            .transition(&mut payment, PaymentState::Deuda)
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                from: PaymentState::Pago,
                to: PaymentState::Deuda,
            }
        );
        assert_eq!(payment.state(), PaymentState::Pago);
    }

    #[test]
    fn transition_table_is_exactly_deuda_to_pago() {
        let lifecycle = PaymentLifecycle::new();
        let states = [PaymentState::Deuda, PaymentState::Pago];

        for current in states {
            for target in states {
                let mut payment = test_payment(&lifecycle, Payable::Unattributed);
                payment.set_state(current);

                let expected = current == PaymentState::Deuda && target == PaymentState::Pago;
                let result = lifecycle.transition(&mut payment, target);

                assert_eq!(result.is_ok(), expected, "{current:?} -> {target:?}");
                let end = if expected { target } else { current };
                assert_eq!(payment.state(), end);
            }
        }
    }

    #[test]
    fn settling_twice_fails() {
        let lifecycle = PaymentLifecycle::new();
        let mut payment = test_payment(&lifecycle, Payable::Unattributed);
        let first = Utc::now();
        payment.settle(first, &lifecycle).unwrap();

        assert!(payment.settle(Utc::now(), &lifecycle).is_err());
        assert_eq!(payment.settled_at(), Some(first));
    }

    #[test]
    fn rejects_zero_amount() {
        let lifecycle = PaymentLifecycle::new();
        let err = Payment::new(
            PaymentId::new(),
            Payable::Unattributed,
            0,
            None,
            Utc::now(),
            &lifecycle,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn column_resolution_prefers_client_then_supplier_then_employee() {
        let client = ClientId::new();
        let supplier = SupplierId::new();
        let employee = EmployeeId::new();

        assert_eq!(
            Payable::from_columns(Some(client), Some(supplier), Some(employee)),
            Payable::Client(client)
        );
        assert_eq!(
            Payable::from_columns(None, Some(supplier), Some(employee)),
            Payable::Supplier(supplier)
        );
        assert_eq!(
            Payable::from_columns(None, None, Some(employee)),
            Payable::Employee(employee)
        );
        assert_eq!(
            Payable::from_columns(None, None, None),
            Payable::Unattributed
        );
    }

    #[test]
    fn unattributed_payable_has_no_party_ref() {
        assert_eq!(Payable::Unattributed.party_ref(), None);

        let client = ClientId::new();
        assert_eq!(
            Payable::Client(client).party_ref(),
            Some(taller_parties::PartyRef::Client(client))
        );
    }

    #[test]
    fn recorded_event_mirrors_the_payment() {
        let lifecycle = PaymentLifecycle::new();
        let payable = Payable::Supplier(SupplierId::new());
        let payment = test_payment(&lifecycle, payable);

        let event = payment.recorded();
        assert_eq!(event.payment_id, *payment.id());
        assert_eq!(event.payable, payable);
        assert_eq!(event.amount, payment.amount());
        assert_eq!(event.event_type(), "payments.payment.recorded");
        assert_eq!(Event::version(&event), 1);
    }

    #[test]
    fn states_serialize_to_wire_labels() {
        assert_eq!(
            serde_json::to_string(&PaymentState::Deuda).unwrap(),
            "\"deuda\""
        );
        assert_eq!(
            serde_json::from_str::<PaymentState>("\"pago\"").unwrap(),
            PaymentState::Pago
        );
    }
}
