//! Budgets domain module (presupuestos).
//!
//! A budget moves through approval, execution, and delivery; the transition
//! table deliberately allows re-opening (Cancelado back to Aprobado) and
//! working on a rejected budget (Rechazado to EnProceso).

pub mod budget;

pub use budget::{Budget, BudgetLifecycle, BudgetState, BudgetStatus};
