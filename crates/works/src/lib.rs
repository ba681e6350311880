//! Works domain module (obras).
//!
//! A work is the execution side of an approved budget. Unlike budgets and
//! payments, the create path may supply an explicit initial state (imports of
//! in-flight works), so its lifecycle enables the initial-state override.

pub mod work;

pub use work::{Work, WorkLifecycle, WorkState};
