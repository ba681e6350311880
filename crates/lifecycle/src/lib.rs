//! Generic lifecycle engine: a data-driven state machine per entity kind.
//!
//! Each entity kind declares a closed set of states, a default state, and a
//! directed transition table. The engine validates and applies transitions;
//! it never persists and never touches anything beyond the entity's state field.

pub mod machine;

pub use machine::{LifecycleState, StateMachine, Stateful, TransitionError};
