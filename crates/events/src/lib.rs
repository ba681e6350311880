//! Domain event plumbing: event trait, pub/sub bus, background worker.
//!
//! Events are published **after** the creating write is durably committed, so a
//! lost notification can always be replayed from the store of record. Delivery
//! is at-least-once; consumers must be idempotent.

pub mod bus;
pub mod event;
pub mod in_memory_bus;
pub mod worker;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use worker::{Worker, WorkerHandle};
