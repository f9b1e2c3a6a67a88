//! In-process event bus for the Vellum versioning engine.
//!
//! The engine emits exactly one event today — `commit.merged` — as a
//! fire-and-forget notification after a merge transaction commits.
//! External subscribers (queues, websockets, mail) consume it; the engine
//! never awaits or depends on delivery.

pub mod bus;

pub use bus::{EventBus, PlatformEvent};
