//! Action contract, registry, and built-in behaviors.

pub mod action;
pub mod builtin;
pub mod registry;

pub use action::{Action, ActionCtx};
pub use builtin::{AwaitSignal, TimedPerformance};
pub use registry::{ActionFactory, ActionRegistry};
