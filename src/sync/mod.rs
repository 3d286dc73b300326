//! Boundary contracts: completion synchronization, role resolution, event bus.

pub mod bridge;
pub mod bus;
pub mod roles;

pub use bridge::{CompletionBridge, CompletionNotice, LoopbackBridge, NullBridge};
pub use bus::{BusEvent, EventBus};
pub use roles::{ActorBinding, ParticipantId, RoleResolver, StaticRoles};
