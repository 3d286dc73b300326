//! Role resolution.
//!
//! Leaf nodes carry symbolic role strings; an injected resolver decides which
//! actor category each role targets on this machine. The same tree runs on
//! every participant, so the same role resolves differently per process (one
//! participant's `Local` is everyone else's `Remote`).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Network identity of a human participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which actor a role resolves to, from this process's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorBinding {
    /// The human participant on this machine.
    Local { participant: ParticipantId },
    /// A human participant on another machine.
    Remote { participant: ParticipantId },
    /// A locally-simulated autonomous agent.
    Autonomous { agent: String },
    /// Non-actor role with no network ownership.
    System,
}

/// Resolves a leaf node's role string to an actor.
pub trait RoleResolver: Send + Sync {
    fn resolve(&self, role: &str) -> ActorBinding;
}

/// Map-backed resolver for fixed casts.
#[derive(Debug, Default, Clone)]
pub struct StaticRoles {
    bindings: HashMap<String, ActorBinding>,
}

impl StaticRoles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, role: impl Into<String>, binding: ActorBinding) -> Self {
        self.bindings.insert(role.into(), binding);
        self
    }

    pub fn insert(&mut self, role: impl Into<String>, binding: ActorBinding) {
        self.bindings.insert(role.into(), binding);
    }
}

impl RoleResolver for StaticRoles {
    fn resolve(&self, role: &str) -> ActorBinding {
        match self.bindings.get(role) {
            Some(binding) => binding.clone(),
            None => {
                warn!(role, "unknown role; treating as system");
                ActorBinding::System
            }
        }
    }
}
