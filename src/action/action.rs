//! The pluggable leaf behavior contract.
//!
//! An `Action` is bound 1:1 to a leaf node for one execution pass: created
//! fresh from its factory, initialized once, driven to completion, then
//! discarded. Concrete behaviors (movement, dialogue, object interaction) live
//! outside the engine; the engine only owns this contract and the default
//! wait-for-completion body.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::sync::bridge::CompletionBridge;
use crate::sync::bus::EventBus;
use crate::sync::roles::{ActorBinding, RoleResolver};
use crate::tree::node::LeafNode;

/// Context handed to an action for its single execution pass.
#[derive(Clone)]
pub struct ActionCtx {
    /// The leaf node this action instance is bound to.
    pub leaf: Arc<LeafNode>,
    /// Resolves the leaf's role to an actor.
    pub roles: Arc<dyn RoleResolver>,
    /// Outbound half of the completion synchronization bridge.
    pub bridge: Arc<dyn CompletionBridge>,
    /// Local pub/sub bus for in-world occurrences.
    pub bus: EventBus,
    /// Fallback timeout used by the default action body.
    pub default_timeout: Duration,
}

impl ActionCtx {
    /// Resolve which actor the bound leaf's role targets.
    pub fn binding(&self) -> ActorBinding {
        self.roles.resolve(&self.leaf.role)
    }
}

/// Capability contract implemented by each pluggable leaf behavior.
///
/// Implementations must honor the role-branching rule: a `Local` binding
/// drives the behavior and ultimately flips the leaf's accomplished flag
/// (directly or through a bridge broadcast that loops back); a `Remote`
/// binding only waits for the flag; `Autonomous`/`System` bindings act out the
/// behavior locally and self-declare without any network round-trip.
#[async_trait]
pub trait Action: Send + Sync {
    /// Resolve the target actor and perform pre-run side effects (parameter
    /// parsing, event-bus subscriptions). Called exactly once per instance,
    /// before [`run`](Self::run).
    fn initialize(&mut self, ctx: &ActionCtx) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// The action body. Default behavior: cooperatively wait until the leaf is
    /// accomplished or the fallback timeout elapses, whichever comes first.
    async fn run(&mut self, ctx: &ActionCtx) -> anyhow::Result<()> {
        let _ = tokio::time::timeout(ctx.default_timeout, ctx.leaf.wait_accomplished()).await;
        Ok(())
    }

    /// Optional completion hook.
    fn on_complete(&mut self, _ctx: &ActionCtx) {}
}
