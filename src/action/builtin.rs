//! Built-in actions.
//!
//! Two behaviors ship with the engine: [`AwaitSignal`], which waits for an
//! in-world completion signal, and [`TimedPerformance`], which acts out a
//! behavior for a fixed duration. Both honor the role-branching rule and show
//! how concrete actions are expected to use the [`ActionCtx`] collaborators.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::action::action::{Action, ActionCtx};
use crate::sync::roles::ActorBinding;

/// Waits until the bound leaf's real-world condition is satisfied.
///
/// * `Local` binding: subscribes to the bus topic named by the `signal`
///   parameter (default `task_complete`) and, on a matching in-world event,
///   broadcasts the completion through the bridge so every participant
///   converges on the same flag.
/// * `Remote` binding: waits only; the flag arrives over the bridge.
/// * `Autonomous`/`System` binding: self-declares immediately.
#[derive(Default)]
pub struct AwaitSignal {
    binding: Option<ActorBinding>,
}

#[async_trait]
impl Action for AwaitSignal {
    fn initialize(&mut self, ctx: &ActionCtx) -> anyhow::Result<()> {
        self.binding = Some(ctx.binding());
        Ok(())
    }

    async fn run(&mut self, ctx: &ActionCtx) -> anyhow::Result<()> {
        let binding = self
            .binding
            .clone()
            .context("initialize was not called before run")?;
        match binding {
            ActorBinding::Remote { .. } => ctx.leaf.wait_accomplished().await,
            ActorBinding::Autonomous { .. } | ActorBinding::System => {
                ctx.leaf.mark_accomplished();
            }
            ActorBinding::Local { participant } => {
                let topic = ctx.leaf.param("signal").unwrap_or("task_complete");
                let mut events = ctx.bus.subscribe(topic);
                loop {
                    tokio::select! {
                        _ = ctx.leaf.wait_accomplished() => break,
                        event = events.recv() => match event {
                            Ok(event) => {
                                let target = event.payload.get("node_id").and_then(Value::as_u64);
                                if target == Some(ctx.leaf.id.0) {
                                    debug!(node = %ctx.leaf.id, topic, "local completion observed");
                                    ctx.bridge.broadcast_accomplished(ctx.leaf.id, &participant);
                                }
                            }
                            Err(async_broadcast::RecvError::Overflowed(_)) => continue,
                            Err(async_broadcast::RecvError::Closed) => {
                                ctx.leaf.wait_accomplished().await;
                                break;
                            }
                        },
                    }
                }
            }
        }
        Ok(())
    }
}

/// Acts out a behavior for a fixed duration, then declares it done.
///
/// Duration comes from the `duration_ms` parameter (default 500 ms). A `Local`
/// binding marks the leaf directly and broadcasts so peers converge; an
/// `Autonomous`/`System` binding self-declares with no network round-trip,
/// relying on every participant running the same simulation; a `Remote`
/// binding never drives the behavior and waits for the notice instead.
pub struct TimedPerformance {
    binding: Option<ActorBinding>,
    duration: Duration,
}

impl Default for TimedPerformance {
    fn default() -> Self {
        Self {
            binding: None,
            duration: Duration::from_millis(500),
        }
    }
}

#[async_trait]
impl Action for TimedPerformance {
    fn initialize(&mut self, ctx: &ActionCtx) -> anyhow::Result<()> {
        self.binding = Some(ctx.binding());
        if let Some(raw) = ctx.leaf.param("duration_ms") {
            let ms: u64 = raw
                .parse()
                .with_context(|| format!("invalid duration_ms parameter: {raw}"))?;
            self.duration = Duration::from_millis(ms);
        }
        Ok(())
    }

    async fn run(&mut self, ctx: &ActionCtx) -> anyhow::Result<()> {
        let binding = self
            .binding
            .clone()
            .context("initialize was not called before run")?;
        match binding {
            ActorBinding::Remote { .. } => ctx.leaf.wait_accomplished().await,
            ActorBinding::Autonomous { .. } | ActorBinding::System => {
                tokio::time::sleep(self.duration).await;
                ctx.leaf.mark_accomplished();
            }
            ActorBinding::Local { participant } => {
                tokio::time::sleep(self.duration).await;
                ctx.bridge.broadcast_accomplished(ctx.leaf.id, &participant);
                // direct mark keeps the node live even without a wired bridge;
                // the loopback notice is absorbed by idempotence
                ctx.leaf.mark_accomplished();
            }
        }
        Ok(())
    }
}
