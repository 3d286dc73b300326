//! Cooperative tree executor.
//!
//! Drives one activity tree to completion on the tokio runtime. Sequence
//! children are awaited strictly in order; parallel children are launched as
//! independent tasks and joined by polling their execution flags on a tick
//! interval. Nothing here blocks a thread; every wait is a yield point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use crate::action::action::ActionCtx;
use crate::action::registry::ActionRegistry;
use crate::core::errors::{ChoreoError, Result};
use crate::sync::bridge::CompletionBridge;
use crate::sync::bus::EventBus;
use crate::sync::roles::RoleResolver;
use crate::tree::node::{ActivityNode, CompositeKind, CompositeNode, LeafNode};
use crate::tree::tree::ActivityTree;

/// Configuration for tree execution behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Poll interval for join conditions, in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Fallback timeout for the default action body, in milliseconds
    #[serde(default = "default_action_timeout_ms")]
    pub default_action_timeout_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    10
}

fn default_action_timeout_ms() -> u64 {
    1000
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            default_action_timeout_ms: default_action_timeout_ms(),
        }
    }
}

impl ExecutorConfig {
    /// Validates configuration values
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(ChoreoError::configuration(
                "tick_interval_ms must be greater than 0",
            ));
        }
        if self.default_action_timeout_ms == 0 {
            return Err(ChoreoError::configuration(
                "default_action_timeout_ms must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Outcome of one activity run.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// True when the whole tree reached completion.
    pub completed: bool,
    /// True when the run ended because [`TreeExecutor::stop`] was requested.
    pub stopped: bool,
    pub elapsed: Duration,
}

/// Everything a node needs during execution. Cheap to clone into spawned
/// branch tasks.
#[derive(Clone)]
pub(crate) struct ExecCtx {
    config: ExecutorConfig,
    registry: ActionRegistry,
    roles: Arc<dyn RoleResolver>,
    bridge: Arc<dyn CompletionBridge>,
    bus: EventBus,
    stopped: Arc<AtomicBool>,
}

impl ExecCtx {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn tick(&self) -> Duration {
        Duration::from_millis(self.config.tick_interval_ms)
    }

    fn default_action_timeout(&self) -> Duration {
        Duration::from_millis(self.config.default_action_timeout_ms)
    }
}

/// The cooperative runtime that drives activity trees.
pub struct TreeExecutor {
    config: ExecutorConfig,
    registry: ActionRegistry,
    roles: Arc<dyn RoleResolver>,
    bridge: Arc<dyn CompletionBridge>,
    bus: EventBus,
    stopped: Arc<AtomicBool>,
}

impl TreeExecutor {
    pub fn new(
        config: Option<ExecutorConfig>,
        registry: ActionRegistry,
        roles: Arc<dyn RoleResolver>,
        bridge: Arc<dyn CompletionBridge>,
    ) -> Result<Self> {
        let config = config.unwrap_or_default();
        config.validate()?;
        Ok(Self {
            config,
            registry,
            roles,
            bridge,
            bus: EventBus::new(),
            stopped: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// The local event bus shared with actions.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Request cooperative cancellation. Observed at node boundaries and join
    /// polls; an action mid-await finishes its current wait and is not torn
    /// down by the engine.
    pub fn stop(&self) {
        info!("stop requested");
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Drive `tree` to completion. Suspends the caller until the whole tree
    /// completes or a stop request takes effect.
    pub async fn run(&self, tree: Arc<ActivityTree>) -> Result<ExecutionReport> {
        self.stopped.store(false, Ordering::SeqCst);
        let start = Instant::now();
        info!(tree = %tree.name, leaves = tree.leaf_count(), "starting activity run");

        let ctx = ExecCtx {
            config: self.config.clone(),
            registry: self.registry.clone(),
            roles: Arc::clone(&self.roles),
            bridge: Arc::clone(&self.bridge),
            bus: self.bus.clone(),
            stopped: Arc::clone(&self.stopped),
        };
        exec_node(tree.root(), ctx).await;

        let stopped = self.is_stopped();
        let elapsed = start.elapsed();
        info!(tree = %tree.name, ?elapsed, stopped, "activity run finished");
        Ok(ExecutionReport {
            completed: !stopped,
            stopped,
            elapsed,
        })
    }
}

fn exec_node(node: Arc<ActivityNode>, ctx: ExecCtx) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        if ctx.is_stopped() {
            node.set_executing(false);
            return;
        }
        match &*node {
            ActivityNode::Composite(composite) => exec_composite(composite, &ctx).await,
            ActivityNode::Leaf(leaf) => exec_leaf(Arc::clone(leaf), &ctx).await,
        }
    })
}

async fn exec_composite(composite: &CompositeNode, ctx: &ExecCtx) {
    composite.set_executing(true);
    match composite.kind {
        CompositeKind::Sequence => {
            // strict list order; child i+1 never starts before child i is done
            for child in &composite.children {
                if ctx.is_stopped() {
                    break;
                }
                exec_node(Arc::clone(child), ctx.clone()).await;
            }
        }
        CompositeKind::Parallel => {
            // join bookkeeping: every child is marked executing before any of
            // them is launched, so the barrier below cannot observe a child
            // that has not started yet as already finished
            for child in &composite.children {
                child.set_executing(true);
            }
            for child in &composite.children {
                let child = Arc::clone(child);
                let branch_ctx = ctx.clone();
                tokio::spawn(async move {
                    exec_node(Arc::clone(&child), branch_ctx).await;
                    child.set_executing(false);
                });
            }
            // barrier: done only when no child is still executing. A stalled
            // child stalls this node indefinitely unless a stop is requested.
            let tick = ctx.tick();
            while composite.children.iter().any(|c| c.is_executing()) {
                if ctx.is_stopped() {
                    break;
                }
                sleep(tick).await;
            }
        }
        CompositeKind::Selector => {
            warn!("selector composite has no execution semantics; treating node as complete");
        }
    }
    composite.set_executing(false);
}

async fn exec_leaf(leaf: Arc<LeafNode>, ctx: &ExecCtx) {
    leaf.set_executing(true);
    debug!(node = %leaf.id, name = %leaf.name, action = %leaf.action, "leaf starting");

    // existence check happens up front; instantiation waits until after the
    // scripted delay
    let Some(factory) = ctx.registry.get(&leaf.action) else {
        warn!(
            node = %leaf.id,
            action = %leaf.action,
            "unknown action identifier; node skipped"
        );
        leaf.set_executing(false);
        return;
    };

    if leaf.delay_ms > 0 {
        sleep(Duration::from_millis(leaf.delay_ms)).await;
    }

    let mut action = factory.create();
    let action_ctx = ActionCtx {
        leaf: Arc::clone(&leaf),
        roles: Arc::clone(&ctx.roles),
        bridge: Arc::clone(&ctx.bridge),
        bus: ctx.bus.clone(),
        default_timeout: ctx.default_action_timeout(),
    };

    if let Err(err) = action.initialize(&action_ctx) {
        error!(node = %leaf.id, action = %leaf.action, error = %err, "action initialization failed");
        leaf.set_executing(false);
        return;
    }
    if let Err(err) = action.run(&action_ctx).await {
        // an action failure never faults the tree; the node is treated as done
        error!(node = %leaf.id, action = %leaf.action, error = %err, "action body failed");
    }
    action.on_complete(&action_ctx);

    leaf.set_executing(false);
    debug!(node = %leaf.id, accomplished = leaf.is_accomplished(), "leaf finished");
}
