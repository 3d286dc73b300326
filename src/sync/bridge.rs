//! Completion synchronization bridge.
//!
//! Outbound half of the boundary contract: when an action observes a local
//! completion, it hands `(node_id, participant)` to the bridge, which is
//! responsible for broadcasting it to every participant. Each participant's
//! process then routes the notice back into its own tree through
//! [`crate::tree::ActivityTree::notify_accomplished`]. The concrete transport
//! lives outside this crate.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::sync::roles::ParticipantId;
use crate::tree::node::NodeId;
use crate::tree::tree::ActivityTree;

/// A "task complete" signal carried across the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionNotice {
    pub node_id: NodeId,
    pub participant: ParticipantId,
}

/// Outbound contract of the completion synchronization bridge.
pub trait CompletionBridge: Send + Sync {
    /// Broadcast a locally observed completion to all participants.
    fn broadcast_accomplished(&self, node_id: NodeId, participant: &ParticipantId);
}

/// Drops outbound notices. Suitable for trees with no networked roles.
#[derive(Debug, Default)]
pub struct NullBridge;

impl CompletionBridge for NullBridge {
    fn broadcast_accomplished(&self, node_id: NodeId, participant: &ParticipantId) {
        trace!(node = %node_id, %participant, "completion notice dropped (null bridge)");
    }
}

/// Single-process stand-in for the network broadcast: outbound notices are
/// queued and pumped back into a tree as inbound `notify_accomplished` calls.
/// Used in tests and single-machine rehearsals.
pub struct LoopbackBridge {
    tx: mpsc::UnboundedSender<CompletionNotice>,
}

impl LoopbackBridge {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<CompletionNotice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }

    /// Spawn a pump that routes queued notices into `tree`. The pump ends when
    /// the bridge is dropped.
    pub fn pump_into(
        mut rx: mpsc::UnboundedReceiver<CompletionNotice>,
        tree: Arc<ActivityTree>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(notice) = rx.recv().await {
                tree.notify_accomplished(notice.node_id);
            }
        })
    }
}

impl CompletionBridge for LoopbackBridge {
    fn broadcast_accomplished(&self, node_id: NodeId, participant: &ParticipantId) {
        let notice = CompletionNotice {
            node_id,
            participant: participant.clone(),
        };
        if self.tx.send(notice).is_err() {
            debug!(node = %node_id, "loopback receiver gone; completion notice dropped");
        }
    }
}
