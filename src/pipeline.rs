//! A linear chain of nodes sharing one flow store and one global store.
//! Each forwarded message feeds the next node; a dropped message ends the run.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::node::{Node, OperationOutcome, Port};
use crate::store::{MemoryStore, ScopedStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    pub node_id: String,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    /// Last message produced (forwarded or not).
    pub message: Value,
    /// True when the message passed every node.
    pub completed: bool,
    pub failures: Vec<NodeFailure>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.completed && self.failures.is_empty()
    }
}

pub struct Pipeline {
    nodes: Vec<Node>,
    flow: Arc<dyn ScopedStore>,
    global: Arc<dyn ScopedStore>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("nodes", &self.nodes).finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Pipeline with fresh, empty in-memory stores.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self::with_stores(nodes, Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    pub fn with_stores(nodes: Vec<Node>, flow: Arc<dyn ScopedStore>, global: Arc<dyn ScopedStore>) -> Self {
        Self { nodes, flow, global }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn flow(&self) -> &dyn ScopedStore {
        self.flow.as_ref()
    }

    pub fn global(&self) -> &dyn ScopedStore {
        self.global.as_ref()
    }

    /// Push one message through every node. With `follow_errors`, messages
    /// routed to an error port continue down the chain.
    pub fn run(&self, msg: Value, follow_errors: bool) -> RunReport {
        let mut current = msg;
        let mut failures = Vec::new();

        for node in &self.nodes {
            let OperationOutcome {
                message,
                route,
                error,
                reported,
            } = node.invoke(current, self.flow.as_ref(), self.global.as_ref());

            if let Some(err) = error.as_ref().filter(|_| reported) {
                failures.push(NodeFailure {
                    node_id: node.identity().id.clone(),
                    code: err.code(),
                    message: err.to_string(),
                });
            }

            match route {
                Some(Port::Primary) => current = message,
                Some(Port::Error) if follow_errors => {
                    debug!(node = %node.identity().id, "following error port");
                    current = message;
                }
                Some(Port::Error) | None => {
                    info!(node = %node.identity().id, "message stopped");
                    return RunReport {
                        message,
                        completed: false,
                        failures,
                    };
                }
            }
        }

        RunReport {
            message: current,
            completed: true,
            failures,
        }
    }
}
