//! Nodes: one configured operation plus its identity.
//!
//! `invoke` runs the operation against one message and turns the result into
//! exactly one `OperationOutcome`:
//! - success: forwarded on the primary port;
//! - Access failure: error descriptor attached, forwarded on the error port;
//! - DecompressRead failure: payload removed, descriptor attached, forwarded
//!   on the primary port with the error kept in the outcome;
//! - any other failure: descriptor attached, message not forwarded.

use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, debug_span, error, warn};

use crate::classify::OpKind;
use crate::errors::OpError;
use crate::fs_ops::{
    self, AccessConfig, DecompressConfig, DeleteConfig, ListDirConfig, MkTempDirConfig, MkdirConfig, MoveBackend,
    MoveConfig, OsBackend, PAYLOAD_FIELD, QueryConfig,
};
use crate::operand::Operand;
use crate::resolve::ResolutionContext;
use crate::store::ScopedStore;

/// Where the current error descriptor lives on a message.
pub const ERROR_FIELD: &str = "error";
/// The previous descriptor is moved here (one level only) before overwriting.
pub const ERROR_BACKUP_FIELD: &str = "_error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    pub id: String,
    pub type_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Move(MoveConfig),
    Delete(DeleteConfig),
    Access(AccessConfig),
    Size(QueryConfig),
    Type(QueryConfig),
    ReadLink(QueryConfig),
    ListDir(ListDirConfig),
    Mkdir(MkdirConfig),
    MkTempDir(MkTempDirConfig),
    DecompressRead(DecompressConfig),
}

impl Operation {
    pub fn kind(&self) -> OpKind {
        match self {
            Operation::Move(c) if c.link => OpKind::Link,
            Operation::Move(_) => OpKind::Move,
            Operation::Delete(_) => OpKind::Delete,
            Operation::Access(_) => OpKind::Access,
            Operation::Size(_) => OpKind::Size,
            Operation::Type(_) => OpKind::Type,
            Operation::ReadLink(_) => OpKind::ReadLink,
            Operation::ListDir(_) => OpKind::ListDir,
            Operation::Mkdir(_) => OpKind::Mkdir,
            Operation::MkTempDir(_) => OpKind::MkTempDir,
            Operation::DecompressRead(_) => OpKind::DecompressRead,
        }
    }

    /// Node type name as used in pipeline files.
    pub fn type_name(&self) -> &'static str {
        match self {
            Operation::Move(_) => "move",
            Operation::Delete(_) => "delete",
            Operation::Access(_) => "access",
            Operation::Size(_) => "size",
            Operation::Type(_) => "type",
            Operation::ReadLink(_) => "link",
            Operation::ListDir(_) => "dir",
            Operation::Mkdir(_) => "mkdir",
            Operation::MkTempDir(_) => "mktmpdir",
            Operation::DecompressRead(_) => "zread",
        }
    }

    fn operands(&self) -> Vec<(&'static str, &Operand)> {
        match self {
            Operation::Move(c) => c.operands(),
            Operation::Delete(c) => c.operands(),
            Operation::Access(c) => c.operands(),
            Operation::Size(c) | Operation::Type(c) | Operation::ReadLink(c) => c.operands(),
            Operation::ListDir(c) => c.operands(),
            Operation::Mkdir(c) => c.operands(),
            Operation::MkTempDir(c) => c.operands(),
            Operation::DecompressRead(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    Primary,
    Error,
}

#[derive(Debug)]
pub struct OperationOutcome {
    /// The message after the operation (forwarded only if `route` is set).
    pub message: Value,
    pub route: Option<Port>,
    pub error: Option<OpError>,
    /// Whether the failure was raised as an error report (vs. a routing decision).
    pub reported: bool,
}

impl OperationOutcome {
    fn forward(message: Value) -> Self {
        Self {
            message,
            route: Some(Port::Primary),
            error: None,
            reported: false,
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    pub fn forwarded(&self) -> Option<&Value> {
        self.route.map(|_| &self.message)
    }
}

#[derive(Debug)]
pub struct Node {
    identity: NodeIdentity,
    operation: Operation,
    backend: Arc<dyn MoveBackend>,
}

impl Node {
    /// Validates every operand's selector; configuration is immutable afterwards.
    pub fn new(id: impl Into<String>, name: impl Into<String>, operation: Operation) -> Result<Self, OpError> {
        let id = id.into();
        for (role, operand) in operation.operands() {
            operand.validate().map_err(|e| {
                let reason = match e {
                    OpError::InvalidConfig(r) => r,
                    other => other.to_string(),
                };
                OpError::InvalidConfig(format!("node '{id}': operand '{role}': {reason}"))
            })?;
        }
        Ok(Self {
            identity: NodeIdentity {
                id,
                type_name: operation.type_name().to_string(),
                name: name.into(),
            },
            operation,
            backend: Arc::new(OsBackend),
        })
    }

    /// Replace the rename/unlink/symlink backend used by Move.
    pub fn with_backend(mut self, backend: Arc<dyn MoveBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn invoke(&self, msg: Value, flow: &dyn ScopedStore, global: &dyn ScopedStore) -> OperationOutcome {
        let span = debug_span!("node", id = %self.identity.id, op = self.operation.kind().as_str());
        let _enter = span.enter();

        let mut msg = msg;
        let result = {
            let mut ctx = ResolutionContext::new(&mut msg, flow, global);
            self.dispatch(&mut ctx)
        };

        let err = match result {
            Ok(()) => {
                debug!("forwarding message");
                return OperationOutcome::forward(msg);
            }
            Err(err) => err,
        };

        match &self.operation {
            Operation::Access(_) => {
                debug!(error = %err, "access check failed; routing to error port");
                attach_error(&mut msg, &self.identity, &err);
                OperationOutcome {
                    message: msg,
                    route: Some(Port::Error),
                    error: Some(err),
                    reported: false,
                }
            }
            Operation::DecompressRead(_) => {
                error!(code = err.code(), error = %err, "decompress failed; forwarding with error");
                if let Some(obj) = msg.as_object_mut() {
                    obj.remove(PAYLOAD_FIELD);
                }
                attach_error(&mut msg, &self.identity, &err);
                OperationOutcome {
                    message: msg,
                    route: Some(Port::Primary),
                    error: Some(err),
                    reported: true,
                }
            }
            op => {
                let reported = match op {
                    Operation::Move(c) => c.report_errors,
                    _ => true,
                };
                if reported {
                    error!(code = err.code(), error = %err, "operation failed");
                } else {
                    warn!(code = err.code(), error = %err, "operation failed (not reported)");
                }
                attach_error(&mut msg, &self.identity, &err);
                OperationOutcome {
                    message: msg,
                    route: None,
                    error: Some(err),
                    reported,
                }
            }
        }
    }

    fn dispatch(&self, ctx: &mut ResolutionContext<'_>) -> Result<(), OpError> {
        match &self.operation {
            Operation::Move(c) => fs_ops::run_move(c, ctx, self.backend.as_ref()),
            Operation::Delete(c) => fs_ops::run_delete(c, ctx),
            Operation::Access(c) => fs_ops::run_access(c, ctx),
            Operation::Size(c) => fs_ops::run_size(c, ctx),
            Operation::Type(c) => fs_ops::run_type(c, ctx),
            Operation::ReadLink(c) => fs_ops::run_readlink(c, ctx),
            Operation::ListDir(c) => fs_ops::run_list_dir(c, ctx),
            Operation::Mkdir(c) => fs_ops::run_mkdir(c, ctx),
            Operation::MkTempDir(c) => fs_ops::run_mktempdir(c, ctx),
            Operation::DecompressRead(c) => fs_ops::run_decompress_read(c, ctx),
        }
    }
}

/// Set `msg.error = {message, source: {id, type, name}}`, moving any existing
/// `error` to `_error` first. Non-object messages are wrapped as `{payload: msg}`.
pub fn attach_error(msg: &mut Value, identity: &NodeIdentity, err: &OpError) {
    if !msg.is_object() {
        let payload = msg.take();
        let mut wrapped = Map::new();
        wrapped.insert(PAYLOAD_FIELD.to_string(), payload);
        *msg = Value::Object(wrapped);
    }
    let Some(obj) = msg.as_object_mut() else {
        return;
    };
    if let Some(previous) = obj.remove(ERROR_FIELD) {
        obj.insert(ERROR_BACKUP_FIELD.to_string(), previous);
    }
    obj.insert(
        ERROR_FIELD.to_string(),
        json!({
            "message": err.to_string(),
            "source": {
                "id": identity.id,
                "type": identity.type_name,
                "name": identity.name,
            },
        }),
    );
}
