//! Core library for `fsops`.
//!
//! Filesystem action nodes for message pipelines. Each node resolves its
//! operands against the current message and two scoped stores, performs one
//! filesystem action, writes results back into the message and decides how
//! the message is routed.
//!
//! Layout:
//! - `operand`, `store`, `resolve`: where operation inputs come from.
//! - `path`, `classify`: path composition and OS error dispositions.
//! - `fs_ops`: the actions themselves (move with cross-device fallback,
//!   delete, access, size, type, readlink, dir, mkdir, mktmpdir, zread).
//! - `node`, `pipeline`: per-message invocation, routing and chaining.
//! - `config`: host settings and the XML pipeline loader.

pub mod classify;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod node;
pub mod operand;
pub mod output;
pub mod path;
pub mod pipeline;
pub mod platform;
pub mod resolve;
pub mod shutdown;
pub mod store;

pub use classify::{Disposition, OpKind, classify};
pub use config::{
    Config, LogLevel, default_log_path, default_pipeline_path, load_pipeline, parse_pipeline,
    path_has_symlink_ancestor,
};
pub use errors::OpError;
pub use node::{Node, NodeIdentity, Operation, OperationOutcome, Port};
pub use operand::{Operand, OperandKind};
pub use path::compose;
pub use pipeline::{NodeFailure, Pipeline, RunReport};
pub use resolve::{ResolutionContext, Resolved};
pub use store::{MemoryStore, ScopedStore};
