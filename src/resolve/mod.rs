//! Operand resolution against the in-flight message and the scoped stores,
//! plus the symmetric write-back used for node outputs.

mod msg_path;

use serde_json::Value;
use tracing::trace;

use crate::errors::OpError;
use crate::operand::{Operand, OperandKind};
use crate::store::ScopedStore;

pub(crate) use msg_path::MessagePath;

/// Everything an operand can be resolved against for one invocation.
pub struct ResolutionContext<'a> {
    pub msg: &'a mut Value,
    pub flow: &'a dyn ScopedStore,
    pub global: &'a dyn ScopedStore,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(msg: &'a mut Value, flow: &'a dyn ScopedStore, global: &'a dyn ScopedStore) -> Self {
        Self { msg, flow, global }
    }
}

/// A name operand resolved once as either a single value or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Scalar(String),
    List(Vec<String>),
}

impl Resolved {
    pub fn is_list(&self) -> bool {
        matches!(self, Resolved::List(_))
    }
}

/// Resolve to a string. Non-string values are coerced; arrays are comma-joined.
pub fn resolve(operand: &Operand, ctx: &ResolutionContext<'_>) -> Result<String, OpError> {
    if operand.kind() == OperandKind::Literal {
        return Ok(operand.selector().to_string());
    }
    let value = lookup(operand, ctx)?;
    Ok(coerce_to_string(&value))
}

/// Like `resolve`, but an array value comes back as `Resolved::List`.
pub fn resolve_names(operand: &Operand, ctx: &ResolutionContext<'_>) -> Result<Resolved, OpError> {
    if operand.kind() == OperandKind::Literal {
        return Ok(Resolved::Scalar(operand.selector().to_string()));
    }
    match lookup(operand, ctx)? {
        Value::Array(items) => Ok(Resolved::List(items.iter().map(coerce_to_string).collect())),
        other => Ok(Resolved::Scalar(coerce_to_string(&other))),
    }
}

/// Write `value` to the operand's location. Literal operands are never targets.
pub fn assign(operand: &Operand, ctx: &mut ResolutionContext<'_>, value: Value) -> Result<(), OpError> {
    trace!(kind = %operand.kind(), selector = operand.selector(), "assign");
    match operand.kind() {
        OperandKind::Literal => Ok(()),
        OperandKind::MessageField => MessagePath::parse(operand.selector())?.set(&mut *ctx.msg, value),
        OperandKind::FlowScoped => {
            ctx.flow.set(operand.selector(), value);
            Ok(())
        }
        OperandKind::GlobalScoped => {
            ctx.global.set(operand.selector(), value);
            Ok(())
        }
    }
}

fn lookup(operand: &Operand, ctx: &ResolutionContext<'_>) -> Result<Value, OpError> {
    let found = match operand.kind() {
        OperandKind::Literal => Some(Value::String(operand.selector().to_string())),
        OperandKind::MessageField => MessagePath::parse(operand.selector())?.get(&*ctx.msg).cloned(),
        OperandKind::FlowScoped => ctx.flow.get(operand.selector()),
        OperandKind::GlobalScoped => ctx.global.get(operand.selector()),
    };
    trace!(kind = %operand.kind(), selector = operand.selector(), found = found.is_some(), "lookup");
    match found {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(OpError::MissingField {
            kind: operand.kind(),
            selector: operand.selector().to_string(),
        }),
    }
}

pub(crate) fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(coerce_to_string).collect::<Vec<_>>().join(","),
        Value::Object(_) | Value::Bool(_) | Value::Number(_) => value.to_string(),
    }
}
