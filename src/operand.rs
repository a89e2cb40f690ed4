//! Operand configuration: where a node reads (or writes) one of its values.

use std::fmt;
use std::str::FromStr;

use crate::errors::OpError;
use crate::resolve::MessagePath;

/// Source of an operand's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// The selector itself is the value.
    Literal,
    /// A (dotted/indexed) path into the in-flight message.
    MessageField,
    /// A key in the flow-scoped store.
    FlowScoped,
    /// A key in the process-wide store.
    GlobalScoped,
}

impl OperandKind {
    /// Parse configuration names (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "str" | "literal" => Some(OperandKind::Literal),
            "msg" | "message" => Some(OperandKind::MessageField),
            "flow" => Some(OperandKind::FlowScoped),
            "global" => Some(OperandKind::GlobalScoped),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperandKind::Literal => "str",
            OperandKind::MessageField => "msg",
            OperandKind::FlowScoped => "flow",
            OperandKind::GlobalScoped => "global",
        }
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperandKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid operand kind: '{s}'"))
    }
}

/// A configured source + selector pair. For `Literal` the selector is the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    kind: OperandKind,
    selector: String,
}

impl Operand {
    /// Checked constructor: non-literal operands need a non-empty selector.
    pub fn new(kind: OperandKind, selector: impl Into<String>) -> Result<Self, OpError> {
        let operand = Self {
            kind,
            selector: selector.into(),
        };
        operand.validate()?;
        Ok(operand)
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: OperandKind::Literal,
            selector: value.into(),
        }
    }

    pub fn msg(path: impl Into<String>) -> Self {
        Self {
            kind: OperandKind::MessageField,
            selector: path.into(),
        }
    }

    pub fn flow(key: impl Into<String>) -> Self {
        Self {
            kind: OperandKind::FlowScoped,
            selector: key.into(),
        }
    }

    pub fn global(key: impl Into<String>) -> Self {
        Self {
            kind: OperandKind::GlobalScoped,
            selector: key.into(),
        }
    }

    pub fn kind(&self) -> OperandKind {
        self.kind
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Enforce the selector invariant. `Node::new` calls this for every operand.
    /// Message paths are parsed here so a bad one fails before any filesystem work.
    pub fn validate(&self) -> Result<(), OpError> {
        if self.kind != OperandKind::Literal && self.selector.trim().is_empty() {
            return Err(OpError::InvalidConfig(format!(
                "{} operand needs a non-empty selector",
                self.kind
            )));
        }
        if self.kind == OperandKind::MessageField {
            MessagePath::parse(&self.selector).map_err(|e| {
                OpError::InvalidConfig(format!("{} operand '{}': {e}", self.kind, self.selector))
            })?;
        }
        Ok(())
    }
}
