//! Pipeline file support (quick_xml + serde).
//!
//! Layout:
//! ```xml
//! <pipeline>
//!   <flow><entry key="inbox">/data/in</entry></flow>
//!   <global><entry key="root">/data</entry></global>
//!   <node id="n1" type="move" name="archive">
//!     <operand role="source_path" kind="flow">inbox</operand>
//!     <option key="link">false</option>
//!   </node>
//! </pipeline>
//! ```
//! Unknown node types, unknown operand roles or options, and missing required
//! operands are load errors. Store entries are JSON when they parse as JSON,
//! otherwise plain strings.

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::fs_ops::{
    AccessConfig, DEFAULT_DIR_MODE, DEFAULT_TEMP_DIR_MODE, DecompressConfig, DeleteConfig, ListDirConfig,
    MkTempDirConfig, MkdirConfig, MoveConfig, QueryConfig, glob_to_regex,
};
use crate::node::{Node, Operation};
use crate::operand::{Operand, OperandKind};
use crate::pipeline::Pipeline;
use crate::store::MemoryStore;

#[derive(Debug, Deserialize)]
#[serde(rename = "pipeline", deny_unknown_fields)]
struct XmlPipeline {
    #[serde(default)]
    flow: Option<XmlStore>,
    #[serde(default)]
    global: Option<XmlStore>,
    #[serde(rename = "node", default)]
    nodes: Vec<XmlNode>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlStore {
    #[serde(rename = "entry", default)]
    entries: Vec<XmlEntry>,
}

#[derive(Debug, Deserialize)]
struct XmlEntry {
    #[serde(rename = "@key")]
    key: String,
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct XmlNode {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@type")]
    node_type: String,
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "operand", default)]
    operands: Vec<XmlOperand>,
    #[serde(rename = "option", default)]
    options: Vec<XmlOption>,
}

#[derive(Debug, Deserialize)]
struct XmlOperand {
    #[serde(rename = "@role")]
    role: String,
    #[serde(rename = "@kind", default = "default_operand_kind")]
    kind: String,
    #[serde(rename = "$text", default)]
    selector: String,
}

#[derive(Debug, Deserialize)]
struct XmlOption {
    #[serde(rename = "@key")]
    key: String,
    #[serde(rename = "$text", default)]
    value: String,
}

fn default_operand_kind() -> String {
    OperandKind::Literal.as_str().to_string()
}

/// Read and parse a pipeline file.
pub fn load_pipeline(path: &Path) -> Result<Pipeline> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read pipeline xml '{}'", path.display()))?;
    let pipeline = parse_pipeline(&contents).with_context(|| format!("load pipeline '{}'", path.display()))?;
    info!(path = %path.display(), nodes = pipeline.nodes().len(), "Loaded pipeline");
    Ok(pipeline)
}

/// Parse pipeline XML from a string.
pub fn parse_pipeline(xml: &str) -> Result<Pipeline> {
    let parsed: XmlPipeline = from_xml_str(xml).context("parse pipeline xml")?;

    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(parsed.nodes.len());
    for raw in parsed.nodes {
        if !seen.insert(raw.id.clone()) {
            bail!("duplicate node id '{}'", raw.id);
        }
        nodes.push(build_node(raw)?);
    }

    let flow = store_from_xml(parsed.flow.unwrap_or_default());
    let global = store_from_xml(parsed.global.unwrap_or_default());
    debug!(flow = flow.len(), global = global.len(), "Seeded stores");
    Ok(Pipeline::with_stores(nodes, Arc::new(flow), Arc::new(global)))
}

fn store_from_xml(store: XmlStore) -> MemoryStore {
    MemoryStore::from_entries(store.entries.into_iter().map(|e| {
        let value = serde_json::from_str::<Value>(e.value.trim()).unwrap_or(Value::String(e.value));
        (e.key, value)
    }))
}

fn build_node(raw: XmlNode) -> Result<Node> {
    let XmlNode {
        id,
        node_type,
        name,
        operands,
        options,
    } = raw;
    let mut parts = Parts::new(&id, &node_type, operands, options)?;

    let operation = match node_type.as_str() {
        "move" => {
            let mut cfg = MoveConfig::new(
                parts.take("source_path")?,
                parts.take("source_filename")?,
                parts.take("dest_path")?,
                parts.take("dest_filename")?,
            );
            cfg.link = parts.flag("link", false)?;
            cfg.report_errors = parts.flag("report_errors", true)?;
            Operation::Move(cfg)
        }
        "delete" => Operation::Delete(DeleteConfig::new(parts.take("path")?, parts.take("filename")?)),
        "access" => {
            let path = parts.take("path")?;
            let filename = parts.take("filename")?;
            let read = parts.flag("read", false)?;
            let write = parts.flag("write", false)?;
            Operation::Access(AccessConfig::new(path, filename, read, write))
        }
        "size" | "type" | "link" => {
            let cfg = QueryConfig::new(parts.take("path")?, parts.take("filename")?, parts.take("output")?);
            match node_type.as_str() {
                "size" => Operation::Size(cfg),
                "type" => Operation::Type(cfg),
                _ => Operation::ReadLink(cfg),
            }
        }
        "dir" => {
            let path = parts.take("path")?;
            let output = parts.take("output")?;
            let filter = parts.text("filter").unwrap_or_default();
            glob_to_regex(&filter).map_err(|e| anyhow!("node '{id}': {e}"))?;
            Operation::ListDir(ListDirConfig::new(path, filter, output))
        }
        "mkdir" => {
            let mut cfg = MkdirConfig::new(parts.take("path")?, parts.take("dirname")?);
            cfg.fullpath = parts.take_opt("fullpath");
            cfg.mode = parts.mode("mode", DEFAULT_DIR_MODE)?;
            Operation::Mkdir(cfg)
        }
        "mktmpdir" => {
            let mut cfg = MkTempDirConfig::new(parts.take("path")?, parts.take("prefix")?, parts.take("output")?);
            cfg.mode = parts.mode("mode", DEFAULT_TEMP_DIR_MODE)?;
            Operation::MkTempDir(cfg)
        }
        "zread" => Operation::DecompressRead(DecompressConfig {
            filename: parts.text("filename").filter(|f| !f.is_empty()),
            output_text: parts.flag("text", true)?,
        }),
        other => bail!("node '{id}': unknown node type '{other}'"),
    };
    parts.finish()?;

    Node::new(id, name, operation).map_err(anyhow::Error::from)
}

/// Operands and options of one node, consumed by role/key; leftovers are errors.
struct Parts<'a> {
    node_id: &'a str,
    node_type: &'a str,
    operands: BTreeMap<String, Operand>,
    options: BTreeMap<String, String>,
}

impl<'a> Parts<'a> {
    fn new(node_id: &'a str, node_type: &'a str, operands: Vec<XmlOperand>, options: Vec<XmlOption>) -> Result<Self> {
        let mut parsed = BTreeMap::new();
        for op in operands {
            let kind = OperandKind::parse(&op.kind)
                .ok_or_else(|| anyhow!("node '{node_id}': operand '{}' has unknown kind '{}'", op.role, op.kind))?;
            let selector = match kind {
                OperandKind::Literal => op.selector,
                _ => op.selector.trim().to_string(),
            };
            let operand =
                Operand::new(kind, selector).map_err(|e| anyhow!("node '{node_id}': operand '{}': {e}", op.role))?;
            if parsed.insert(op.role.clone(), operand).is_some() {
                bail!("node '{node_id}': operand '{}' given twice", op.role);
            }
        }
        let mut opts = BTreeMap::new();
        for o in options {
            if opts.insert(o.key.clone(), o.value.trim().to_string()).is_some() {
                bail!("node '{node_id}': option '{}' given twice", o.key);
            }
        }
        Ok(Self {
            node_id,
            node_type,
            operands: parsed,
            options: opts,
        })
    }

    fn take(&mut self, role: &str) -> Result<Operand> {
        self.operands.remove(role).ok_or_else(|| {
            anyhow!(
                "node '{}' ({}): missing required operand '{role}'",
                self.node_id,
                self.node_type
            )
        })
    }

    fn take_opt(&mut self, role: &str) -> Option<Operand> {
        self.operands.remove(role)
    }

    fn text(&mut self, key: &str) -> Option<String> {
        self.options.remove(key)
    }

    fn flag(&mut self, key: &str, default: bool) -> Result<bool> {
        match self.options.remove(key) {
            None => Ok(default),
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                _ => bail!("node '{}': option '{key}' expects true/false, got '{v}'", self.node_id),
            },
        }
    }

    /// Octal permission bits, with or without a leading `0o`/`0`.
    fn mode(&mut self, key: &str, default: u32) -> Result<u32> {
        match self.options.remove(key) {
            None => Ok(default),
            Some(v) if v.is_empty() => Ok(default),
            Some(v) => {
                let digits = v.strip_prefix("0o").unwrap_or(&v);
                let mode = u32::from_str_radix(digits, 8)
                    .map_err(|_| anyhow!("node '{}': option '{key}' is not an octal mode: '{v}'", self.node_id))?;
                if mode > 0o7777 {
                    bail!("node '{}': option '{key}' out of range: '{v}'", self.node_id);
                }
                Ok(mode)
            }
        }
    }

    fn finish(self) -> Result<()> {
        if let Some(role) = self.operands.keys().next() {
            bail!("node '{}' ({}): unknown operand role '{role}'", self.node_id, self.node_type);
        }
        if let Some(key) = self.options.keys().next() {
            bail!("node '{}' ({}): unknown option '{key}'", self.node_id, self.node_type);
        }
        Ok(())
    }
}
