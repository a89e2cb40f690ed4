//! Gunzip a file into the message payload.
//!
//! The decoded stream goes through a scoped temp file (removed when dropped)
//! before being read back in full. Failure handling (payload cleared, error
//! attached, message still forwarded) is done by the node.

use flate2::read::GzDecoder;
use serde_json::{Value, json};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::PathBuf;
use tracing::debug;

use crate::classify::OpKind;
use crate::errors::OpError;
use crate::operand::Operand;
use crate::resolve::{ResolutionContext, assign, resolve};

/// Message field consulted when no filename is configured.
pub const FILENAME_FIELD: &str = "filename";
pub const PAYLOAD_FIELD: &str = "payload";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompressConfig {
    /// Static filename; when empty the message's `filename` field is used.
    pub filename: Option<String>,
    /// Decode the content as UTF-8 text (falls back to a buffer if invalid).
    pub output_text: bool,
}

impl Default for DecompressConfig {
    fn default() -> Self {
        Self {
            filename: None,
            output_text: true,
        }
    }
}

impl DecompressConfig {
    pub fn with_filename(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Self::default()
        }
    }
}

pub fn run_decompress_read(cfg: &DecompressConfig, ctx: &mut ResolutionContext<'_>) -> Result<(), OpError> {
    let filename = match cfg.filename.as_deref().filter(|f| !f.is_empty()) {
        Some(f) => f.to_string(),
        None => resolve(&Operand::msg(FILENAME_FIELD), ctx)?,
    };
    let path = PathBuf::from(filename);

    let src = File::open(&path).map_err(|e| OpError::io(OpKind::DecompressRead, "open", &path, e))?;
    let mut decoder = GzDecoder::new(BufReader::new(src));

    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| OpError::io(OpKind::DecompressRead, "create temporary file", std::env::temp_dir(), e))?;
    let tmp_path = tmp.path().to_path_buf();
    let written = io::copy(&mut decoder, tmp.as_file_mut()).map_err(|source| OpError::Decompress {
        path: path.clone(),
        source,
    })?;

    let mut data = Vec::with_capacity(usize::try_from(written).unwrap_or(0));
    let file = tmp.as_file_mut();
    file.seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_end(&mut data))
        .map_err(|e| OpError::io(OpKind::DecompressRead, "read temporary file", &tmp_path, e))?;
    tmp.close()
        .map_err(|e| OpError::io(OpKind::DecompressRead, "remove temporary file", &tmp_path, e))?;

    debug!(path = %path.display(), bytes = data.len(), "decompressed");
    let payload = if cfg.output_text {
        match String::from_utf8(data) {
            Ok(text) => Value::String(text),
            Err(e) => buffer_value(e.into_bytes()),
        }
    } else {
        buffer_value(data)
    };
    assign(&Operand::msg(PAYLOAD_FIELD), ctx, payload)
}

/// Binary payloads use the `{type: "Buffer", data: [...]}` JSON shape.
fn buffer_value(bytes: Vec<u8>) -> Value {
    json!({ "type": "Buffer", "data": bytes })
}
