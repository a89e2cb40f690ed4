//! Gzip read node: text and buffer payloads, failure keeps forwarding.

use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::json;
use std::fs;
use std::io::Write;
use tempfile::tempdir;

use fsops::fs_ops::DecompressConfig;
use fsops::{MemoryStore, Node, Operation, Port};

fn gzip(path: &std::path::Path, data: &[u8]) {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    fs::write(path, enc.finish().unwrap()).unwrap();
}

#[test]
fn text_payload_from_message_filename() {
    let td = tempdir().unwrap();
    let gz = td.path().join("hello.txt.gz");
    gzip(&gz, "héllo\nworld".as_bytes());
    let node = Node::new("z", "", Operation::DecompressRead(DecompressConfig::default())).unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let out = node.invoke(json!({"filename": gz}), &flow, &global);
    assert!(out.success(), "{:?}", out.error);
    assert_eq!(out.message["payload"], json!("héllo\nworld"));
}

#[test]
fn buffer_payload_when_not_text() {
    let td = tempdir().unwrap();
    let gz = td.path().join("bytes.gz");
    gzip(&gz, &[0, 159, 146, 150]);

    let mut cfg = DecompressConfig::with_filename(gz.to_string_lossy());
    cfg.output_text = false;
    let node = Node::new("z", "", Operation::DecompressRead(cfg)).unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let out = node.invoke(json!({"filename": "ignored"}), &flow, &global);
    assert_eq!(out.message["payload"], json!({"type": "Buffer", "data": [0, 159, 146, 150]}));

    // invalid UTF-8 also falls back to a buffer in text mode
    let node = Node::new("z", "", Operation::DecompressRead(DecompressConfig::with_filename(gz.to_string_lossy())))
        .unwrap();
    let out = node.invoke(json!({}), &flow, &global);
    assert_eq!(out.message["payload"]["type"], json!("Buffer"));
}

#[test]
fn corrupt_input_clears_payload_and_still_forwards() {
    let td = tempdir().unwrap();
    let bad = td.path().join("bad.gz");
    fs::write(&bad, b"definitely not gzip").unwrap();
    let node = Node::new("z", "unzip", Operation::DecompressRead(DecompressConfig::default())).unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let out = node.invoke(json!({"filename": bad, "payload": "stale"}), &flow, &global);
    assert_eq!(out.route, Some(Port::Primary));
    assert!(out.error.is_some());
    assert!(out.message.get("payload").is_none());
    assert_eq!(out.message["error"]["source"]["type"], json!("zread"));
}

#[test]
fn missing_file_clears_payload() {
    let td = tempdir().unwrap();
    let node = Node::new("z", "", Operation::DecompressRead(DecompressConfig::default())).unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let out = node.invoke(
        json!({"filename": td.path().join("none.gz"), "payload": [1, 2]}),
        &flow,
        &global,
    );
    assert_eq!(out.route, Some(Port::Primary));
    assert!(out.message.get("payload").is_none());
}
