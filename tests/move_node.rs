//! Move node: same-device rename, simulated device-boundary fallback,
//! link mode and failure routing.

use serde_json::json;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

use fsops::fs_ops::{MoveBackend, MoveConfig};
use fsops::{MemoryStore, Node, Operand, Operation, Port};

/// rename always fails as if source and destination were on different volumes.
#[derive(Debug)]
struct CrossDevice;

impl MoveBackend for CrossDevice {
    fn rename(&self, _src: &Path, _dest: &Path) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::CrossesDevices))
    }
}

/// Cross-device rename, and the source cannot be removed afterwards.
#[derive(Debug)]
struct CrossDeviceStuck;

impl MoveBackend for CrossDeviceStuck {
    fn rename(&self, _src: &Path, _dest: &Path) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::CrossesDevices))
    }

    fn remove_file(&self, _path: &Path) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::ResourceBusy))
    }
}

fn move_node(src_dir: &Path, dest_dir: &Path) -> Node {
    let cfg = MoveConfig::new(
        Operand::literal(src_dir.to_string_lossy()),
        Operand::msg("filename"),
        Operand::literal(dest_dir.to_string_lossy()),
        Operand::msg("filename"),
    );
    Node::new("mv1", "archive", Operation::Move(cfg)).unwrap()
}

fn dirs_with_file(name: &str, body: &[u8]) -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
    let td = tempdir().unwrap();
    let src = td.path().join("in");
    let dest = td.path().join("out");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dest).unwrap();
    fs::write(src.join(name), body).unwrap();
    (td, src, dest)
}

#[test]
fn same_device_rename_forwards_unchanged_message() {
    let (_td, src, dest) = dirs_with_file("a.txt", b"hello");
    let node = move_node(&src, &dest);
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let msg = json!({"filename": "a.txt", "payload": 1});
    let out = node.invoke(msg.clone(), &flow, &global);

    assert!(out.success());
    assert_eq!(out.route, Some(Port::Primary));
    assert_eq!(out.message, msg);
    assert!(!src.join("a.txt").exists());
    assert_eq!(fs::read(dest.join("a.txt")).unwrap(), b"hello");
}

#[test]
fn device_boundary_falls_back_to_copy_and_delete() {
    let (_td, src, dest) = dirs_with_file("big.bin", &[7u8; 4096]);
    let node = move_node(&src, &dest).with_backend(Arc::new(CrossDevice));
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let out = node.invoke(json!({"filename": "big.bin"}), &flow, &global);

    assert!(out.success(), "unexpected error: {:?}", out.error);
    assert!(!src.join("big.bin").exists());
    assert_eq!(fs::read(dest.join("big.bin")).unwrap(), vec![7u8; 4096]);
    // no temp files left beside the destination
    let leftovers: Vec<_> = fs::read_dir(&dest).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
}

#[test]
fn source_not_removed_is_reported_with_both_copies_left() {
    let (_td, src, dest) = dirs_with_file("dup.txt", b"x");
    let node = move_node(&src, &dest).with_backend(Arc::new(CrossDeviceStuck));
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let out = node.invoke(json!({"filename": "dup.txt"}), &flow, &global);

    let err = out.error.as_ref().expect("failure expected");
    assert_eq!(err.code(), "source_not_removed");
    assert_eq!(out.route, None, "failed move must not be forwarded");
    assert!(out.reported);
    assert!(src.join("dup.txt").exists());
    assert!(dest.join("dup.txt").exists());
    assert_eq!(out.message["error"]["source"]["id"], json!("mv1"));
    assert_eq!(out.message["error"]["source"]["type"], json!("move"));
}

#[test]
fn missing_source_is_fatal_and_dropped() {
    let (_td, src, dest) = dirs_with_file("real.txt", b"x");
    let node = move_node(&src, &dest);
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let out = node.invoke(json!({"filename": "ghost.txt"}), &flow, &global);
    assert_eq!(out.route, None);
    let msg = out.message["error"]["message"].as_str().unwrap();
    assert!(msg.contains("ghost.txt"), "{msg}");
}

#[test]
fn missing_operand_field_fails_without_touching_files() {
    let (_td, src, dest) = dirs_with_file("a.txt", b"x");
    let node = move_node(&src, &dest);
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let out = node.invoke(json!({}), &flow, &global);
    assert_eq!(out.error.as_ref().map(|e| e.code()), Some("missing_field"));
    assert!(src.join("a.txt").exists());
}

#[test]
fn unreported_failures_stay_in_outcome() {
    let (_td, src, dest) = dirs_with_file("a.txt", b"x");
    let mut cfg = MoveConfig::new(
        Operand::literal(src.to_string_lossy()),
        Operand::literal("nope.txt"),
        Operand::literal(dest.to_string_lossy()),
        Operand::literal("nope.txt"),
    );
    cfg.report_errors = false;
    let node = Node::new("quiet", "", Operation::Move(cfg)).unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let out = node.invoke(json!({}), &flow, &global);
    assert!(out.error.is_some());
    assert!(!out.reported);
    assert_eq!(out.route, None);
}

#[cfg(unix)]
#[test]
fn link_mode_creates_symlink_and_keeps_source() {
    let (_td, src, dest) = dirs_with_file("a.txt", b"linked");
    let cfg = MoveConfig::new(
        Operand::literal(src.to_string_lossy()),
        Operand::flow("name"),
        Operand::literal(dest.to_string_lossy()),
        Operand::flow("name"),
    )
    .linking();
    let node = Node::new("ln", "", Operation::Move(cfg)).unwrap();
    let flow = MemoryStore::from_entries([("name", json!("a.txt"))]);
    let global = MemoryStore::new();

    let out = node.invoke(json!({}), &flow, &global);
    assert!(out.success(), "{:?}", out.error);
    let link = dest.join("a.txt");
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_link(&link).unwrap(), src.join("a.txt"));
    assert!(src.join("a.txt").exists());
}
