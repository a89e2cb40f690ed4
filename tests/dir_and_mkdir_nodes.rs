use serde_json::json;
use std::fs;
use tempfile::tempdir;

use fsops::fs_ops::{ListDirConfig, MkTempDirConfig, MkdirConfig};
use fsops::{MemoryStore, Node, Operand, Operation, Port, ScopedStore};

#[test]
fn dir_lists_sorted_and_filtered() {
    let td = tempdir().unwrap();
    for n in ["b.txt", "a.txt", "notes.md", "atxt", "c.txt.bak"] {
        fs::write(td.path().join(n), b"").unwrap();
    }
    let cfg = ListDirConfig::new(Operand::msg("dir"), "*.txt", Operand::msg("payload"));
    let node = Node::new("ls", "", Operation::ListDir(cfg)).unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let out = node.invoke(json!({"dir": td.path()}), &flow, &global);
    assert_eq!(out.route, Some(Port::Primary));
    assert_eq!(out.message["payload"], json!(["a.txt", "b.txt"]));
}

#[test]
fn dir_without_filter_lists_everything() {
    let td = tempdir().unwrap();
    fs::write(td.path().join("x"), b"").unwrap();
    fs::create_dir(td.path().join("y")).unwrap();
    let cfg = ListDirConfig::new(Operand::literal(td.path().to_string_lossy()), "", Operand::flow("entries"));
    let node = Node::new("ls", "", Operation::ListDir(cfg)).unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    node.invoke(json!({}), &flow, &global);
    assert_eq!(flow.get("entries"), Some(json!(["x", "y"])));
}

#[test]
fn dir_on_missing_directory_fails() {
    let td = tempdir().unwrap();
    let cfg = ListDirConfig::new(
        Operand::literal(td.path().join("nope").to_string_lossy()),
        "*",
        Operand::msg("payload"),
    );
    let node = Node::new("ls", "", Operation::ListDir(cfg)).unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());
    let out = node.invoke(json!({}), &flow, &global);
    assert_eq!(out.route, None);
    assert!(out.message.get("payload").is_none());
}

#[test]
fn mkdir_is_idempotent_and_reports_fullpath() {
    let td = tempdir().unwrap();
    let base = td.path().to_string_lossy().into_owned();
    let mut cfg = MkdirConfig::new(Operand::literal(&base), Operand::msg("name"));
    cfg.fullpath = Some(Operand::msg("created"));
    let node = Node::new("md", "", Operation::Mkdir(cfg)).unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    for _ in 0..2 {
        let out = node.invoke(json!({"name": "sub"}), &flow, &global);
        assert!(out.success(), "{:?}", out.error);
        assert_eq!(out.message["created"], json!(fsops::compose(&base, "sub")));
    }
    assert!(td.path().join("sub").is_dir());
}

#[test]
fn mkdir_without_parent_fails() {
    let td = tempdir().unwrap();
    let cfg = MkdirConfig::new(
        Operand::literal(td.path().join("missing").to_string_lossy()),
        Operand::literal("child"),
    );
    let node = Node::new("md", "", Operation::Mkdir(cfg)).unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());
    assert!(node.invoke(json!({}), &flow, &global).error.is_some());
}

#[test]
fn mktmpdir_creates_unique_directories() {
    let td = tempdir().unwrap();
    let cfg = MkTempDirConfig::new(
        Operand::literal(td.path().to_string_lossy()),
        Operand::literal("job-"),
        Operand::msg("workdir"),
    );
    let node = Node::new("tmp", "", Operation::MkTempDir(cfg)).unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let a = node.invoke(json!({}), &flow, &global).message["workdir"].as_str().unwrap().to_string();
    let b = node.invoke(json!({}), &flow, &global).message["workdir"].as_str().unwrap().to_string();
    assert_ne!(a, b);
    for p in [&a, &b] {
        let path = std::path::Path::new(p);
        assert!(path.is_dir());
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("job-"), "{name}");
        assert_eq!(name.len(), "job-".len() + 6);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&a).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }
}
