//! Access node routing: exactly one port per invocation, error backup one level deep.

use serde_json::json;
use std::fs;
use tempfile::tempdir;

use fsops::fs_ops::AccessConfig;
use fsops::{MemoryStore, Node, Operand, Operation, Port};

fn access_node(dir: &std::path::Path, read: bool, write: bool) -> Node {
    let cfg = AccessConfig::new(Operand::literal(dir.to_string_lossy()), Operand::msg("filename"), read, write);
    Node::new("acc", "probe", Operation::Access(cfg)).unwrap()
}

#[test]
fn existing_file_goes_to_primary_port() {
    let td = tempdir().unwrap();
    fs::write(td.path().join("ok"), b"x").unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let out = access_node(td.path(), true, true).invoke(json!({"filename": "ok"}), &flow, &global);
    assert_eq!(out.route, Some(Port::Primary));
    assert!(out.message.get("error").is_none());
}

#[test]
fn failure_goes_to_error_port_with_backup() {
    let td = tempdir().unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());
    let node = access_node(td.path(), false, false);

    let msg = json!({"filename": "absent", "error": {"message": "earlier"}});
    let out = node.invoke(msg, &flow, &global);

    assert_eq!(out.route, Some(Port::Error));
    assert!(!out.reported);
    assert_eq!(out.message["_error"], json!({"message": "earlier"}));
    assert_eq!(out.message["error"]["source"], json!({"id": "acc", "type": "access", "name": "probe"}));

    // A second failure overwrites the backup with the previous descriptor.
    let first = out.message["error"].clone();
    let out = node.invoke(out.message, &flow, &global);
    assert_eq!(out.message["_error"], first);
}

#[cfg(unix)]
#[test]
fn unreadable_file_fails_read_probe() {
    use std::os::unix::fs::PermissionsExt;

    // root bypasses permission bits
    unsafe {
        if libc::geteuid() == 0 {
            eprintln!("skipping: running as root");
            return;
        }
    }

    let td = tempdir().unwrap();
    let locked = td.path().join("locked");
    fs::write(&locked, b"secret").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o200)).unwrap();
    let (flow, global) = (MemoryStore::new(), MemoryStore::new());

    let out = access_node(td.path(), true, false).invoke(json!({"filename": "locked"}), &flow, &global);
    assert_eq!(out.route, Some(Port::Error));
    let text = out.message["error"]["message"].as_str().unwrap().to_ascii_lowercase();
    assert!(text.contains("permission"), "{text}");

    // write-only probe passes
    let out = access_node(td.path(), false, true).invoke(json!({"filename": "locked"}), &flow, &global);
    assert_eq!(out.route, Some(Port::Primary));

    let _ = fs::set_permissions(&locked, fs::Permissions::from_mode(0o600));
}
