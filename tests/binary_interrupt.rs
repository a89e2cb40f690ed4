//! Ctrl-C while the binary waits on an idle stdin.
#![cfg(unix)]

use std::fs;
use std::process::{Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn wait_for_log(path: &std::path::Path, needle: &str, limit: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < limit {
        if fs::read_to_string(path).map(|s| s.contains(needle)).unwrap_or(false) {
            return true;
        }
        sleep(Duration::from_millis(50));
    }
    false
}

#[test]
fn interrupt_on_idle_stdin_exits_and_flushes_log() {
    let td = tempdir().unwrap();
    let root = td.path().canonicalize().unwrap();
    let pipeline = root.join("pipeline.xml");
    fs::write(
        &pipeline,
        format!(
            r#"<pipeline><node id="m" type="mkdir">
                 <operand role="path" kind="str">{}</operand>
                 <operand role="dirname" kind="str">made</operand>
               </node></pipeline>"#,
            root.display()
        ),
    )
    .unwrap();
    let log = root.join("logs").join("fsops.log");

    // stdin stays open and silent for the whole test
    let mut child = Command::new(assert_cmd::cargo::cargo_bin!("fsops"))
        .arg("--pipeline")
        .arg(&pipeline)
        .arg("--log-file")
        .arg(&log)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn binary");

    assert!(
        wait_for_log(&log, "Loaded pipeline", Duration::from_secs(20)),
        "binary never reported a loaded pipeline"
    );
    let rc = unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGINT) };
    assert_eq!(rc, 0);

    let start = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if start.elapsed() > Duration::from_secs(20) {
            let _ = child.kill();
            panic!("binary kept waiting on stdin after SIGINT");
        }
        sleep(Duration::from_millis(50));
    };

    assert!(status.success(), "status: {status:?}");
    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("Shutdown requested"), "{text}");
    assert!(text.contains("Done"), "{text}");
}
