//! Commands run against a scripted stand-in for `adb`
//!
//! Kept to a single test so no other test in this binary forks while the
//! script is being written.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::tempdir;

use flutter_probe::{execute, Cli, ProbeOutput};
use fprobe_core::Error;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/device")
        .join(name)
}

/// Write an executable script answering the adb calls fprobe makes from the
/// device fixtures, appending every invocation to `calls`.
fn write_fake_adb(dir: &Path, calls: &Path) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
echo "$@" >> "{calls}"
case "$*" in
  *"logcat -d"*) cat "{logcat}" ;;
  *"dumpsys window windows"*) cat "{windows}" ;;
  *"dumpsys activity activities"*) cat "{activities}" ;;
esac
exit 0
"#,
        calls = calls.display(),
        logcat = fixture("logcat_relaunch.txt").display(),
        windows = fixture("dumpsys_windows.txt").display(),
        activities = fixture("dumpsys_activities.txt").display(),
    );

    let path = dir.join("adb");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn cli(config_dir: &Path, adb: &Path, args: &[&str]) -> Cli {
    let mut argv = vec![
        "fprobe".to_string(),
        "--config-dir".to_string(),
        config_dir.display().to_string(),
        "--adb".to_string(),
        adb.display().to_string(),
        "--serial".to_string(),
        "emulator-5554".to_string(),
        "--timeout".to_string(),
        "5".to_string(),
        "--interval".to_string(),
        "10".to_string(),
    ];
    argv.extend(args.iter().map(|a| a.to_string()));
    Cli::try_parse_from(argv).unwrap()
}

#[tokio::test]
async fn test_commands_against_fake_adb() {
    let temp = tempdir().unwrap();
    let calls = temp.path().join("calls.log");
    let adb = write_fake_adb(temp.path(), &calls);

    // Discovery picks the announcement of the latest launch and forwards it
    match execute(cli(temp.path(), &adb, &["discover"])).await.unwrap() {
        ProbeOutput::Endpoint { address, port, .. } => {
            assert_eq!(address, "ws://127.0.0.1:41233/Qm9ZRk2pS1A=/ws");
            assert_eq!(port, 41233);
        }
        other => panic!("unexpected output: {other:?}"),
    }

    let log = std::fs::read_to_string(&calls).unwrap();
    let invocations: Vec<&str> = log.lines().collect();
    assert_eq!(
        invocations,
        vec![
            "-s emulator-5554 logcat -d",
            "-s emulator-5554 forward tcp:41233 tcp:41233",
        ]
    );

    // A popup resolves to the process of the activity it is attached to
    match execute(cli(temp.path(), &adb, &["window-process", "e5f6a7b"]))
        .await
        .unwrap()
    {
        ProbeOutput::WindowProcess { process, .. } => {
            assert_eq!(process.as_deref(), Some("com.example.shop"));
        }
        other => panic!("unexpected output: {other:?}"),
    }

    // System windows have no owning activity
    match execute(cli(temp.path(), &adb, &["window-process", "InputMethod"]))
        .await
        .unwrap()
    {
        ProbeOutput::WindowProcess { process, .. } => assert_eq!(process, None),
        other => panic!("unexpected output: {other:?}"),
    }

    let result = execute(cli(temp.path(), &adb, &["window-process", "0000000"])).await;
    assert!(matches!(result, Err(Error::WindowNotFound { .. })));
}
