//! Runs YkmanRunner against fake ykman shell scripts
//!
//! Everything lives in one test so scripts are never written while another
//! test thread forks (which makes exec fail with ETXTBSY).

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use ykoath::error::OathError;
use ykoath::config::OathConfig;
use ykoath::oath::{AccountSession, OathClient, Options};
use ykoath::ykman::{CommandRunner, Termination, YkmanRunner};
use ykoath::Password;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();
    path
}

#[tokio::test]
async fn test_fake_ykman_scripts() {
    let dir = tempfile::tempdir().unwrap();
    let echo = write_script(
        dir.path(),
        "echo-ykman",
        r#"read pw
echo "args: $*"
echo "stdin: $pw"
echo "123456""#,
    );
    let not_connected = write_script(
        dir.path(),
        "absent-ykman",
        r#"echo "ERROR: Failed connecting to the YubiKey." >&2
exit 2"#,
    );
    let terminated = write_script(dir.path(), "term-ykman", "kill -TERM $$\nsleep 5");
    let slow = write_script(dir.path(), "slow-ykman", "sleep 10");

    let cancel = CancellationToken::new();

    // stdout, stdin and arguments
    let output = YkmanRunner::new(&echo)
        .run(
            &["oath".to_string(), "accounts".to_string(), "list".to_string()],
            b"secret\n",
            &cancel,
        )
        .await
        .unwrap();
    assert_eq!(output.termination, Termination::Exited(0));
    assert!(output.stdout.contains("args: oath accounts list"));
    assert!(output.stdout.contains("stdin: secret"));

    // full client path through the real runner
    let client = OathClient::new(YkmanRunner::new(&echo));
    let code = client
        .code(
            "GitHub:alice",
            &Options::default().with_password(Password::new("pw")),
            &cancel,
        )
        .await
        .unwrap();
    assert_eq!(code.expose(), "123456");

    // configured ykman path and default device
    let config = OathConfig {
        ykman_path: echo.clone(),
        device: Some("12345678".to_string()),
        timeout_secs: Some(5),
    };
    let mut session = AccountSession::from_config(&config).unwrap();
    let lines = session.list().await.unwrap();
    assert_eq!(lines[0], "args: --device 12345678 oath accounts list");

    // stderr classification
    let client = OathClient::new(YkmanRunner::new(&not_connected));
    assert!(matches!(
        client.list(&Options::default(), &cancel).await,
        Err(OathError::DeviceNotFound)
    ));

    // missing executable
    let client = OathClient::new(YkmanRunner::new(dir.path().join("does-not-exist")));
    assert!(matches!(
        client.list(&Options::default(), &cancel).await,
        Err(OathError::CommandNotFound)
    ));

    // killed by SIGTERM
    let output = YkmanRunner::new(&terminated)
        .run(&[], b"\n", &cancel)
        .await
        .unwrap();
    assert_eq!(output.termination, Termination::Signaled(nix::libc::SIGTERM));
    let client = OathClient::new(YkmanRunner::new(&terminated));
    assert!(matches!(
        client.list(&Options::default(), &cancel).await,
        Err(OathError::CommandInterrupted)
    ));

    // timeout kills the process
    let started = Instant::now();
    let runner = YkmanRunner::new(&slow).with_timeout(Some(Duration::from_millis(100)));
    let output = runner.run(&[], b"\n", &cancel).await.unwrap();
    assert_eq!(output.termination, Termination::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(5));

    // cancellation kills the process
    let started = Instant::now();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });
    let client = OathClient::new(YkmanRunner::new(&slow));
    assert!(matches!(
        client.list(&Options::default(), &cancel).await,
        Err(OathError::CommandInterrupted)
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
}
