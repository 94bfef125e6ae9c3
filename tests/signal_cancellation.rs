// Real signal delivery, to this process and to the compiled binary.
#![cfg(unix)]

use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use signal_hook::consts::{SIGINT, SIGTERM};
use zen::cancel::CancelToken;

#[test]
fn sigint_and_sigterm_set_the_token() {
    for signal in [SIGINT, SIGTERM] {
        let token = CancelToken::new();
        let guard = token.install_signal_handlers().unwrap();

        signal_hook::low_level::raise(signal).unwrap();
        signal_hook::low_level::raise(signal).unwrap();

        assert!(token.is_cancelled(), "signal {signal}");
        drop(guard);
    }
}

fn interrupt_running_session(signal: &str) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("zen");
    let child = Command::new(bin)
        .args(["-d", "1m", "--config"])
        .arg(dir.path().join("none.json"))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    // let it install its handlers and draw a few frames
    thread::sleep(Duration::from_millis(800));
    let started = Instant::now();
    let status = Command::new("kill")
        .args([signal, &child.id().to_string()])
        .status()?;
    assert!(status.success());

    let output = child.wait_with_output()?;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(output.status.success(), "{signal}: {:?}", output.status);

    let text = String::from_utf8(output.stdout)?;
    assert_eq!(text.matches("Session interrupted.").count(), 1);
    assert!(!text.contains("Terminal Zen by"));
    Ok(())
}

#[test]
fn sigterm_interrupts_a_running_session() -> Result<(), Box<dyn std::error::Error>> {
    interrupt_running_session("-TERM")
}

#[test]
fn sigint_interrupts_a_running_session() -> Result<(), Box<dyn std::error::Error>> {
    interrupt_running_session("-INT")
}
