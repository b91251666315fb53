#![cfg(unix)]

use mtrext::supervisor::{RunStatus, run_process};
use mtrext::{Mtr, MtrError, MtrOptions, MtrReport};
use std::time::Duration;
use tokio_test::block_on;

fn sh(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}

#[test]
fn test_successful_run_parses_report() {
    let script = "cat <<'EOF'
HOST: example.com
  1.|-- 10.0.0.1   0.0%    5    5    5   1.2  1.0  1.1   1.5   0.1  0.1  0.2  0.3
EOF
";
    let envelope = block_on(run_process("sh", &sh(script))).unwrap();

    assert_eq!(envelope.status, RunStatus::Success);
    assert_eq!(envelope.code, Some(0));
    assert_eq!(envelope.args, sh(script));

    let report = MtrReport::from_envelope(envelope, true);
    assert_eq!(report.status, RunStatus::Success);
    assert_eq!(report.host.as_deref(), Some("example.com"));
    assert_eq!(report.hops().len(), 1);
    assert_eq!(report.hops()[0].hop, "1");
    assert_eq!(report.hops()[0].rcv, "5");
}

#[test]
fn test_nonzero_exit_keeps_stderr() {
    let script = "echo 'partial output'; printf 'mtr: permission denied' >&2; exit 1";
    let envelope = block_on(run_process("sh", &sh(script))).unwrap();

    assert_eq!(envelope.status, RunStatus::Failed);
    assert_eq!(envelope.code, Some(1));
    assert_eq!(envelope.results.raw, "mtr: permission denied");

    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["status"], "failed");
    assert_eq!(json["results"]["raw"], "mtr: permission denied");
}

#[test]
fn test_signal_has_no_exit_code() {
    let envelope = block_on(run_process("sh", &sh("kill -9 $$"))).unwrap();
    assert_eq!(envelope.status, RunStatus::Failed);
    assert_eq!(envelope.code, None);
}

#[test]
fn test_missing_binary_is_spawn_error() {
    let result = block_on(run_process(
        "./this_command_does_not_exist_ever_12345",
        &[],
    ));
    match result {
        Err(MtrError::Spawn { program, source }) => {
            assert_eq!(program, "./this_command_does_not_exist_ever_12345");
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("Expected Spawn error, got {other:?}"),
    }
}

#[test]
fn test_missing_program_through_mtr() {
    let options = MtrOptions {
        program: "mtr-binary-that-is-not-installed".to_string(),
        ..MtrOptions::default()
    };
    let mtr = Mtr::from_addr("10.0.0.1", options).unwrap();

    // traceroute() spawns onto the runtime, so it has to be called inside one
    let err = block_on(async { mtr.traceroute().await }).unwrap_err();
    assert!(matches!(err, MtrError::Spawn { .. }), "got {err:?}");
    assert!(err.envelope().is_none());
}

#[test]
fn test_invalid_target_fails_before_spawn() {
    let options = MtrOptions {
        program: "mtr-binary-that-is-not-installed".to_string(),
        ..MtrOptions::default()
    };
    match Mtr::from_addr("not-an-ip", options) {
        Err(MtrError::InvalidTarget(addr)) => assert_eq!(addr, "not-an-ip"),
        other => panic!("Expected InvalidTarget, got {other:?}"),
    }
}

#[test]
fn test_streams_are_buffered_across_writes() {
    // Interleaved, delayed writes on both streams
    let script = "printf 'line one\\n'; printf 'err one ' >&2; sleep 0.1; \
                  printf 'line two\\nline'; printf 'err two' >&2; sleep 0.1; printf ' three\\n'";
    let envelope = block_on(run_process("sh", &sh(script))).unwrap();
    assert_eq!(envelope.results.raw, "line one\nline two\nline three\n");

    let failing = format!("{script}; exit 3");
    let envelope = block_on(run_process("sh", &sh(&failing))).unwrap();
    assert_eq!(envelope.code, Some(3));
    assert_eq!(envelope.results.raw, "err one err two");
}

#[test]
fn test_large_output_does_not_stall() {
    // Well past a pipe buffer on both streams
    let script = "i=0; while [ $i -lt 4000 ]; do echo \"stdout line $i padded to make it longer\"; \
                  echo \"stderr line $i\" >&2; i=$((i+1)); done";
    let envelope = block_on(run_process("sh", &sh(script))).unwrap();
    let lines: Vec<&str> = envelope.results.raw.lines().collect();
    assert_eq!(lines.len(), 4000);
    assert_eq!(lines[0], "stdout line 0 padded to make it longer");
    assert_eq!(lines[3999], "stdout line 3999 padded to make it longer");
}

#[test]
fn test_timing_is_per_invocation() {
    block_on(async {
        let slow = sh("sleep 0.4");
        let fast = sh("true");
        let (slow, fast) = tokio::join!(run_process("sh", &slow), run_process("sh", &fast));
        let (slow, fast) = (slow.unwrap(), fast.unwrap());

        assert!(slow.timetaken >= Duration::from_millis(400));
        assert!(fast.timetaken < slow.timetaken);
    });
}
