use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "scion-ip-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn run_scion_trace(args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_scion_trace"))
        .args(args)
        .output()
        .expect("run scion_trace");
    assert!(
        output.status.success(),
        "scion_trace failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn count_lines(stdout: &str, prefix: &str) -> usize {
    stdout.lines().filter(|line| line.starts_with(prefix)).count()
}

#[test]
fn scion_trace_completes_handshake() {
    let output = run_scion_trace(&[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(count_lines(&stdout, "tcp_input "), 3);
    assert!(stdout.contains("event=SynReceived"));
    let done = stdout
        .lines()
        .find(|line| line.starts_with("done @ "))
        .expect("missing done line");
    assert!(done.contains("frames_sent=3"), "{done}");
    assert!(done.contains("ingress_drops=0"), "{done}");
    assert!(done.contains("established=2"), "{done}");
}

#[test]
fn scion_trace_writes_trace_json_with_one_hop_syn() {
    let dir = unique_temp_dir("trace-json");
    let out_json = dir.join("trace.json");

    run_scion_trace(&[
        "--one-hop",
        "--trace-json",
        out_json.to_str().unwrap(),
    ]);

    let raw = fs::read_to_string(&out_json).expect("read trace.json");
    let v: Value = serde_json::from_str(&raw).expect("parse trace.json");
    let arr = v.as_array().expect("trace.json must be a JSON array");
    assert_eq!(arr.len(), 9);
    assert_eq!(arr[0].get("kind").and_then(|k| k.as_str()), Some("frame_sent"));
    // 56 header bytes with a 3-hop path, one 8-byte extension, 20-byte SYN.
    assert_eq!(arr[0].get("bytes").and_then(|b| b.as_u64()), Some(84));
    assert_eq!(arr[3].get("bytes").and_then(|b| b.as_u64()), Some(76));
    assert_eq!(
        arr.last().and_then(|e| e.get("kind")).and_then(|k| k.as_str()),
        Some("tcp_input")
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn scion_trace_reads_ip_config() {
    let dir = unique_temp_dir("config");
    let config = dir.join("ip.json");
    fs::write(&config, r#"{ "min_segment_len": 40 }"#).expect("write ip.json");

    let output = run_scion_trace(&["--config", config.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(count_lines(&stdout, "ingress_drop host=server"), 1);
    assert!(stdout.contains("established=0"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn scion_trace_handles_empty_path_and_ipv6_hosts() {
    let output = run_scion_trace(&[
        "--segments",
        "0",
        "--src",
        "1-11,[fd00::1]",
        "--dst",
        "2-22,[fd00::2]",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("established=2"));
}
