use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn tmp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tonecast-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).ok();
    dir.join(name)
}

fn run_tonecast(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tonecast"))
        .args(args)
        .output()
        .expect("Failed to execute tonecast")
}

fn combined(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string() + &String::from_utf8_lossy(&output.stdout)
}

#[test]
fn test_encode_text_then_decode() {
    let wav = tmp_path("hi.wav");
    let saved = tmp_path("hi.out");

    let output = run_tonecast(&["encode-text", "Hi", wav.to_str().unwrap()]);
    assert!(output.status.success(), "encode failed: {}", combined(&output));
    assert!(combined(&output).contains("16 frames"), "got: {}", combined(&output));

    // 16 frames of 4410 samples, 2 bytes each, plus the 44-byte header
    let size = fs::metadata(&wav).expect("WAV not created").len();
    assert_eq!(size, 44 + 16 * 4410 * 2);

    let output = run_tonecast(&["decode", wav.to_str().unwrap(), saved.to_str().unwrap()]);
    let text = combined(&output);
    assert!(output.status.success(), "decode failed: {}", text);
    assert!(text.contains("0100100001101001"), "got: {}", text);
    assert!(text.contains("plain text"), "got: {}", text);
    assert_eq!(fs::read(&saved).expect("Decoded file not written"), b"Hi");
}

#[test]
fn test_encode_file_decode_json() {
    let input = tmp_path("doc.json");
    let wav = tmp_path("doc.wav");
    fs::write(&input, "{\"a\":1}").unwrap();

    let output = run_tonecast(&["encode", input.to_str().unwrap(), wav.to_str().unwrap()]);
    assert!(output.status.success(), "encode failed: {}", combined(&output));

    let output = run_tonecast(&["decode", wav.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "decode failed: {}", combined(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"text\": \"{\\\"a\\\":1}\""), "got: {}", stdout);
    assert!(stdout.contains("\"file_type\": \"JSON\""), "got: {}", stdout);
    assert!(stdout.contains("\"frames\": 56"), "got: {}", stdout);
}

#[test]
fn test_missing_input_fails() {
    let output = run_tonecast(&["decode", tmp_path("nope.wav").to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(combined(&output).contains("Cannot read"), "got: {}", combined(&output));
}

#[test]
fn test_sample_rate_mismatch_fails() {
    let wav = tmp_path("rate.wav");
    let output = run_tonecast(&["--sample-rate", "48000", "encode-text", "x", wav.to_str().unwrap()]);
    assert!(output.status.success(), "encode failed: {}", combined(&output));

    let output = run_tonecast(&["decode", wav.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(combined(&output).contains("mismatch"), "got: {}", combined(&output));
}

#[test]
fn test_fingerprint_check() {
    let output = run_tonecast(&["config"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    assert!(stdout.contains("\"samples_per_frame\": 4410"), "got: {}", stdout);

    let wav = tmp_path("fp.wav");
    run_tonecast(&["encode-text", "A", wav.to_str().unwrap()]);

    let output = run_tonecast(&[
        "--tolerance",
        "40",
        "decode",
        wav.to_str().unwrap(),
        "--expect-fingerprint",
        "0000",
    ]);
    assert!(!output.status.success());
    assert!(combined(&output).contains("fingerprint"), "got: {}", combined(&output));
}

#[test]
fn test_config_file_overrides_defaults() {
    let cfg = tmp_path("fast.json");
    fs::write(&cfg, r#"{"symbol_duration_ms": 20}"#).unwrap();

    let output = run_tonecast(&["--config", cfg.to_str().unwrap(), "config"]);
    assert!(output.status.success(), "got: {}", combined(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"samples_per_frame\": 882"), "got: {}", stdout);
}

#[test]
fn test_text_outside_single_byte_rejected() {
    let wav = tmp_path("wide.wav");
    let output = run_tonecast(&["encode-text", "\u{263a}", wav.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(combined(&output).contains("single byte"), "got: {}", combined(&output));
}

#[test]
fn test_latin1_text_shown_after_decode() {
    let wav = tmp_path("cafe.wav");
    let output = run_tonecast(&["encode-text", "caf\u{e9}", wav.to_str().unwrap()]);
    assert!(output.status.success(), "encode failed: {}", combined(&output));

    let output = run_tonecast(&["decode", wav.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    assert!(output.status.success(), "decode failed: {}", combined(&output));
    assert!(stdout.contains("caf\u{e9}"), "got: {}", stdout);
    assert!(stdout.contains("one character per byte"), "got: {}", stdout);

    let output = run_tonecast(&["decode", wav.to_str().unwrap(), "--json"]);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    assert!(output.status.success(), "decode failed: {}", combined(&output));
    assert!(stdout.contains("\"text\": \"caf\u{e9}\""), "got: {}", stdout);
    assert!(stdout.contains("\"utf8\": false"), "got: {}", stdout);
}

#[test]
fn test_decode_full_prints_whole_text() {
    let wav = tmp_path("full.wav");
    let output = run_tonecast(&["encode-text", "Hey", wav.to_str().unwrap()]);
    assert!(output.status.success(), "encode failed: {}", combined(&output));

    let output = run_tonecast(&["decode", wav.to_str().unwrap(), "--full"]);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    assert!(output.status.success(), "decode failed: {}", combined(&output));
    assert!(stdout.contains("\nHey\n"), "got: {}", stdout);
    assert!(!stdout.contains("pass --full"), "got: {}", stdout);
}

#[test]
fn test_fingerprint_from_config_accepted() {
    let output = run_tonecast(&["--amplitude", "16000", "config"]);
    assert!(output.status.success(), "got: {}", combined(&output));
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("config is not JSON");
    let fingerprint = report["fingerprint"].as_str().expect("no fingerprint").to_string();
    assert_eq!(report["amplitude"], 16000.0);

    let wav = tmp_path("fp-ok.wav");
    let output = run_tonecast(&["--amplitude", "16000", "encode-text", "ok", wav.to_str().unwrap()]);
    assert!(output.status.success(), "encode failed: {}", combined(&output));

    let output = run_tonecast(&[
        "--amplitude",
        "16000",
        "decode",
        wav.to_str().unwrap(),
        "--expect-fingerprint",
        &fingerprint,
    ]);
    assert!(output.status.success(), "decode failed: {}", combined(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("\nok\n"));

    // Defaults carry a different amplitude, so the same fingerprint is refused
    let output = run_tonecast(&["decode", wav.to_str().unwrap(), "--expect-fingerprint", &fingerprint]);
    assert!(!output.status.success());
}
