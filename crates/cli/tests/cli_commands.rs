use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture_run() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join("run")
}

fn fixture(name: &str) -> String {
    fixture_run().join(name).display().to_string()
}

/// Single child directory of `dir` (date dir, then run dir).
fn only_subdir(dir: &Path) -> PathBuf {
    let entries: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").path())
        .filter(|p| p.is_dir())
        .collect();
    assert_eq!(entries.len(), 1, "expected one directory in {}", dir.display());
    entries.into_iter().next().expect("one dir")
}

#[test]
fn no_subcommand_prints_usage_and_fails() {
    cargo_bin_cmd!("objdump-analyzer").assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn functions_from_saved_disassembly() {
    cargo_bin_cmd!("objdump-analyzer")
        .arg("functions")
        .arg("--input")
        .arg(fixture("objdump.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Functions (2):"))
        .stdout(predicate::str::contains("_start [80000000-80000010] size=16"))
        .stdout(predicate::str::contains("main [80000014-80000024] size=16"));
}

#[test]
fn functions_json_is_machine_readable() {
    let output = cargo_bin_cmd!("objdump-analyzer")
        .args(["functions", "--json", "--input"])
        .arg(fixture("objdump.txt"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let body: serde_json::Value = serde_json::from_slice(&output).expect("functions json");
    assert_eq!(body[0]["name"], "_start");
    assert_eq!(body[0]["start"], 0x8000_0000u64);
    assert_eq!(body[1]["size"], 16);
}

#[test]
fn symbols_lists_functions_then_data() {
    cargo_bin_cmd!("objdump-analyzer")
        .args(["symbols", "--input"])
        .arg(fixture("symbols.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Function symbols (2):"))
        .stdout(predicate::str::contains("main addr=80000014 size=20"));

    cargo_bin_cmd!("objdump-analyzer")
        .args(["symbols", "--data", "--input"])
        .arg(fixture("symbols.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Data symbols (3):"))
        .stdout(predicate::str::contains("stack [.bss] addr=80001004 size=256"))
        .stdout(predicate::str::contains("small").not());
}

#[test]
fn registers_prints_matching_lines_once() {
    let output = cargo_bin_cmd!("objdump-analyzer")
        .args(["registers", "--input"])
        .arg(fixture("objdump.txt"))
        .args(["-r", "a0", "a1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("lui\ta0,0x80001"));
    assert!(lines[3].contains("sw\ta1,0(a0)"));
}

#[test]
fn registers_without_names_prints_nothing() {
    cargo_bin_cmd!("objdump-analyzer")
        .args(["registers", "--input"])
        .arg(fixture("objdump.txt"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn size_from_saved_report() {
    cargo_bin_cmd!("objdump-analyzer")
        .args(["size", "--input"])
        .arg(fixture("size.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("fw.elf"))
        .stdout(predicate::str::contains("300"));
}

#[test]
fn input_and_file_are_mutually_exclusive() {
    cargo_bin_cmd!("objdump-analyzer")
        .args(["functions", "--input", "a.txt", "--file", "b.elf"])
        .assert()
        .failure();
    cargo_bin_cmd!("objdump-analyzer").arg("functions").assert().failure();
}

#[test]
fn missing_input_dump_fails() {
    cargo_bin_cmd!("objdump-analyzer")
        .args(["functions", "--input", "no_such_dump.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open dump"));
}

#[test]
fn analyze_requires_existing_binary() {
    let temp = tempdir().unwrap();
    cargo_bin_cmd!("objdump-analyzer")
        .current_dir(temp.path())
        .args(["analyze", "--file", "missing.elf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Binary file does not exist"));
}

#[test]
fn analyze_replay_writes_run_directory() {
    let temp = tempdir().unwrap();
    let output_root = temp.path().join("output");
    let logs_dir = temp.path().join("logs");

    cargo_bin_cmd!("objdump-analyzer")
        .current_dir(temp.path())
        .args(["analyze", "--file", "fw.elf", "--replay"])
        .arg(fixture_run())
        .arg("--output-root")
        .arg(&output_root)
        .arg("--logs-dir")
        .arg(&logs_dir)
        .args(["-r", "sp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Analysis complete:"))
        .stdout(predicate::str::contains("Functions: 2"))
        .stdout(predicate::str::contains("Data symbols: 3"))
        .stdout(predicate::str::contains("Register matches: 2"));

    let run_dir = only_subdir(&only_subdir(&output_root));
    assert!(run_dir.file_name().unwrap().to_string_lossy().starts_with("fw_"));
    for name in ["objdump.txt", "symbols.txt", "size.txt", "summary.txt", "registers.txt"] {
        assert!(run_dir.join(name).is_file(), "{name} missing from run dir");
    }

    let registers = fs::read_to_string(run_dir.join("registers.txt")).unwrap();
    assert_eq!(registers.lines().count(), 2);

    let summary = fs::read_to_string(run_dir.join("summary.txt")).unwrap();
    assert!(summary.contains("=== ELF Size Report ==="));
    assert!(summary.contains(".bss (1 symbols, 256 bytes)"));

    let metadata: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(run_dir.join("run_metadata.json")).unwrap())
            .unwrap();
    assert!(metadata["binary_hash"].is_null());
    assert_eq!(metadata["registers"][0], "sp");

    let logs: Vec<_> = fs::read_dir(&logs_dir).unwrap().collect();
    assert_eq!(logs.len(), 1);
    let log_path = logs.into_iter().next().unwrap().unwrap().path();
    let log_body = fs::read_to_string(log_path).unwrap();
    assert!(log_body.contains("Register match [sp]"));
}

#[test]
fn analyze_logs_to_stderr_and_run_log() {
    let temp = tempdir().unwrap();
    let logs_dir = temp.path().join("logs");

    cargo_bin_cmd!("objdump-analyzer")
        .current_dir(temp.path())
        .args(["analyze", "--file", "fw.elf", "--no-size", "-v", "--replay"])
        .arg(fixture_run())
        .arg("--output-root")
        .arg(temp.path().join("output"))
        .arg("--logs-dir")
        .arg(&logs_dir)
        .args(["-r", "ra"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Register match [ra]"));

    let log_path = fs::read_dir(&logs_dir).unwrap().next().unwrap().unwrap().path();
    let log_body = fs::read_to_string(log_path).unwrap();
    assert!(log_body.contains("Register match [ra]"));
}

#[test]
fn analyze_quiet_keeps_register_matches_out_of_stderr() {
    let temp = tempdir().unwrap();

    cargo_bin_cmd!("objdump-analyzer")
        .current_dir(temp.path())
        .args(["analyze", "--file", "fw.elf", "--no-size", "-q", "--replay"])
        .arg(fixture_run())
        .arg("--output-root")
        .arg(temp.path().join("output"))
        .arg("--logs-dir")
        .arg(temp.path().join("logs"))
        .args(["-r", "ra"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Register match").not());
}

#[test]
fn analyze_reads_registers_from_yaml_config() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("analyzer.yaml");
    fs::write(
        &config,
        format!(
            "registers: [ra]\noutput_root: {}\nlogs_dir: {}\nsize_report: false\n",
            temp.path().join("out").display(),
            temp.path().join("logs").display()
        ),
    )
    .unwrap();

    let output = cargo_bin_cmd!("objdump-analyzer")
        .current_dir(temp.path())
        .args(["analyze", "--file", "fw.elf", "--json", "--config"])
        .arg(&config)
        .arg("--replay")
        .arg(fixture_run())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).expect("report json");
    assert_eq!(report["register_matches"], 1);
    assert!(report.get("sizes").is_none());
    assert_eq!(report["function_symbols"][1]["name"], "main");
}
