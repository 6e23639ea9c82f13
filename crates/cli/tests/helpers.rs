use std::fs;

use objdump_analyzer::{canonicalize_or_current, hex_addr};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    let expected = tmp.path().canonicalize().expect("canon tmp");
    assert_eq!(result, expected);

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn canonicalize_or_current_resolves_existing_path() {
    let tmp = tempdir().expect("tempdir");
    let file = tmp.path().join("fw.elf");
    fs::write(&file, b"\x7fELF").expect("write binary");

    let result = canonicalize_or_current(&file.to_string_lossy()).expect("canonicalize file");
    assert_eq!(result, file.canonicalize().expect("canonicalize fixture"));
}

#[test]
fn canonicalize_or_current_keeps_missing_paths_absolute() {
    let result = canonicalize_or_current("definitely/not/here.elf").expect("fallback");
    assert!(result.is_absolute());
    assert!(result.ends_with("definitely/not/here.elf"));
}

#[test]
fn hex_addr_pads_to_eight_digits() {
    assert_eq!(hex_addr(0x1040), "00001040");
    assert_eq!(hex_addr(0x8000_0000), "80000000");
    assert_eq!(hex_addr(0x1_0000_0000), "100000000");
}
