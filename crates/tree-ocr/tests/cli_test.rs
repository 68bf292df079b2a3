//! Exit-code behavior of the tree-ocr binary.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn tree_ocr(dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_tree-ocr"));
    command
        .current_dir(dir.path())
        .env_remove("INPUT_DIR")
        .env_remove("OUT_FOLDER")
        .env_remove("OCR_ENGINE")
        .env_remove("OCR_STRATEGY")
        .env_remove("OCR_AUTO_ORIENT")
        .env_remove("RUST_LOG")
        .env("TREE_OCR_LOG_FILE", dir.path().join("run.log"));
    command
}

#[test]
fn test_missing_input_dir_exits_successfully_without_output() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    let status = tree_ocr(&dir)
        .arg("--input-dir")
        .arg(dir.path().join("absent"))
        .arg("--out-folder")
        .arg(&out)
        .status()
        .unwrap();

    assert!(status.success());
    assert!(!out.exists());
}

#[test]
fn test_unset_input_dir_exits_successfully() {
    let dir = TempDir::new().unwrap();

    let output = tree_ocr(&dir).arg("--json").output().unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["input_missing"], true);
    assert_eq!(report["processed"], 0);
}

#[test]
fn test_settings_come_from_env_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("from-env");
    fs::write(
        dir.path().join(".env"),
        format!(
            "INPUT_DIR={}\nOUT_FOLDER={}\nUNRELATED_KEY=ignored\n",
            dir.path().join("absent").display(),
            out.display()
        ),
    )
    .unwrap();

    let output = tree_ocr(&dir).arg("--json").output().unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["input_missing"], true);
    assert_eq!(report["out_folder"], out.display().to_string());
}

#[test]
fn test_auto_orient_accepts_boolish_env_values() {
    let dir = TempDir::new().unwrap();

    for value in ["1", "yes", "on", "true", "0", "no", "off"] {
        let status = tree_ocr(&dir)
            .env("OCR_AUTO_ORIENT", value)
            .arg("--input-dir")
            .arg(dir.path().join("absent"))
            .arg("--out-folder")
            .arg(dir.path().join("out"))
            .status()
            .unwrap();
        assert!(status.success(), "OCR_AUTO_ORIENT={} was rejected", value);
    }
}

#[test]
fn test_auto_orient_from_env_is_validated() {
    let dir = TempDir::new().unwrap();

    let status = tree_ocr(&dir)
        .env("OCR_AUTO_ORIENT", "1")
        .env("OCR_ENGINE", "ocrs")
        .arg("--input-dir")
        .arg(dir.path().join("absent"))
        .arg("--out-folder")
        .arg(dir.path().join("out"))
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_missing_out_folder_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("in").join("en")).unwrap();

    let status = tree_ocr(&dir)
        .arg("--input-dir")
        .arg(dir.path().join("in"))
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_log_file_is_appended() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("run.log");
    fs::write(&log, "previous run\n").unwrap();

    let status = tree_ocr(&dir)
        .arg("--input-dir")
        .arg(dir.path().join("absent"))
        .arg("--out-folder")
        .arg(dir.path().join("out"))
        .status()
        .unwrap();

    assert!(status.success());
    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.starts_with("previous run\n"));
    assert!(contents.contains("does not exist"));
}
