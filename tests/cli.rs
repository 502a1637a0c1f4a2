//! Integration tests for top-level CLI behavior.

use std::path::{Path, PathBuf};
use std::process::Command;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Runs the binary inside `dir` with outputs and aliases kept in `dir`.
fn run_finder(dir: &Path, args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_model-finder");
    Command::new(bin)
        .args(args)
        .current_dir(dir)
        .env("MODEL_FINDER_CONFIG", dir.join("absent.yaml"))
        .env("MODEL_FINDER_OUTPUT", dir.join("out"))
        .env("MODEL_FINDER_ALIASES", dir.join("aliases.json"))
        .env_remove("MODEL_FINDER_RECORD")
        .output()
        .expect("failed to run model-finder binary")
}

const WORKFLOW: &str = r#"{"nodes": [
    {"id": 4, "type": "CheckpointLoaderSimple", "widgets_values": ["sd_xl_base_1.0.safetensors"]},
    {"id": 9, "type": "VAELoader", "widgets_values": ["vae/sdxl_vae.safetensors"]},
    {"id": 12, "type": "KSampler", "widgets_values": [42, "fixed", 20]}
]}"#;

/// Files written under `out/<date>/`, including its subfolders.
fn ledgers(dir: &Path) -> Vec<PathBuf> {
    fn walk(path: &Path, found: &mut Vec<PathBuf>) {
        for entry in std::fs::read_dir(path).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(&path, found);
            } else {
                found.push(path);
            }
        }
    }
    let mut found = Vec::new();
    walk(&dir.join("out"), &mut found);
    found.sort();
    found
}

#[test]
fn help_lists_subcommands() {
    let dir = scratch_dir("model_finder_cli_help");
    let output = run_finder(&dir, &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    for command in ["scan", "resolve", "batch", "alias"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[test]
fn unknown_subcommand_fails() {
    let dir = scratch_dir("model_finder_cli_unknown");
    let output = run_finder(&dir, &["frobnicate"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn scan_writes_a_dated_ledger() {
    let dir = scratch_dir("model_finder_cli_scan");
    std::fs::write(dir.join("portrait.json"), WORKFLOW).unwrap();

    let output = run_finder(&dir, &["scan", "portrait.json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("2 missing model reference(s)"));

    let files = ledgers(&dir);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name().and_then(|n| n.to_str()), Some("portrait.csv"));
    let csv = std::fs::read_to_string(&files[0]).unwrap();
    assert!(csv.starts_with("seq,node_ids,node_types,filename,status"));
    assert!(csv.contains("sd_xl_base_1.0.safetensors"));
    assert!(csv.contains("sdxl_vae.safetensors"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn scan_of_missing_workflow_fails() {
    let dir = scratch_dir("model_finder_cli_scan_missing");
    let output = run_finder(&dir, &["scan", "nowhere.json"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("Workflow not found"));
}

#[test]
fn alias_add_then_list() {
    let dir = scratch_dir("model_finder_cli_alias");
    let added = run_finder(
        &dir,
        &["alias", "add", "万相clip_vision_h.safetensors", "clip_vision_h.safetensors"],
    );
    assert!(added.status.success(), "stderr: {}", String::from_utf8_lossy(&added.stderr));

    let listed = run_finder(&dir, &["alias", "list"]);
    let stdout = String::from_utf8_lossy(&listed.stdout);
    assert!(listed.status.success());
    assert!(stdout.contains("万相clip_vision_h.safetensors -> clip_vision_h.safetensors"));

    let duplicate = run_finder(
        &dir,
        &["alias", "add", "万相clip_vision_h.safetensors", "other.safetensors"],
    );
    assert!(!duplicate.status.success());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn batch_skips_invalid_files_and_writes_summary() {
    let dir = scratch_dir("model_finder_cli_batch");
    let flows = dir.join("flows");
    std::fs::create_dir_all(&flows).unwrap();
    std::fs::write(flows.join("a.json"), WORKFLOW).unwrap();
    std::fs::write(flows.join("broken.json"), "{not json").unwrap();
    std::fs::write(flows.join("notes.txt"), "ignored").unwrap();

    let output = run_finder(&dir, &["batch", "flows"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("2 candidate(s), 1 valid, 1 skipped"));

    let files = ledgers(&dir);
    let day = std::fs::read_dir(dir.join("out")).unwrap().next().unwrap().unwrap().path();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(&day).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, ["_batch/batch_report.csv", "_batch/missing_summary.csv", "a.csv"]);

    let _ = std::fs::remove_dir_all(&dir);
}
