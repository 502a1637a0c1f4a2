//! Record-replay integration tests.
//!
//! Proves that recorded port interactions replay deterministically and
//! that a replayed search cassette can drive a full resolution run over a
//! ledger on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;

use model_finder::adapters::live::{LiveClock, LiveFileSystem, LiveIdGenerator};
use model_finder::alias::AliasMap;
use model_finder::cassette::config::CassetteConfig;
use model_finder::cassette::recorder::CassetteRecorder;
use model_finder::config::{FinderConfig, ResolveSettings};
use model_finder::context::ServiceContext;
use model_finder::ledger::{LedgerStore, RowStatus, HEADER};
use model_finder::resolve::ResolutionEngine;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Exercises the clock, fs, and id_gen ports on the given context,
/// returning a snapshot of all outputs for comparison.
fn exercise_ports(ctx: &ServiceContext) -> (String, String, bool, String) {
    let time = ctx.clock.now().to_rfc3339();
    let workflow = ctx.fs.read_to_string(Path::new("/flows/portrait.json")).unwrap();
    let exists = ctx.fs.exists(Path::new("/models/sd_xl_base_1.0.safetensors"));
    let id = ctx.id_gen.generate_id();
    (time, workflow, exists, id)
}

#[test]
fn recorded_ports_replay_identically_twice() {
    let dir = scratch_dir("model_finder_record_replay_test");
    let cassette_path = dir.join("roundtrip.cassette.yaml");

    let mut recorder = CassetteRecorder::new(&cassette_path, "roundtrip-test");
    recorder.record("clock", "now", json!({}), json!("2025-03-15T14:30:00Z"));
    recorder.record(
        "fs",
        "read_to_string",
        json!({"path": "/flows/portrait.json"}),
        json!({"ok": "{\"nodes\": []}"}),
    );
    recorder.record(
        "fs",
        "exists",
        json!({"path": "/models/sd_xl_base_1.0.safetensors"}),
        json!(false),
    );
    recorder.record("id_gen", "generate_id", json!({}), json!("alias-001"));
    let written_path = recorder.finish().expect("recording should succeed");
    assert_eq!(written_path, cassette_path);

    let first = exercise_ports(&ServiceContext::replaying(&cassette_path).unwrap());
    assert_eq!(
        first,
        (
            "2025-03-15T14:30:00+00:00".to_string(),
            "{\"nodes\": []}".to_string(),
            false,
            "alias-001".to_string()
        )
    );

    let second = exercise_ports(&ServiceContext::replaying(&cassette_path).unwrap());
    assert_eq!(first, second, "replays differ");

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn replayed_search_drives_resolution_of_a_ledger() {
    let dir = scratch_dir("model_finder_replayed_resolution_test");

    let search_path = dir.join("search.cassette.yaml");
    let mut recorder = CassetteRecorder::new(&search_path, "resolution");
    recorder.record(
        "search",
        "query",
        json!({"domain": "huggingface.co", "query": "site:huggingface.co \"4x-UltraSharp.pth\""}),
        json!({"ok": "https://huggingface.co/lokCX/4x-Ultrasharp/blob/main/4x-UltraSharp.pth"}),
    );
    recorder.record(
        "search",
        "query",
        json!({"domain": "huggingface.co", "query": "site:huggingface.co \"gone.safetensors\""}),
        json!({"ok": null}),
    );
    recorder.finish().unwrap();

    let ledger = dir.join("flow.csv");
    std::fs::write(
        &ledger,
        format!(
            "{}\n1,7,UpscaleModelLoader,4x-UltraSharp.pth,,,,\n2,9,VAELoader,gone.safetensors,,,,\n",
            HEADER.join(",")
        ),
    )
    .unwrap();

    let replayed = ServiceContext::replaying_from(&CassetteConfig {
        search: Some(search_path),
        ..CassetteConfig::default()
    })
    .unwrap();
    let ctx = ServiceContext {
        clock: Box::new(LiveClock),
        fs: Arc::new(LiveFileSystem),
        id_gen: Box::new(LiveIdGenerator),
        search: replayed.search,
    };
    let mut config = FinderConfig::default();
    config.resolve = ResolveSettings { delay_min_ms: 0, delay_max_ms: 0 };
    let aliases = AliasMap::default();

    let summary = ResolutionEngine::new(&ctx, &config, &aliases).run(&ledger).await.unwrap();
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.resolved, 1);
    assert_eq!(summary.not_found, 1);

    let rows = LedgerStore::new(&*ctx.fs, &config.search).read_all(&ledger).unwrap();
    assert_eq!(rows[0].status, RowStatus::Resolved);
    assert_eq!(
        rows[0].download_link,
        "https://huggingface.co/lokCX/4x-Ultrasharp/resolve/main/4x-UltraSharp.pth"
    );
    assert_eq!(
        rows[0].mirror_link,
        "https://hf-mirror.com/lokCX/4x-Ultrasharp/resolve/main/4x-UltraSharp.pth"
    );
    assert_eq!(rows[1].status, RowStatus::NotFound);

    let _ = std::fs::remove_dir_all(&dir);
}
