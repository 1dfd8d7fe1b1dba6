//! `memoclaw doctor` — Diagnose configuration and memory health.

use memoclaw_config::AppConfig;
use memoclaw_core::memory::{RecordMetadata, VectorMemory};
use memoclaw_memory::{HashEmbedder, SqliteVectorStore};
use std::sync::Arc;

pub async fn run() -> anyhow::Result<()> {
    println!("memoclaw doctor");
    println!();

    // Config
    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  [ok]   config loaded");
            config
        }
        Err(e) => {
            println!("  [fail] config: {e}");
            return Ok(());
        }
    };

    // API key
    if config.has_api_key() {
        println!("  [ok]   API key present ({})", config.api_url);
    } else {
        println!("  [warn] no API key — assistant will answer in degraded mode");
    }

    // Tools
    let registry = memoclaw_tools::default_registry();
    println!("  [ok]   {} tools registered", registry.len());

    // Memory backend
    match config.memory.backend.as_str() {
        "memory" => println!("  [ok]   memory backend: in-process (non-durable)"),
        _ => {
            let path = config.memory_db_path();
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let url = format!("sqlite://{}", path.display());
            match SqliteVectorStore::new(&url, Arc::new(HashEmbedder::default())).await {
                Ok(store) => {
                    // A write/read probe against a throwaway owner.
                    let outcome = store
                        .insert(
                            "__doctor__",
                            "memoclaw doctor probe",
                            RecordMetadata::new("doctor", "doctor"),
                        )
                        .await;
                    if outcome.is_inserted() {
                        println!("  [ok]   memory database writable at {}", path.display());
                    } else {
                        println!("  [fail] memory database rejected a write");
                    }
                }
                Err(e) => println!("  [fail] memory database: {e}"),
            }
        }
    }

    println!();
    println!(
        "  loop limits: {} iterations / {}s",
        config.agent.max_iterations, config.agent.max_execution_secs
    );
    println!(
        "  session window: {} exchanges, {} sessions cached",
        config.memory.window_exchanges, config.memory.session_capacity
    );
    Ok(())
}
