//! `memoclaw chat` — Interactive or single-message chat mode.

use anyhow::Context;
use memoclaw_agent::{Assistant, AssistantSettings};
use memoclaw_config::AppConfig;
use memoclaw_core::history::ChatHistoryStore;
use memoclaw_core::memory::{Embedder, VectorMemory};
use memoclaw_core::turn::{Role, SessionId, UserId};
use memoclaw_memory::{
    HashEmbedder, InMemoryVectorStore, NoopHistoryStore, SessionStore, SqliteVectorStore,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub async fn run(
    message: Option<String>,
    session: Option<String>,
    user: String,
) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  NOTE: No API key configured — running in degraded mode.");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GROQ_API_KEY      (recommended)");
        eprintln!("    OPENAI_API_KEY");
        eprintln!("    MEMOCLAW_API_KEY  (generic)");
        eprintln!();
        eprintln!("  Or add api_key to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
    }

    let assistant = build_assistant(&config).await?;

    // The transcript system of record sits outside the core; this
    // deployment has none, so writes go to the no-op store.
    let transcript: Arc<dyn ChatHistoryStore> = Arc::new(NoopHistoryStore);

    let user = UserId::new(user);
    let session = SessionId::new(
        session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    );

    if let Some(message) = message {
        // Single message mode
        let output = ask(&assistant, &transcript, &user, &session, &message).await;
        println!("{output}");
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  memoclaw — interactive chat");
    println!("  Model:    {}", config.default_model);
    println!("  Memory:   {}", config.memory.backend);
    println!("  Session:  {session}");
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(b"  You > ").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            stdout.write_all(b"  You > ").await?;
            stdout.flush().await?;
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        let output = ask(&assistant, &transcript, &user, &session, input).await;
        println!();
        for line in output.lines() {
            println!("  Assistant > {line}");
        }
        println!();

        stdout.write_all(b"  You > ").await?;
        stdout.flush().await?;
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}

/// One request: persist the user's turn, run the assistant, persist the
/// answer. Transcript writes are best-effort — a failing system of record
/// must not block the conversation.
async fn ask(
    assistant: &Assistant,
    transcript: &Arc<dyn ChatHistoryStore>,
    user: &UserId,
    session: &SessionId,
    input: &str,
) -> String {
    if let Err(e) = transcript
        .append(user.as_str(), session.as_str(), Role::User.as_str(), input)
        .await
    {
        eprintln!("  [warn] transcript write failed: {e}");
    }

    let outcome = assistant.chat(user, session, input).await;

    if let Err(e) = transcript
        .append(
            user.as_str(),
            session.as_str(),
            Role::Agent.as_str(),
            &outcome.output,
        )
        .await
    {
        eprintln!("  [warn] transcript write failed: {e}");
    }

    outcome.output
}

/// Wire the assistant from config: provider, embedder, stores, tools.
pub async fn build_assistant(config: &AppConfig) -> anyhow::Result<Assistant> {
    let provider = memoclaw_providers::from_config(config);

    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::default());

    let memory: Arc<dyn VectorMemory> = match config.memory.backend.as_str() {
        "memory" => Arc::new(InMemoryVectorStore::new(embedder)),
        _ => {
            let path = config.memory_db_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let url = format!("sqlite://{}", path.display());
            Arc::new(
                SqliteVectorStore::new(&url, embedder)
                    .await
                    .context("Failed to open the memory database")?,
            )
        }
    };

    let sessions = Arc::new(SessionStore::new(
        config.memory.session_capacity,
        config.memory.window_exchanges,
    ));

    let settings = AssistantSettings {
        persona: config.system_prompt_override.clone(),
        temperature: config.default_temperature,
        max_tokens: Some(config.default_max_tokens),
        max_iterations: config.agent.max_iterations,
        max_execution: Duration::from_secs(config.agent.max_execution_secs),
        recall_limit: config.memory.recall_limit,
    };

    Ok(Assistant::new(
        provider,
        Arc::new(memoclaw_tools::default_registry()),
        memory,
        sessions,
        settings,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_degraded_assistant_without_api_key() {
        let config = AppConfig {
            memory: memoclaw_config::MemoryConfig {
                backend: "memory".into(),
                ..Default::default()
            },
            ..AppConfig::default()
        };
        let assistant = build_assistant(&config).await.unwrap();
        assert!(!assistant.is_configured());
    }
}
