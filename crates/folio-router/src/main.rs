//! Folio Router CLI
//!
//! Starts the HTTP server for public agent chat and knowledge processing.

use anyhow::Context;
use folio_router::{build_providers, config::FolioConfig, start_server};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        let config_path = &args[2];
        FolioConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path))?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        tracing::warn!("No config file specified, using in-memory store and mock providers");
        tracing::warn!("Usage: folio-router --config <path-to-config.toml>");
        FolioConfig::default_test_config()
    };

    // Blocking provider clients are built and finally dropped outside the runtime.
    let (chat, embedder) = build_providers(&config.provider).context("Failed to build model providers")?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime
        .block_on(start_server(config, chat.clone(), embedder.clone()))
        .context("Server stopped")?;

    Ok(())
}

fn print_help() {
    println!("Folio Router - Portfolio agent chat and knowledge service");
    println!();
    println!("USAGE:");
    println!("    folio-router --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    [server]      bind_address, bind_port, database_path");
    println!("    [provider]    kind (openai|mock), api_base, api_key_env, embedding_model");
    println!("    [chunking]    target_words, max_words, min_words");
    println!("    [ingest]      fetch_timeout_secs, max_document_bytes");
    println!("    [responder]   retrieval_top_k, history_window, generation_timeout_secs, ...");
    println!("    [guard]       min_confidence and per-strategy lead policies");
    println!("    [alerts]      failure_spike and misconfiguration thresholds");
    println!("    [[agents]]    optional seed agents for local development");
    println!();
    println!("Log level is controlled with RUST_LOG (default: info).");
}
