//! Syllabus Buddy CLI
//!
//! Ingest department syllabus documents, ask questions from the terminal, or
//! serve the web UI.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use syllabus_buddy::{
    config::Config,
    department::Department,
    ingest::{IngestOptions, ingest_directory},
    llm::LlmClient,
    rag::QueryPipeline,
    store::{SaveFormat, VectorStore, store_size},
    web::{self, AppState},
};

/// Syllabus Buddy - syllabus question answering per department
#[derive(Parser)]
#[command(name = "syllabus-buddy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web UI
    Serve {
        /// Address to listen on (defaults to the configured bind address)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Ask a question from the terminal
    Ask {
        /// The question
        question: String,

        /// Department code (cse, aiml, ece, it, csbs, ds)
        #[arg(short, long)]
        department: Department,

        /// Number of chunks to retrieve (defaults to the configured top-k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Chunk, embed and store a directory of syllabus text files
    Ingest {
        /// Department code (cse, aiml, ece, it, csbs, ds)
        department: Department,

        /// Directory containing .txt / .md syllabus files
        documents: PathBuf,

        /// Clear the existing store first
        #[arg(long)]
        reset: bool,

        /// Write the store as JSON instead of bincode
        #[arg(long)]
        json: bool,
    },

    /// List departments and their store paths
    Departments,

    /// Show information about a department store
    Info {
        /// Department code
        department: Department,
    },

    /// Test LLM API connection
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init()
        .ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => cmd_serve(bind).await,
        Commands::Ask {
            question,
            department,
            top_k,
        } => cmd_ask(question, department, top_k).await,
        Commands::Ingest {
            department,
            documents,
            reset,
            json,
        } => cmd_ingest(department, documents, reset, json).await,
        Commands::Departments => cmd_departments(),
        Commands::Info { department } => cmd_info(department),
        Commands::Test => cmd_test().await,
    }
}

fn load_config() -> Result<Config> {
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn build_pipeline(config: &Config, top_k: Option<usize>) -> QueryPipeline {
    let client = Arc::new(LlmClient::new(config.llm.clone()));
    QueryPipeline::new(client.clone(), client, config.store.prefix.clone())
        .with_top_k(top_k.unwrap_or(config.store.top_k))
}

async fn cmd_serve(bind: Option<String>) -> Result<()> {
    let config = load_config()?;
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());

    println!("Using model: {}", config.llm.model);
    println!("Serving Syllabus Helper on http://{}", bind);

    let state = AppState {
        pipeline: build_pipeline(&config, None),
    };
    web::serve(state, &bind)
        .await
        .with_context(|| format!("Failed to serve on {}", bind))
}

async fn cmd_ask(question: String, department: Department, top_k: Option<usize>) -> Result<()> {
    if question.trim().is_empty() {
        println!("Please enter a query.");
        return Ok(());
    }

    let config = load_config()?;
    let pipeline = build_pipeline(&config, top_k);

    println!("Department: {}", department);
    println!("Using model: {}", config.llm.model);
    println!("Hold on!\n");

    let start = Instant::now();
    let answer = pipeline
        .query(&question, department)
        .await
        .context("Query failed")?;

    println!("Answer:");
    println!("{}", "─".repeat(60));
    println!("{}", answer.response_text);
    println!("{}", "─".repeat(60));

    println!("Sources:");
    for source in &answer.sources {
        println!("  - {}", source.as_deref().unwrap_or("(no id)"));
    }

    println!("\nContext:");
    println!("{}", answer.context);
    println!("\nAnswered in {:.2?}", start.elapsed());

    Ok(())
}

async fn cmd_ingest(
    department: Department,
    documents: PathBuf,
    reset: bool,
    json: bool,
) -> Result<()> {
    let config = load_config()?;
    let store_path = department.store_path(&config.store.prefix);

    println!("Ingesting {} into {}", documents.display(), store_path.display());
    println!("Embedding model: {}", config.llm.embedding_model);

    let mut store = VectorStore::load_or_new(&store_path, &config.llm.embedding_model)
        .context("Failed to open vector store")?;

    let client = LlmClient::new(config.llm.clone());
    let options = IngestOptions {
        reset,
        embedding_model: Some(config.llm.embedding_model.clone()),
        ..Default::default()
    };

    let start = Instant::now();
    let report = ingest_directory(&mut store, &documents, &client, &options)
        .await
        .context("Ingestion failed")?;

    let format = if json {
        SaveFormat::Json
    } else {
        SaveFormat::Bincode
    };
    let path = store.save(&store_path, format).context("Failed to save vector store")?;

    println!("\nIngestion complete:");
    println!("  Files:        {}", report.files);
    println!("  Added:        {}", report.added);
    println!("  Already had:  {}", report.skipped_existing);
    println!("  Total chunks: {}", report.total);
    println!("  Time:         {:.2?}", start.elapsed());
    println!("  Saved to:     {}", path.display());

    Ok(())
}

fn cmd_departments() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    println!("Departments");
    println!("{}", "─".repeat(60));
    for department in Department::ALL {
        let path = department.store_path(&config.store.prefix);
        let status = if path.is_dir() { "ready" } else { "not ingested" };
        println!(
            "  {:<5} {:<56} {} ({})",
            department.code(),
            department.label(),
            path.display(),
            status
        );
    }

    Ok(())
}

fn cmd_info(department: Department) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let store_path = department.store_path(&config.store.prefix);

    let store = VectorStore::load(&store_path).context("Failed to load vector store")?;
    let size = store_size(&store_path)?;

    println!("Vector Store Information");
    println!("{}", "─".repeat(40));
    println!("  Department:       {}", department.label());
    println!("  Chunks:           {}", store.len());
    println!(
        "  Dimension:        {}",
        store
            .dimension()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  Embedding model:  {}", store.embedding_model);
    println!("  File size:        {:.1} KB", size as f64 / 1024.0);
    println!("  Store path:       {}", store_path.display());

    Ok(())
}

async fn cmd_test() -> Result<()> {
    println!("Testing LLM connection...\n");

    let config = Config::load().context("Failed to load configuration")?;

    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    println!(
        "  API Key:   {}...",
        config.llm.api_key.chars().take(8).collect::<String>()
    );
    println!();

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = LlmClient::new(config.llm);

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => {
            println!("Connection successful!");
        }
        Err(e) => {
            println!("Connection failed: {}", e);
        }
    }

    Ok(())
}
