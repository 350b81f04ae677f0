use clap::Parser;
use docvault::cli::commands::{Cli, Commands};
use docvault::config::Config;
use docvault::domain::entities::vector_record::Metadata;
use docvault::domain::error::DomainError;
use docvault::SearchService;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const LIST_PREVIEW_CHARS: usize = 80;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docvault=info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error reading configuration: {e}");
            std::process::exit(1);
        }
    };

    let service = match SearchService::open(&config) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Error initializing docvault: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(service, cli.command).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(service: SearchService, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Add {
            text,
            file,
            id,
            metadata,
        } => {
            let mut meta: Metadata = match metadata {
                Some(json) => serde_json::from_str(&json)
                    .map_err(|e| DomainError::InvalidInput(format!("metadata must be a JSON object: {e}")))?,
                None => Metadata::new(),
            };
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => {
                    meta.entry("source_filename")
                        .or_insert_with(|| file_name(&path).into());
                    let bytes = std::fs::read(&path)?;
                    String::from_utf8_lossy(&bytes).into_owned()
                }
                (None, None) => return Err("provide document text or --file".into()),
            };

            let id = service.add_document_with_id(id, text, meta).await?;
            let record = service
                .get_document(&id)?
                .ok_or_else(|| DomainError::NotFound(id.clone()))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "id": record.id,
                    "embedding_status": record.embedding_status,
                    "dimension": record.dimension(),
                }))?
            );
        }
        Commands::Get { id } => {
            let record = service
                .get_document(&id)?
                .ok_or_else(|| DomainError::NotFound(id.clone()))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Delete { id } => {
            if !service.delete_document(&id)? {
                return Err(DomainError::NotFound(id).into());
            }
            println!("Deleted {id}");
        }
        Commands::List => {
            let summaries: Vec<serde_json::Value> = service
                .list_documents()?
                .into_iter()
                .map(|r| {
                    serde_json::json!({
                        "id": r.id,
                        "embedding_status": r.embedding_status,
                        "dimension": r.dimension(),
                        "text_preview": r.text_preview(LIST_PREVIEW_CHARS),
                        "metadata": r.metadata,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        Commands::Search { query, limit } => {
            let hits = service.search(&query, limit).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "query": query,
                    "results": hits,
                }))?
            );
        }
        Commands::Stats => {
            let stats = service.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Reindex => {
            let count = service.reindex().await?;
            println!("Reindexed {count} documents");
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "uploaded_file".to_string())
}
