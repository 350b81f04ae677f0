use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docvault", about = "Document vector store with similarity search")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add (or replace) a document
    Add {
        /// Document text; omit to read --file
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,
        /// Read the text from a file and record its name as source_filename
        #[arg(long)]
        file: Option<PathBuf>,
        /// Reuse this id instead of generating one
        #[arg(long)]
        id: Option<String>,
        /// JSON object of metadata
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Show a stored document
    Get {
        id: String,
    },
    /// Delete a document
    Delete {
        id: String,
    },
    /// List stored documents
    List,
    /// Similarity search
    Search {
        query: String,
        #[arg(long, short = 'k', default_value = "5")]
        limit: usize,
    },
    /// Show store statistics
    Stats,
    /// Embed documents stored without a vector
    Reindex,
}
