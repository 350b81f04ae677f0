pub mod embeddings;
pub mod index;
pub mod sqlite;
