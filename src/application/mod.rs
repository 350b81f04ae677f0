pub mod add_document;
pub mod documents;
pub mod embed;
pub mod reindex;
pub mod search;
pub mod stats;
