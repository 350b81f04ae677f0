pub mod document_store;
pub mod embedding_port;
pub mod similarity_index;
