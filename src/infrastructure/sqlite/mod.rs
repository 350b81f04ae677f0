pub mod document_store;
pub mod migrations;
