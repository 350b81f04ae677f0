pub mod embedding_status;
pub mod similarity;
