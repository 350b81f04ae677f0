pub mod search_hit;
pub mod vector_record;
