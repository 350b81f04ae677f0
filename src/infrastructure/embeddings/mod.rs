pub mod char_stats;
pub mod hashing;
pub mod noop;
pub mod openai;
