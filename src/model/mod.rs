pub mod address;
pub mod batcher;
pub mod config;
pub mod entry;
pub mod error;
pub mod reinsert;
pub mod scanner;
pub mod script;
pub mod walker;
