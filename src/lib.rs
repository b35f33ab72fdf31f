pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod prompt;
pub mod table;
pub mod taxonomy;
pub mod writer;
