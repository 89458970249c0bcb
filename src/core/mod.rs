pub mod config;
pub mod database;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod session;
pub mod templates;
