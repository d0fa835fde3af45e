pub mod analyzers;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod output;
pub mod record;
pub mod source;
