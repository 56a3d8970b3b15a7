pub mod cache;
pub mod parser;
pub mod provider;
