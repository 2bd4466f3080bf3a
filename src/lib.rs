pub mod config;
pub mod driver;
pub mod llm;
pub mod output;
pub mod validate;
