pub mod config;
pub mod mcp;
pub mod models;
pub mod platform;
pub mod registry;
