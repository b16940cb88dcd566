//! Gateway - define data-source schemas and chat with them

pub mod backend;
pub mod chat;
pub mod cli;
pub mod config;
pub mod schema;
