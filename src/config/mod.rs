//! Gateway configuration module
//! Handles loading, saving, and managing the config file

pub mod config;

pub use config::Config;
