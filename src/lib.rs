// Core modules
pub mod cli;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod storage;

// Configuration and masking workflow
pub mod codec;
pub mod diff;
pub mod engine;
pub mod harness;
pub mod notification;
pub mod orchestrator;
pub mod profile;

pub use infrastructure::error::{CloudMaskError, Result};
