//! Usage: Infrastructure adapters (settings file).

pub mod settings;
