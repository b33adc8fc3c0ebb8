//! Usage: Binary-facing layer (arguments, logging, prompts, workflow).

pub mod cli;
pub(crate) mod logging;
pub(crate) mod prompts;
pub(crate) mod workflow;
