//! Usage: Domain modules (freeze payload, listing collection, submission).

pub mod collector;
pub mod freeze;
pub mod submission;
