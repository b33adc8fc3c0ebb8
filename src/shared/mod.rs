//! Usage: Cross-cutting helpers (errors, masking, blocking bridge, clock).

pub mod blocking;
pub mod error;
pub(crate) mod security;
pub(crate) mod time;
