//! Shared constants and small numeric helpers

pub mod constants;
