//! Public facade crate for `sonarpipe`.
//!
//! This crate contains no IO or provider-specific logic.
//! It re-exports the backend-agnostic types/traits from `sonarpipe-core`.

pub use sonarpipe_core::*;
