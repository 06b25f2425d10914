//! `sonarpipe-mcp` crate (library surface).
//!
//! The primary entrypoint for end users is the `sonarpipe` binary (CLI + MCP stdio).
//! This library module re-exports the core types for embedding without depending
//! on internal crate layout.

pub use sonarpipe_core as core;
