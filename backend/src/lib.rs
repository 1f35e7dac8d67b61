//! Medical AI Platform Backend Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod agents;
pub mod api;
pub mod config;
/// Agent registry, status tracking and aggregate analysis
pub mod coordinator;
pub mod error;
/// Application state shared with request handlers
pub mod state;
