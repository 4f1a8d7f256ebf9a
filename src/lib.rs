// ABOUTME: Library root for endrun - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod command;
pub mod config;
pub mod discovery;
pub mod error;
pub mod runner;
pub mod ssh;
