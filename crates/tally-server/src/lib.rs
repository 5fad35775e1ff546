//! Tally server library - HTTP boundary for the calculator core.
//!
//! Routes, error mapping, configuration and application state live here,
//! separate from main.rs so the router can be driven from integration tests.

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;
