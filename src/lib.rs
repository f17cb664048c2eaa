//! Todo Service Library
//!
//! This library provides the controller, storage strategies, and renderer
//! for a small todo-list web service. Items are kept either in process
//! memory (positional ids) or in a `SQLite` table (durable ids).

pub mod api;
pub mod domain;
pub mod infrastructure;
