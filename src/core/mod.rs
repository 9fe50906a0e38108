// gametail - core/mod.rs
//
// Core data types and line handling.
// Dependencies: util, standard library.
// Must NOT depend on: app, platform.

pub mod backlog;
pub mod format;
pub mod line_source;
pub mod model;
