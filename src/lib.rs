// gametail - lib.rs
//
// Library entry point, exposing all modules for integration testing and for
// hosts (overlays, bots) that embed the tailer instead of running the CLI.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
