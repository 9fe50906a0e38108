// gametail - platform/mod.rs
//
// Platform abstraction layer: config directories and the OS process table.
// Dependencies: core types, directories, sysinfo.
// Must NOT depend on: app.

pub mod config;
pub mod process;
