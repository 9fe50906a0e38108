// gametail - app/mod.rs
//
// Application layer: tail session orchestration and host-side dispatch.
// Dependencies: core, platform, util.

pub mod dispatch;
pub mod liveness;
pub mod tail;
