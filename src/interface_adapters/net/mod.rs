// Network adapter modules split by the presentation socket vs lifecycle HTTP routes.

pub mod client;
pub mod internal;

pub use client::{spawn_world_serializer, ws_handler};
pub use internal::{restart_handler, resume_handler, stats_handler, suspend_handler};
