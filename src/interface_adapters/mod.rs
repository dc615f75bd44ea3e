// Interface adapters: wire protocol, network handling, and stats persistence.

pub mod http;
pub mod net;
pub mod protocol;
pub mod state;
pub mod stats;
