// Use cases layer: drivers, the board, and the task that owns it.

pub mod board;
pub mod driver;
pub mod factory;
pub mod game;
pub mod types;

pub use board::{Board, BoardBuilder, BoardPhase, WorldSnapshot};
pub use driver::{BubbleDriver, BubbleUpdate, DriverId, RunningDriver};
pub use factory::BubbleFactory;
pub use game::{RedrawFlag, board_task};
pub use types::{BoardCommand, WorldUpdate};
