// Use-case level inputs/outputs for the board task.

use super::board::{BoardPhase, WorldSnapshot};
use tokio::sync::oneshot;

/// Requests the host surfaces send into the board task.
#[derive(Debug)]
pub enum BoardCommand {
    /// Visible surface size reported by the presentation side.
    Viewport { width: f32, height: f32 },
    /// Player move in virtual coordinates.
    MovePlayer {
        x: f32,
        y: f32,
        reply: oneshot::Sender<bool>,
    },
    Suspend { reply: oneshot::Sender<BoardPhase> },
    Resume { reply: oneshot::Sender<BoardPhase> },
    Restart { reply: oneshot::Sender<BoardPhase> },
}

#[derive(Debug, Clone)]
pub struct WorldUpdate {
    pub tick: u64,
    pub snapshot: WorldSnapshot,
}
