// Ports the board calls out through; implemented by the host.

/// Final result of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub won: bool,
}

// Port for telling the presentation layer that the world changed.
pub trait RedrawSignal: Send + Sync {
    fn request_redraw(&self);
}

// Port for the host application's end-of-game handling (statistics, restart prompt).
pub trait GameOverListener: Send + Sync {
    fn game_over(&self, outcome: GameOutcome);
}
