// Construction-time failures for the board.
//
// Runtime conditions (stale updates, out-of-bounds moves, repeated lifecycle calls)
// are absorbed where they happen and never surface as errors.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),
}
