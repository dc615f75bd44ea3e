// Domain layer: bubble values, gameplay tuning, and collaborator ports.

pub mod bubble;
pub mod errors;
pub mod ports;
pub mod tuning;

pub use bubble::{BubbleColor, BubbleState};
pub use errors::BoardError;
pub use ports::{GameOutcome, GameOverListener, RedrawSignal};
pub use tuning::BoardTuning;
