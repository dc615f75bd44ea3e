use crate::interface_adapters::stats::GameStats;
use crate::use_cases::{BoardCommand, BoardPhase, WorldUpdate};
use axum::extract::ws::Utf8Bytes;
use std::sync::Arc;
use tokio::sync::{Notify, broadcast, mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    // Requests flowing from the network into the board task.
    pub command_tx: mpsc::Sender<BoardCommand>,
    // World updates produced by the board task (domain structs).
    pub world_tx: broadcast::Sender<WorldUpdate>,
    // Serialized world updates, shared across all connections.
    pub world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    // Latest serialized world update for lag recovery.
    pub world_latest_tx: watch::Sender<Utf8Bytes>,
    // Current board phase.
    pub phase_tx: watch::Sender<BoardPhase>,
    pub stats: Arc<GameStats>,
    // Border width, for converting between visible and virtual coordinates.
    pub border: f32,
    // Stops the board task.
    pub shutdown: Arc<Notify>,
}
