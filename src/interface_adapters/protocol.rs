// Wire protocol DTOs and conversions for the presentation websocket.
// The board works in virtual coordinates; everything on the wire is relative to the
// visible surface, so conversions take the border width.

use crate::domain::BubbleState;
use crate::use_cases::{BoardPhase, WorldUpdate};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // World as of the latest refresh that changed it.
    WorldUpdate(WorldUpdateDto),
    // Answer to a Move request.
    MoveResult { accepted: bool },
    // Board phase transitions.
    GameState(PhaseDto),
    // Terminal notification, sent once per finished game.
    GameOver { won: bool },
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Visible surface size; the first one starts the game.
    Viewport { width: f32, height: f32 },
    // Pointer position on the visible surface.
    Move { x: f32, y: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BubbleDto {
    pub color: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl BubbleDto {
    pub fn from_state(state: &BubbleState, border: f32) -> Self {
        Self {
            color: state.color.0,
            x: state.x - border,
            y: state.y - border,
            radius: state.radius,
        }
    }
}

/// Snapshot of the world sent to clients on each redraw.
#[derive(Debug, Clone, Serialize)]
pub struct WorldUpdateDto {
    pub tick: u64,
    pub phase: PhaseDto,
    pub player: Option<BubbleDto>,
    pub opponents: Vec<BubbleDto>,
}

impl WorldUpdateDto {
    pub fn from_update(update: &WorldUpdate, border: f32) -> Self {
        let snapshot = &update.snapshot;
        Self {
            tick: update.tick,
            phase: snapshot.phase.into(),
            player: snapshot
                .player
                .as_ref()
                .map(|p| BubbleDto::from_state(p, border)),
            opponents: snapshot
                .opponents
                .iter()
                .map(|o| BubbleDto::from_state(o, border))
                .collect(),
        }
    }
}

/// Board phase as seen by clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PhaseDto {
    Uninitialized,
    Active,
    Suspended,
    GameOver { won: bool },
}

impl From<BoardPhase> for PhaseDto {
    fn from(phase: BoardPhase) -> Self {
        match phase {
            BoardPhase::Uninitialized => PhaseDto::Uninitialized,
            BoardPhase::Active => PhaseDto::Active,
            BoardPhase::Suspended => PhaseDto::Suspended,
            BoardPhase::GameOver { won } => PhaseDto::GameOver { won },
        }
    }
}

/// Translates a pointer position on the visible surface into virtual coordinates.
pub fn to_virtual(x: f32, y: f32, border: f32) -> (f32, f32) {
    (x + border, y + border)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BubbleColor;
    use crate::use_cases::WorldSnapshot;
    use serde_json::json;

    #[test]
    fn client_messages_use_type_and_data_tags() {
        let viewport: ClientMessage =
            serde_json::from_value(json!({"type": "Viewport", "data": {"width": 800.0, "height": 480.0}}))
                .expect("viewport parses");
        let ClientMessage::Viewport { width, height } = viewport else {
            panic!("expected viewport, got {viewport:?}");
        };
        assert_eq!((width, height), (800.0, 480.0));

        let bad = serde_json::from_value::<ClientMessage>(json!({"type": "Shoot", "data": {}}));
        assert!(bad.is_err());
    }

    #[test]
    fn world_update_is_shifted_to_the_visible_surface() {
        let update = WorldUpdate {
            tick: 4,
            snapshot: WorldSnapshot {
                phase: BoardPhase::Active,
                player: Some(BubbleState::new(BubbleColor::BLACK, 550.0, 390.0, 20.0, 0.0)),
                opponents: vec![BubbleState::new(BubbleColor::WHITE, 100.0, 40.0, 12.0, 1.0)],
            },
        };

        let msg = ServerMessage::WorldUpdate(WorldUpdateDto::from_update(&update, 150.0));
        let value = serde_json::to_value(&msg).expect("serializes");

        assert_eq!(value["type"], "WorldUpdate");
        assert_eq!(value["data"]["tick"], 4);
        assert_eq!(value["data"]["phase"], "Active");
        assert_eq!(value["data"]["player"]["x"], 400.0);
        assert_eq!(value["data"]["player"]["y"], 240.0);
        assert_eq!(value["data"]["opponents"][0]["x"], -50.0);
        assert_eq!(value["data"]["opponents"][0]["color"], BubbleColor::WHITE.0);
    }

    #[test]
    fn game_over_phase_carries_the_outcome() {
        let msg = ServerMessage::GameState(BoardPhase::GameOver { won: false }.into());
        let value = serde_json::to_value(&msg).expect("serializes");
        assert_eq!(value, json!({"type": "GameState", "data": {"GameOver": {"won": false}}}));
    }

    #[test]
    fn pointer_positions_gain_the_border() {
        assert_eq!(to_virtual(0.0, 10.0, 150.0), (150.0, 160.0));
    }
}
