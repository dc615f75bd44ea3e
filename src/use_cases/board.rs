// The board: sole owner of the world, reconciling driver updates once per refresh.

use super::driver::{BubbleDriver, BubbleUpdate, DriverId, RunningDriver};
use super::factory::BubbleFactory;
use crate::domain::{
    BoardError, BoardTuning, BubbleColor, BubbleState, GameOutcome, GameOverListener,
    RedrawSignal,
};
use crate::systems::collisions::{self, CollisionConfig};
use crate::systems::spawning;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub const PLAYER_COLOR: BubbleColor = BubbleColor::BLACK;
pub const SPAWN_COLOR: BubbleColor = BubbleColor::WHITE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPhase {
    /// Waiting for the visible surface size.
    Uninitialized,
    Active,
    Suspended,
    GameOver { won: bool },
}

/// Read-only copy of the world for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub phase: BoardPhase,
    pub player: Option<BubbleState>,
    pub opponents: Vec<BubbleState>,
}

#[derive(Debug, Clone, Copy)]
struct Surface {
    width: f32,
    height: f32,
}

/// Collects the board's collaborators; missing ones are rejected by [`BoardBuilder::build`].
#[derive(Default)]
pub struct BoardBuilder {
    tuning: Option<BoardTuning>,
    redraw: Option<Arc<dyn RedrawSignal>>,
    game_over: Option<Arc<dyn GameOverListener>>,
    seed: Option<u64>,
}

impl BoardBuilder {
    pub fn tuning(mut self, tuning: BoardTuning) -> Self {
        self.tuning = Some(tuning);
        self
    }

    pub fn redraw_signal(mut self, redraw: Arc<dyn RedrawSignal>) -> Self {
        self.redraw = Some(redraw);
        self
    }

    pub fn game_over_listener(mut self, listener: Arc<dyn GameOverListener>) -> Self {
        self.game_over = Some(listener);
        self
    }

    /// Fixes the random stream, for reproducible spawns in tests.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<Board, BoardError> {
        let tuning = self.tuning.unwrap_or_default();
        tuning.validate()?;
        let redraw = self
            .redraw
            .ok_or(BoardError::MissingCollaborator("redraw signal"))?;
        let game_over = self
            .game_over
            .ok_or(BoardError::MissingCollaborator("game over listener"))?;
        let rng = match self.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_rng(&mut rand::rng()),
        };

        let (update_tx, update_rx) = mpsc::channel(tuning.update_channel_capacity);

        Ok(Board {
            tuning,
            redraw,
            game_over,
            rng,
            update_tx,
            update_rx,
            next_driver_id: 1,
            phase: BoardPhase::Uninitialized,
            surface: None,
            factory: None,
            player: None,
            opponents: BTreeMap::new(),
            drivers: HashMap::new(),
            active_count: 0,
            suspended: Vec::new(),
        })
    }
}

/// Authoritative game state.
///
/// Only the task that owns the board mutates it. Drivers talk to it solely through the
/// update channel, and the board talks back through `stop`/`mark_consumed`.
pub struct Board {
    tuning: BoardTuning,
    redraw: Arc<dyn RedrawSignal>,
    game_over: Arc<dyn GameOverListener>,
    rng: Pcg32,

    update_tx: mpsc::Sender<BubbleUpdate>,
    update_rx: mpsc::Receiver<BubbleUpdate>,
    next_driver_id: u64,

    phase: BoardPhase,
    surface: Option<Surface>,
    factory: Option<BubbleFactory>,

    // World.
    player: Option<BubbleState>,
    opponents: BTreeMap<DriverId, BubbleState>,
    drivers: HashMap<DriverId, RunningDriver>,
    active_count: usize,

    // Opponent states captured by the last suspend, in driver order.
    suspended: Vec<BubbleState>,
}

impl Board {
    pub fn builder() -> BoardBuilder {
        BoardBuilder::default()
    }

    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    pub fn tuning(&self) -> &BoardTuning {
        &self.tuning
    }

    pub fn player(&self) -> Option<BubbleState> {
        self.player
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn opponent(&self, id: DriverId) -> Option<BubbleState> {
        self.opponents.get(&id).copied()
    }

    pub fn opponent_ids(&self) -> Vec<DriverId> {
        self.opponents.keys().copied().collect()
    }

    pub fn suspended_len(&self) -> usize {
        self.suspended.len()
    }

    /// Visible surface size, once known.
    pub fn screen_size(&self) -> Option<(f32, f32)> {
        self.surface.map(|s| (s.width, s.height))
    }

    /// Virtual surface size (visible surface plus the border), once known.
    pub fn board_size(&self) -> Option<(f32, f32)> {
        let border = self.tuning.border;
        self.surface
            .map(|s| (s.width + 2.0 * border, s.height + 2.0 * border))
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let opponents = match self.phase {
            BoardPhase::Suspended => self.suspended.clone(),
            _ => self.opponents.values().copied().collect(),
        };
        WorldSnapshot {
            phase: self.phase,
            player: self.player,
            opponents,
        }
    }

    /// Records the visible surface size and places the player in its center.
    ///
    /// Only the first call of a game has an effect; later calls return false.
    pub fn initialize(&mut self, screen_width: f32, screen_height: f32) -> bool {
        if self.phase != BoardPhase::Uninitialized {
            return false;
        }
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(screen_width) || !valid(screen_height) {
            debug!(screen_width, screen_height, "ignoring invalid surface size");
            return false;
        }

        let border = self.tuning.border;
        self.surface = Some(Surface {
            width: screen_width,
            height: screen_height,
        });
        self.player = Some(BubbleState::new(
            PLAYER_COLOR,
            border + screen_width / 2.0,
            border + screen_height / 2.0,
            self.tuning.player_start_radius,
            0.0,
        ));
        self.factory = Some(BubbleFactory::new(
            screen_width,
            screen_height,
            self.tuning,
            Pcg32::from_rng(&mut self.rng),
            self.update_tx.clone(),
        ));
        self.phase = BoardPhase::Active;

        info!(screen_width, screen_height, "board initialized");
        self.redraw.request_redraw();
        true
    }

    /// Replaces a driver's state. Updates from drivers that are no longer active are
    /// dropped; returns whether the update was applied.
    pub fn apply_update(&mut self, update: BubbleUpdate) -> bool {
        if self.phase != BoardPhase::Active {
            return false;
        }
        let Some(slot) = self.opponents.get_mut(&update.driver) else {
            return false;
        };

        *slot = update.state;
        self.redraw.request_redraw();
        true
    }

    /// Applies every update queued so far without waiting for more.
    pub fn drain_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.update_rx.try_recv() {
            if self.apply_update(update) {
                applied += 1;
            }
        }
        applied
    }

    /// One collision pass over the current world. Returns the outcome if it ended the game.
    pub fn resolve_collisions(&mut self) -> Option<GameOutcome> {
        if self.phase != BoardPhase::Active {
            return None;
        }
        let player = self.player.as_mut()?;

        let report = collisions::resolve(
            player,
            &mut self.opponents,
            CollisionConfig {
                max_radius: self.tuning.max_radius,
                target_radius: self.tuning.player_target_radius,
            },
        );

        for id in &report.consumed {
            if let Some(driver) = self.drivers.remove(id) {
                driver.mark_consumed();
            }
            self.active_count -= 1;
        }
        self.check_population();

        if !report.consumed.is_empty() {
            debug!(consumed = report.consumed.len(), remaining = self.active_count, "collisions resolved");
            self.redraw.request_redraw();
        }

        if let Some(outcome) = report.outcome {
            self.end_game(outcome);
        }
        report.outcome
    }

    /// Admits one new opponent if there is room.
    pub fn maybe_spawn(&mut self) -> Option<DriverId> {
        if self.phase != BoardPhase::Active || self.active_count >= self.tuning.max_population {
            return None;
        }
        let player_radius = self.player?.radius;

        let larger = spawning::count_larger_than(self.opponents.values(), player_radius);
        let cap = spawning::spawn_radius_cap(larger, player_radius, &self.tuning);
        let driver = self.factory.as_mut()?.make_bubble(SPAWN_COLOR, cap);

        let id = self.register(driver);
        debug!(driver = id.raw(), cap, larger, "spawned opponent");
        Some(id)
    }

    /// One presentation refresh: apply queued updates, resolve collisions, then top up
    /// the population.
    pub fn refresh(&mut self) -> Option<GameOutcome> {
        self.drain_updates();
        let outcome = self.resolve_collisions();
        if outcome.is_none() {
            self.maybe_spawn();
        }
        outcome
    }

    /// Moves the player to `(x, y)` in virtual coordinates. Rejected when not playing or
    /// when any part of the player would leave the visible surface.
    pub fn request_player_move(&mut self, x: f32, y: f32) -> bool {
        if self.phase != BoardPhase::Active {
            return false;
        }
        let (Some(player), Some(surface)) = (self.player, self.surface) else {
            return false;
        };
        if !x.is_finite() || !y.is_finite() {
            return false;
        }

        let border = self.tuning.border;
        let r = player.radius;
        let inside = x - r >= border
            && x + r <= border + surface.width
            && y - r >= border
            && y + r <= border + surface.height;
        if !inside {
            return false;
        }

        self.player = Some(player.with_position(x, y));
        self.redraw.request_redraw();
        true
    }

    /// Stops every opponent and keeps its last state for [`Board::resume`]. No-op unless
    /// the game is active.
    pub fn suspend(&mut self) {
        if self.phase != BoardPhase::Active {
            return;
        }

        for driver in self.drivers.values() {
            driver.stop();
        }
        self.drivers.clear();
        self.suspended = std::mem::take(&mut self.opponents).into_values().collect();
        self.active_count = 0;
        self.phase = BoardPhase::Suspended;
        self.check_population();

        info!(suspended = self.suspended.len(), "board suspended");
        self.redraw.request_redraw();
    }

    /// Rebuilds one driver per suspended state. No-op unless suspended.
    pub fn resume(&mut self) {
        if self.phase != BoardPhase::Suspended {
            return;
        }

        self.phase = BoardPhase::Active;
        let states = std::mem::take(&mut self.suspended);
        let restored = states.len();
        for state in states {
            let Some(factory) = self.factory.as_mut() else {
                break;
            };
            let driver = factory.driver_for(state);
            self.register(driver);
        }

        info!(restored, "board resumed");
        self.redraw.request_redraw();
    }

    /// Host teardown; same as [`Board::suspend`].
    pub fn stop(&mut self) {
        self.suspend();
    }

    /// Discards the current game and starts a fresh one.
    ///
    /// The surface size is kept, so a board that was already sized goes straight back
    /// to `Active` with the player centered.
    pub fn restart(&mut self) {
        self.suspend();
        self.stop_all_drivers();

        self.player = None;
        self.opponents.clear();
        self.active_count = 0;
        self.suspended.clear();
        self.factory = None;
        self.phase = BoardPhase::Uninitialized;
        info!("board restarted");

        match self.surface {
            Some(surface) => {
                self.initialize(surface.width, surface.height);
            }
            None => self.redraw.request_redraw(),
        }
    }

    fn end_game(&mut self, outcome: GameOutcome) {
        if matches!(self.phase, BoardPhase::GameOver { .. }) {
            return;
        }

        self.phase = BoardPhase::GameOver { won: outcome.won };
        // The last opponent states stay in the world for the final frame.
        self.stop_all_drivers();

        info!(won = outcome.won, opponents = self.active_count, "game over");
        self.game_over.game_over(outcome);
        self.redraw.request_redraw();
    }

    fn register(&mut self, driver: BubbleDriver) -> DriverId {
        let id = DriverId::new(self.next_driver_id);
        self.next_driver_id += 1;

        // Registered before it starts, so its first update always finds it.
        self.opponents.insert(id, driver.state());
        self.active_count += 1;
        self.drivers.insert(id, driver.start(id));
        self.check_population();

        self.redraw.request_redraw();
        id
    }

    fn stop_all_drivers(&mut self) {
        for (_, driver) in self.drivers.drain() {
            driver.stop();
        }
    }

    fn check_population(&self) {
        debug_assert_eq!(self.active_count, self.opponents.len());
        debug_assert!(self.active_count <= self.tuning.max_population);
    }
}
