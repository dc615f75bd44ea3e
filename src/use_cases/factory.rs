// Builds opponent drivers for a board of a given size.

use super::driver::{BubbleDriver, BubbleUpdate};
use crate::domain::{BoardTuning, BubbleColor, BubbleState};
use crate::systems::movement::{self, MovementConfig};
use crate::systems::spawning;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::f32::consts::TAU;
use tokio::sync::mpsc;

pub struct BubbleFactory {
    screen_width: f32,
    screen_height: f32,
    tuning: BoardTuning,
    rng: Pcg32,
    update_tx: mpsc::Sender<BubbleUpdate>,
}

impl BubbleFactory {
    pub fn new(
        screen_width: f32,
        screen_height: f32,
        tuning: BoardTuning,
        rng: Pcg32,
        update_tx: mpsc::Sender<BubbleUpdate>,
    ) -> Self {
        Self {
            screen_width,
            screen_height,
            tuning,
            rng,
            update_tx,
        }
    }

    /// Creates an unstarted driver for a fresh bubble.
    ///
    /// The bubble starts in the border ring with a radius drawn from
    /// `[min_radius, max_radius]` and a random heading. The caller registers the
    /// driver and then starts it.
    pub fn make_bubble(&mut self, color: BubbleColor, max_radius: f32) -> BubbleDriver {
        let cap = max_radius.clamp(self.tuning.min_radius, self.tuning.max_radius);
        let radius = self.rng.random_range(self.tuning.min_radius..=cap);
        let heading = self.rng.random_range(0.0..TAU);
        let (x, y) = spawning::border_position(
            self.screen_width,
            self.screen_height,
            self.tuning.border,
            &mut self.rng,
        );

        let cfg = self.movement();
        let state = movement::confine(
            BubbleState::new(color, x, y, radius, heading),
            cfg.board_width,
            cfg.board_height,
        );
        self.driver_for(state)
    }

    /// Creates an unstarted driver that continues from an existing state.
    pub fn driver_for(&mut self, state: BubbleState) -> BubbleDriver {
        BubbleDriver::new(
            state,
            self.movement(),
            self.tuning.tick_interval,
            Pcg32::from_rng(&mut self.rng),
            self.update_tx.clone(),
        )
    }

    fn movement(&self) -> MovementConfig {
        MovementConfig {
            step: self.tuning.step,
            board_width: self.screen_width + 2.0 * self.tuning.border,
            board_height: self.screen_height + 2.0 * self.tuning.border,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> BubbleFactory {
        let (tx, _rx) = mpsc::channel(8);
        BubbleFactory::new(800.0, 480.0, BoardTuning::default(), Pcg32::seed_from_u64(21), tx)
    }

    #[test]
    fn new_bubbles_respect_radius_bounds() {
        let mut factory = factory();
        let tuning = BoardTuning::default();

        for _ in 0..500 {
            let state = factory.make_bubble(BubbleColor::WHITE, tuning.max_radius).state();
            assert!(state.radius >= tuning.min_radius && state.radius <= tuning.max_radius);

            let capped = factory.make_bubble(BubbleColor::WHITE, 15.0).state();
            assert!(capped.radius >= tuning.min_radius && capped.radius <= 15.0);
        }
    }

    #[test]
    fn new_bubbles_spawn_off_screen_and_on_the_board() {
        let mut factory = factory();
        let b = BoardTuning::default().border;

        for _ in 0..500 {
            let s = factory.make_bubble(BubbleColor::WHITE, 120.0).state();
            let on_screen = s.x > b && s.x < b + 800.0 && s.y > b && s.y < b + 480.0;
            assert!(!on_screen, "spawned on screen: {s:?}");
            assert!(s.x - s.radius >= 0.0 && s.x + s.radius <= 800.0 + 2.0 * b);
            assert!(s.y - s.radius >= 0.0 && s.y + s.radius <= 480.0 + 2.0 * b);
        }
    }

    #[test]
    fn cap_below_minimum_still_yields_minimum_radius() {
        let mut factory = factory();
        let state = factory.make_bubble(BubbleColor::WHITE, 1.0).state();
        assert_eq!(state.radius, BoardTuning::default().min_radius);
    }

    #[test]
    fn driver_for_keeps_the_given_state() {
        let mut factory = factory();
        let state = BubbleState::new(BubbleColor::BLACK, 10.0, 20.0, 9.0, 1.5);
        assert_eq!(factory.driver_for(state).state(), state);
    }
}
