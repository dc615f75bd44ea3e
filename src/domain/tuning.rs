use super::errors::BoardError;
use std::time::Duration;

/// Gameplay tuning for the bubble board.
///
/// Keep this separate from runtime/server configuration (ports, refresh rate, etc.).
#[derive(Debug, Clone, Copy)]
pub struct BoardTuning {
    /// Width of the off-screen spawn border on every side of the visible surface.
    pub border: f32,

    /// Smallest radius a spawned bubble may have.
    pub min_radius: f32,

    /// Largest radius a spawned bubble may have; also the cap for growth.
    pub max_radius: f32,

    /// Maximum number of opponent bubbles alive at once.
    pub max_population: usize,

    /// Radius of the player's bubble at the start of a game.
    pub player_start_radius: f32,

    /// Player radius that wins the game.
    pub player_target_radius: f32,

    /// Sleep between two driver ticks.
    pub tick_interval: Duration,

    /// Distance a driver moves per tick.
    pub step: f32,

    /// Capacity of the driver -> board update channel.
    pub update_channel_capacity: usize,
}

impl Default for BoardTuning {
    fn default() -> Self {
        Self {
            border: 150.0,
            min_radius: 8.0,
            max_radius: 120.0,
            max_population: 12,
            player_start_radius: 20.0,
            player_target_radius: 100.0,
            tick_interval: Duration::from_millis(33),
            step: 3.0,
            update_channel_capacity: 1024,
        }
    }
}

impl BoardTuning {
    /// Rejects combinations under which the game cannot run or cannot be won.
    pub fn validate(&self) -> Result<(), BoardError> {
        let invalid = |msg: &str| Err(BoardError::InvalidTuning(msg.to_string()));

        if !(self.min_radius > 0.0 && self.min_radius <= self.max_radius) {
            return invalid("min_radius must be positive and not above max_radius");
        }
        if !(self.min_radius..=self.max_radius).contains(&self.player_start_radius) {
            return invalid("player_start_radius must lie within [min_radius, max_radius]");
        }
        if !(self.player_target_radius > self.player_start_radius
            && self.player_target_radius <= self.max_radius)
        {
            return invalid("player_target_radius must be above the start radius and not above max_radius");
        }
        if self.border < self.max_radius {
            return invalid("border must be at least max_radius wide");
        }
        if self.max_population == 0 {
            return invalid("max_population must be at least 1");
        }
        if self.tick_interval.is_zero() {
            return invalid("tick_interval must be non-zero");
        }
        if !(self.step > 0.0) {
            return invalid("step must be positive");
        }
        if self.update_channel_capacity == 0 {
            return invalid("update_channel_capacity must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tuning_is_valid() {
        assert!(BoardTuning::default().validate().is_ok());
    }

    #[test]
    fn unreachable_target_is_rejected() {
        let tuning = BoardTuning {
            player_target_radius: 500.0,
            ..BoardTuning::default()
        };
        assert!(matches!(tuning.validate(), Err(BoardError::InvalidTuning(_))));
    }

    #[test]
    fn narrow_border_is_rejected() {
        let tuning = BoardTuning {
            border: 10.0,
            ..BoardTuning::default()
        };
        assert!(matches!(tuning.validate(), Err(BoardError::InvalidTuning(_))));
    }

    #[test]
    fn empty_population_is_rejected() {
        let tuning = BoardTuning {
            max_population: 0,
            ..BoardTuning::default()
        };
        assert!(matches!(tuning.validate(), Err(BoardError::InvalidTuning(_))));
    }
}
