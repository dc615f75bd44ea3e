use crate::domain::{BubbleState, GameOutcome};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct CollisionConfig {
    pub max_radius: f32,
    pub target_radius: f32,
}

/// What one resolution pass did.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionReport<K> {
    /// Opponents removed this pass, in the order they were eaten.
    pub consumed: Vec<K>,
    /// Set when the pass ended the game.
    pub outcome: Option<GameOutcome>,
}

impl<K> Default for CollisionReport<K> {
    fn default() -> Self {
        Self {
            consumed: Vec::new(),
            outcome: None,
        }
    }
}

/// Resolves every touching pair, larger eats smaller.
///
/// Player contacts are handled before opponent contacts, and the player wins ties.
/// Ties between two opponents go to the one with the smaller key. A bubble eaten during
/// the pass is excluded from every later comparison. Sweeps repeat until one finds
/// nothing to eat, which ends because every repeat follows a removal. The pass
/// stops as soon as the game is won or lost.
pub fn resolve<K: Ord + Copy + std::fmt::Debug>(
    player: &mut BubbleState,
    opponents: &mut BTreeMap<K, BubbleState>,
    cfg: CollisionConfig,
) -> CollisionReport<K> {
    let mut report = CollisionReport::default();

    loop {
        let eaten_before = report.consumed.len();

        if let Some(outcome) = player_sweep(player, opponents, cfg, &mut report.consumed) {
            report.outcome = Some(outcome);
            return report;
        }
        opponent_sweep(opponents, cfg, &mut report.consumed);

        if report.consumed.len() == eaten_before {
            return report;
        }
    }
}

fn player_sweep<K: Ord + Copy + std::fmt::Debug>(
    player: &mut BubbleState,
    opponents: &mut BTreeMap<K, BubbleState>,
    cfg: CollisionConfig,
    consumed: &mut Vec<K>,
) -> Option<GameOutcome> {
    let keys: Vec<K> = opponents.keys().copied().collect();
    for key in keys {
        let Some(opponent) = opponents.get(&key).copied() else {
            continue;
        };
        if !player.touches(&opponent) {
            continue;
        }

        if player.radius >= opponent.radius {
            *player = player.consume(&opponent, cfg.max_radius);
            opponents.remove(&key);
            consumed.push(key);
            debug!(?key, player_radius = player.radius, "player consumed opponent");

            if player.radius >= cfg.target_radius {
                return Some(GameOutcome { won: true });
            }
        } else {
            opponents.insert(key, opponent.consume(player, cfg.max_radius));
            debug!(?key, opponent_radius = opponent.radius, "opponent consumed player");
            return Some(GameOutcome { won: false });
        }
    }
    None
}

fn opponent_sweep<K: Ord + Copy + std::fmt::Debug>(
    opponents: &mut BTreeMap<K, BubbleState>,
    cfg: CollisionConfig,
    consumed: &mut Vec<K>,
) {
    let keys: Vec<K> = opponents.keys().copied().collect();
    let mut eaten = vec![false; keys.len()];

    for i in 0..keys.len() {
        if eaten[i] {
            continue;
        }
        for j in (i + 1)..keys.len() {
            if eaten[j] {
                continue;
            }
            let (Some(a), Some(b)) = (
                opponents.get(&keys[i]).copied(),
                opponents.get(&keys[j]).copied(),
            ) else {
                continue;
            };
            if !a.touches(&b) {
                continue;
            }

            if a.radius >= b.radius {
                opponents.insert(keys[i], a.consume(&b, cfg.max_radius));
                eaten[j] = true;
            } else {
                opponents.insert(keys[j], b.consume(&a, cfg.max_radius));
                eaten[i] = true;
                break;
            }
        }
    }

    for (key, _) in keys.iter().zip(&eaten).filter(|(_, dead)| **dead) {
        opponents.remove(key);
        consumed.push(*key);
        debug!(?key, "opponent consumed by opponent");
    }
}
