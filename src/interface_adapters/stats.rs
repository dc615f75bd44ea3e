// Win/loss bookkeeping, optionally persisted as JSON.

use crate::domain::{GameOutcome, GameOverListener};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub games_played: u64,
    pub wins: u64,
    pub losses: u64,
}

impl StatsSnapshot {
    fn record(&mut self, outcome: GameOutcome) {
        self.games_played += 1;
        if outcome.won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
    }
}

/// Game-over listener that counts finished games.
#[derive(Debug, Default)]
pub struct GameStats {
    counters: Mutex<StatsSnapshot>,
    path: Option<PathBuf>,
}

impl GameStats {
    /// In-memory statistics only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads counters from `path`, starting at zero if the file is missing or unreadable.
    /// Later results are written back to the same file.
    pub async fn load(path: PathBuf) -> Self {
        let counters = match tokio::fs::read_to_string(&path).await {
            Ok(text) => match serde_json::from_str::<StatsSnapshot>(&text) {
                Ok(stats) => {
                    info!(path = %path.display(), games = stats.games_played, "loaded game stats");
                    stats
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt stats file; starting from zero");
                    StatsSnapshot::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StatsSnapshot::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read stats file; starting from zero");
                StatsSnapshot::default()
            }
        };

        Self {
            counters: Mutex::new(counters),
            path: Some(path),
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        match self.counters.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn persist(&self, stats: StatsSnapshot) {
        let Some(path) = self.path.clone() else {
            return;
        };
        // Called from the board task; keep file IO off the runtime threads.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || save(&path, stats));
            }
            Err(_) => save(&path, stats),
        }
    }
}

impl GameOverListener for GameStats {
    fn game_over(&self, outcome: GameOutcome) {
        let stats = {
            let mut guard = match self.counters.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.record(outcome);
            *guard
        };
        info!(
            won = outcome.won,
            games_played = stats.games_played,
            wins = stats.wins,
            losses = stats.losses,
            "game recorded"
        );
        self.persist(stats);
    }
}

fn save(path: &Path, stats: StatsSnapshot) {
    let text = match serde_json::to_string_pretty(&stats) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "failed to serialize game stats");
            return;
        }
    };
    if let Err(e) = std::fs::write(path, text) {
        warn!(path = %path.display(), error = %e, "failed to save game stats");
    }
}
