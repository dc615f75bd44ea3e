use crate::domain::BoardTuning;
use std::{env, path::PathBuf, str::FromStr, time::Duration};

// Runtime/server constants, plus environment overrides for the gameplay tuning.

pub const COMMAND_CHANNEL_CAPACITY: usize = 256;
pub const WORLD_BROADCAST_CAPACITY: usize = 128;

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

pub fn http_port() -> u16 {
    env_parse("BUBBLES_HTTP_PORT").unwrap_or(3001)
}

/// How often the board reconciles driver updates and redraws.
pub fn refresh_interval() -> Duration {
    let millis = env_parse::<u64>("BUBBLES_REFRESH_MS")
        .filter(|ms| *ms > 0)
        .unwrap_or(16);
    Duration::from_millis(millis)
}

/// Where finished games are recorded; in-memory only when unset.
pub fn stats_path() -> Option<PathBuf> {
    env::var("BUBBLES_STATS_PATH")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

pub fn board_tuning() -> BoardTuning {
    board_tuning_from(|key| env::var(key).ok())
}

/// Default tuning with overrides taken from `lookup`. Unparsable values are ignored.
pub fn board_tuning_from(lookup: impl Fn(&str) -> Option<String>) -> BoardTuning {
    let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
    let mut tuning = BoardTuning::default();

    if let Some(ms) = parse("BUBBLES_TICK_MS") {
        tuning.tick_interval = Duration::from_millis(ms);
    }
    if let Some(population) = parse("BUBBLES_MAX_POPULATION") {
        tuning.max_population = population as usize;
    }
    if let Some(border) = parse("BUBBLES_BORDER") {
        tuning.border = border as f32;
    }
    tuning
}
