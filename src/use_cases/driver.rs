// Opponent drivers: one task per bubble, reporting every move to the board.

use crate::domain::BubbleState;
use crate::systems::movement::{self, MovementConfig};
use rand_pcg::Pcg32;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

/// Identity the board mints when it registers a driver.
///
/// Ids only ever increase, so an update carrying an id from an earlier game or an eaten
/// bubble can never be mistaken for a live driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DriverId(u64);

impl DriverId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Message sent from a driver to the board after each tick.
#[derive(Debug, Clone, Copy)]
pub struct BubbleUpdate {
    pub driver: DriverId,
    pub state: BubbleState,
}

/// A driver that has been built but not started.
pub struct BubbleDriver {
    state: BubbleState,
    movement: MovementConfig,
    tick_interval: Duration,
    rng: Pcg32,
    update_tx: mpsc::Sender<BubbleUpdate>,
}

impl BubbleDriver {
    pub fn new(
        state: BubbleState,
        movement: MovementConfig,
        tick_interval: Duration,
        rng: Pcg32,
        update_tx: mpsc::Sender<BubbleUpdate>,
    ) -> Self {
        Self {
            state,
            movement,
            tick_interval,
            rng,
            update_tx,
        }
    }

    pub fn state(&self) -> BubbleState {
        self.state
    }

    /// Spawns the tick loop. Must be called from within a Tokio runtime.
    pub fn start(self, id: DriverId) -> RunningDriver {
        let control = Arc::new(DriverControl::default());
        let task = tokio::spawn(self.run(id, control.clone()));
        RunningDriver { id, control, task }
    }

    async fn run(mut self, id: DriverId, control: Arc<DriverControl>) {
        debug!(driver = id.raw(), "driver started");

        loop {
            tokio::select! {
                biased;
                _ = control.wake.notified() => break,
                _ = tokio::time::sleep(self.tick_interval) => {}
            }

            self.state = movement::advance(self.state, self.movement, &mut self.rng);

            // A stop that landed mid-tick lets the tick finish but suppresses the report.
            if control.stopped.load(Ordering::Acquire) {
                break;
            }

            let update = BubbleUpdate {
                driver: id,
                state: self.state,
            };
            tokio::select! {
                biased;
                _ = control.wake.notified() => break,
                sent = self.update_tx.send(update) => {
                    if sent.is_err() {
                        // Board is gone.
                        break;
                    }
                }
            }
        }

        debug!(
            driver = id.raw(),
            consumed = control.consumed.load(Ordering::Acquire),
            "driver stopped"
        );
    }
}

#[derive(Default)]
struct DriverControl {
    stopped: AtomicBool,
    consumed: AtomicBool,
    wake: Notify,
}

/// Handle to a started driver, owned by the board.
///
/// Dropping the handle stops the driver.
pub struct RunningDriver {
    id: DriverId,
    control: Arc<DriverControl>,
    task: JoinHandle<()>,
}

impl RunningDriver {
    pub fn id(&self) -> DriverId {
        self.id
    }

    /// Halts the tick loop. At most one update that was already being sent can still
    /// reach the board afterwards.
    pub fn stop(&self) {
        if !self.control.stopped.swap(true, Ordering::AcqRel) {
            // notify_one keeps a permit, so a driver between awaits still sees it.
            self.control.wake.notify_one();
        }
    }

    /// Tells the driver its bubble was eaten. Idempotent; the task is torn down right
    /// away instead of at its next wake-up.
    pub fn mark_consumed(&self) {
        if !self.control.consumed.swap(true, Ordering::AcqRel) {
            debug!(driver = self.id.raw(), "driver consumed");
        }
        self.stop();
        self.task.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.control.stopped.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RunningDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BubbleColor;
    use rand::SeedableRng;

    const TICK: Duration = Duration::from_millis(30);

    fn movement() -> MovementConfig {
        MovementConfig {
            step: 2.0,
            board_width: 1000.0,
            board_height: 1000.0,
        }
    }

    fn driver(tx: mpsc::Sender<BubbleUpdate>) -> BubbleDriver {
        let state = BubbleState::new(BubbleColor::WHITE, 500.0, 500.0, 10.0, 0.0);
        BubbleDriver::new(state, movement(), TICK, Pcg32::seed_from_u64(5), tx)
    }

    #[tokio::test(start_paused = true)]
    async fn emits_ordered_updates_tagged_with_its_id() {
        let (tx, mut rx) = mpsc::channel(16);
        let running = driver(tx).start(DriverId::new(9));

        let first = rx.recv().await.expect("first update");
        let second = rx.recv().await.expect("second update");

        assert_eq!(first.driver, DriverId::new(9));
        assert_eq!(second.driver, running.id());
        assert!((first.state.x - 502.0).abs() < 1e-3);
        assert!((second.state.x - 504.0).abs() < 1e-3);
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_driver_goes_quiet() {
        let (tx, mut rx) = mpsc::channel(16);
        let running = driver(tx).start(DriverId::new(1));

        rx.recv().await.expect("driver should be ticking");
        running.stop();
        while rx.try_recv().is_ok() {}

        tokio::time::sleep(TICK * 10).await;

        assert!(rx.try_recv().is_err());
        assert!(running.is_stopped());
        assert!(running.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_releases_a_driver_blocked_on_a_full_channel() {
        let (tx, _rx) = mpsc::channel(1);
        let running = driver(tx).start(DriverId::new(2));

        // Second send blocks because nobody drains the channel.
        tokio::time::sleep(TICK * 5).await;
        assert!(!running.is_finished());

        running.stop();
        tokio::time::sleep(TICK).await;
        assert!(running.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn mark_consumed_is_idempotent() {
        let (tx, mut rx) = mpsc::channel(16);
        let running = driver(tx).start(DriverId::new(3));

        running.mark_consumed();
        running.mark_consumed();
        tokio::time::sleep(TICK * 3).await;

        assert!(running.is_stopped());
        assert!(running.is_finished());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn driver_exits_when_the_board_goes_away() {
        let (tx, rx) = mpsc::channel(16);
        let running = driver(tx).start(DriverId::new(4));
        drop(rx);

        tokio::time::sleep(TICK * 3).await;
        assert!(running.is_finished());
    }
}
