use super::board::{Board, BoardPhase};
use super::types::{BoardCommand, WorldUpdate};
use crate::domain::RedrawSignal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tracing::{debug, info};

/// Redraw signal the board task polls once per refresh.
#[derive(Debug, Default)]
pub struct RedrawFlag(AtomicBool);

impl RedrawFlag {
    /// Returns whether a redraw was requested since the last call, and clears it.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl RedrawSignal for RedrawFlag {
    fn request_redraw(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Owns the board and drives its refresh cycle.
///
/// Commands are applied as they arrive. Every `refresh_interval` the board reconciles
/// driver updates, and a world update is broadcast whenever something asked for a
/// redraw. The task ends on `shutdown` or once every command sender is gone, stopping
/// all drivers on the way out.
pub async fn board_task(
    mut board: Board,
    mut command_rx: mpsc::Receiver<BoardCommand>,
    world_tx: broadcast::Sender<WorldUpdate>,
    phase_tx: watch::Sender<BoardPhase>,
    redraw: Arc<RedrawFlag>,
    refresh_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let mut tick: u64 = 0;
    let mut interval = tokio::time::interval(refresh_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    publish_phase(&phase_tx, board.phase());

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!("board task shutting down");
                break;
            }
            command = command_rx.recv() => {
                let Some(command) = command else {
                    info!("command channel closed; board task exiting");
                    break;
                };
                handle_command(&mut board, command);
            }
            _ = interval.tick() => {
                if let Some(outcome) = board.refresh() {
                    debug!(won = outcome.won, tick, "refresh ended the game");
                }
            }
        }

        publish_phase(&phase_tx, board.phase());

        if redraw.take() {
            tick += 1;
            // No subscribers is fine; the next redraw carries the whole world anyway.
            let _ = world_tx.send(WorldUpdate {
                tick,
                snapshot: board.snapshot(),
            });
        }
    }

    board.stop();
    publish_phase(&phase_tx, board.phase());
}

fn handle_command(board: &mut Board, command: BoardCommand) {
    match command {
        BoardCommand::Viewport { width, height } => {
            if !board.initialize(width, height) {
                debug!(width, height, "viewport ignored");
            }
        }
        BoardCommand::MovePlayer { x, y, reply } => {
            let _ = reply.send(board.request_player_move(x, y));
        }
        BoardCommand::Suspend { reply } => {
            board.suspend();
            let _ = reply.send(board.phase());
        }
        BoardCommand::Resume { reply } => {
            board.resume();
            let _ = reply.send(board.phase());
        }
        BoardCommand::Restart { reply } => {
            board.restart();
            let _ = reply.send(board.phase());
        }
    }
}

fn publish_phase(phase_tx: &watch::Sender<BoardPhase>, phase: BoardPhase) {
    phase_tx.send_if_modified(|current| {
        if *current == phase {
            return false;
        }
        info!(from = ?*current, to = ?phase, "board phase changed");
        *current = phase;
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoardTuning, GameOutcome, GameOverListener};
    use tokio::sync::oneshot;

    struct NoopListener;

    impl GameOverListener for NoopListener {
        fn game_over(&self, _outcome: GameOutcome) {}
    }

    struct Harness {
        command_tx: mpsc::Sender<BoardCommand>,
        world_rx: broadcast::Receiver<WorldUpdate>,
        phase_rx: watch::Receiver<BoardPhase>,
        shutdown: Arc<Notify>,
        task: tokio::task::JoinHandle<()>,
    }

    fn spawn_board() -> Harness {
        let redraw = Arc::new(RedrawFlag::default());
        let board = Board::builder()
            .tuning(BoardTuning {
                max_population: 2,
                ..BoardTuning::default()
            })
            .redraw_signal(redraw.clone())
            .game_over_listener(Arc::new(NoopListener))
            .seed(3)
            .build()
            .expect("board should build");

        let (command_tx, command_rx) = mpsc::channel(16);
        let (world_tx, world_rx) = broadcast::channel(64);
        let (phase_tx, phase_rx) = watch::channel(BoardPhase::Uninitialized);
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(board_task(
            board,
            command_rx,
            world_tx,
            phase_tx,
            redraw,
            Duration::from_millis(16),
            shutdown.clone(),
        ));

        Harness {
            command_tx,
            world_rx,
            phase_rx,
            shutdown,
            task,
        }
    }

    #[test]
    fn redraw_flag_is_cleared_by_take() {
        let flag = RedrawFlag::default();
        assert!(!flag.take());
        flag.request_redraw();
        flag.request_redraw();
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[tokio::test(start_paused = true)]
    async fn viewport_activates_and_broadcasts_the_world() {
        let mut h = spawn_board();

        h.command_tx
            .send(BoardCommand::Viewport {
                width: 800.0,
                height: 480.0,
            })
            .await
            .expect("board task alive");

        let update = h.world_rx.recv().await.expect("world update");
        assert_eq!(update.snapshot.phase, BoardPhase::Active);
        let player = update.snapshot.player.expect("player placed");
        assert_eq!((player.x, player.y), (550.0, 390.0));

        h.phase_rx.changed().await.expect("phase published");
        assert_eq!(*h.phase_rx.borrow(), BoardPhase::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn lifecycle_commands_reply_with_the_new_phase() {
        let h = spawn_board();
        h.command_tx
            .send(BoardCommand::Viewport {
                width: 800.0,
                height: 480.0,
            })
            .await
            .expect("board task alive");

        let (reply, rx) = oneshot::channel();
        h.command_tx
            .send(BoardCommand::Suspend { reply })
            .await
            .expect("board task alive");
        assert_eq!(rx.await.expect("reply"), BoardPhase::Suspended);

        let (reply, rx) = oneshot::channel();
        h.command_tx
            .send(BoardCommand::MovePlayer {
                x: 300.0,
                y: 300.0,
                reply,
            })
            .await
            .expect("board task alive");
        assert!(!rx.await.expect("reply"));

        let (reply, rx) = oneshot::channel();
        h.command_tx
            .send(BoardCommand::Resume { reply })
            .await
            .expect("board task alive");
        assert_eq!(rx.await.expect("reply"), BoardPhase::Active);

        let (reply, rx) = oneshot::channel();
        h.command_tx
            .send(BoardCommand::MovePlayer {
                x: 300.0,
                y: 300.0,
                reply,
            })
            .await
            .expect("board task alive");
        assert!(rx.await.expect("reply"));

        let (reply, rx) = oneshot::channel();
        h.command_tx
            .send(BoardCommand::Restart { reply })
            .await
            .expect("board task alive");
        assert_eq!(rx.await.expect("reply"), BoardPhase::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_the_task() {
        let h = spawn_board();
        h.shutdown.notify_one();
        h.task.await.expect("task should not panic");
        assert!(h.command_tx.is_closed());
    }
}
