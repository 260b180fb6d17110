//! Periodic recomputation background task

use std::sync::Arc;
use tokio::{
    sync::{broadcast::error::RecvError, broadcast::Receiver, watch},
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::{
    error::TimerError,
    state::AppState,
    timer::{Tick, TimerEvent},
};

/// Owns the spawned ticker. Dropping it without calling [`dispose`]
/// also stops the task.
///
/// [`dispose`]: TickerHandle::dispose
#[derive(Debug)]
pub struct TickerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Stop recomputing and wait for the task to finish. Persisted timer
    /// state is left alone so the next attach resumes the run.
    pub async fn dispose(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("Timer ticker task ended abnormally: {}", e);
        }
    }
}

/// Spawn the ticker for the timer held by `state`
pub fn spawn_timer_ticker(state: Arc<AppState>) -> Result<TickerHandle, TimerError> {
    // Subscribe before spawning so no event between now and the first poll is lost
    let events = state.subscribe_timer_events()?;
    let (shutdown, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(timer_ticker_task(state, events, shutdown_rx));
    Ok(TickerHandle { shutdown, task })
}

/// Background task that recomputes the timer while it is running.
///
/// Idle until a `Started` event arrives (or immediately, if the timer was
/// restored from storage), then ticks on `state.tick_interval` until the
/// run expires or a `Reset` / `Cleared` event cancels it.
pub async fn timer_ticker_task(
    state: Arc<AppState>,
    mut events: Receiver<TimerEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Starting timer ticker task");

    let mut running = is_running(&state);

    loop {
        if running {
            debug!("Recomputing timer every {:?}", state.tick_interval);
            let mut ticks = interval(state.tick_interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticks.tick() => {
                        match state.tick_timer() {
                            Ok(Tick::Running { display_seconds }) => {
                                debug!("Timer at {}s", display_seconds);
                            }
                            Ok(Tick::Expired) => {
                                state.record_expiry();
                                break;
                            }
                            Ok(Tick::Idle) => break,
                            Err(e) => {
                                error!("Failed to recompute timer: {}", e);
                                break;
                            }
                        }
                    }

                    event = events.recv() => {
                        match event {
                            Ok(TimerEvent::Reset) | Ok(TimerEvent::Cleared) => {
                                debug!("Timer stopped, cancelling recomputation");
                                break;
                            }
                            Ok(_) => {}
                            Err(RecvError::Lagged(skipped)) => {
                                warn!("Ticker missed {} timer events", skipped);
                                if !is_running(&state) {
                                    break;
                                }
                            }
                            Err(RecvError::Closed) => return,
                        }
                    }

                    _ = shutdown.changed() => {
                        info!("Timer ticker disposed");
                        return;
                    }
                }
            }
        }

        tokio::select! {
            event = events.recv() => {
                running = match event {
                    Ok(TimerEvent::Started(started)) => {
                        debug!("Timer started in {} mode", started.mode);
                        true
                    }
                    Ok(_) => false,
                    Err(RecvError::Lagged(_)) => is_running(&state),
                    Err(RecvError::Closed) => return,
                };
            }

            _ = shutdown.changed() => {
                info!("Timer ticker disposed");
                return;
            }
        }
    }
}

fn is_running(state: &AppState) -> bool {
    match state.timer_status() {
        Ok(status) => status.is_running(),
        Err(e) => {
            error!("Failed to read timer status: {}", e);
            false
        }
    }
}
