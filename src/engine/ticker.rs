//! Background periodic loop driving the interpolation.
//!
//! One dedicated thread sleeps for the configured update period, then
//! measures how much wall-clock time actually passed since the previous
//! tick and feeds that measured value (not the nominal period) into the
//! core, so scheduler drift stretches the mapping instead of losing
//! simulation time. Shutdown is an explicit flag-then-join handshake.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use super::core::{EngineCore, TickOutcome};
use super::{lock, observer_snapshot};
use crate::observer::SharedObserver;

/// Handle to the ticker thread.
pub(crate) struct Ticker {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn the ticker thread.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the thread fails to spawn.
    pub(crate) fn spawn(
        period: Duration,
        core: Arc<Mutex<EngineCore>>,
        observers: Arc<Mutex<Vec<SharedObserver>>>,
        mut value_input: triple_buffer::Input<f64>,
    ) -> Result<Self, std::io::Error> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("spring-ticker".into())
            .spawn(move || {
                tick_loop(
                    &stop_flag,
                    period,
                    &core,
                    &observers,
                    &mut value_input,
                );
            })?;

        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }

    /// Signal the loop to exit and wait for it to finish. The loop is
    /// guaranteed to have exited when this returns; calling it again is
    /// a no-op.
    pub(crate) fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Ticker thread main loop.
fn tick_loop(
    stop: &AtomicBool,
    period: Duration,
    core: &Mutex<EngineCore>,
    observers: &Mutex<Vec<SharedObserver>>,
    value_input: &mut triple_buffer::Input<f64>,
) {
    log::debug!("ticker started, period {period:?}");
    let mut last_tick = Instant::now();

    while !stop.load(Ordering::Relaxed) {
        std::thread::sleep(period);

        let now = Instant::now();
        let elapsed = now - last_tick;
        last_tick = now;

        // Hold the core lock only for the tick itself; observers run
        // against a snapshot, outside every lock.
        let outcome = lock(core).tick(elapsed);
        match outcome {
            TickOutcome::Idle => {}
            TickOutcome::Update(value) => {
                value_input.write(value);
                for observer in observer_snapshot(observers) {
                    observer.on_update(value);
                }
            }
            TickOutcome::Settled { value, target } => {
                value_input.write(value);
                for observer in observer_snapshot(observers) {
                    observer.on_settled(value, target);
                }
            }
        }
    }
    log::debug!("ticker stopped");
}
