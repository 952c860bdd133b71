//! Interpolation engine: time mapping, settle detection, dispatch.
//!
//! [`SpringInterpolator`] is the public facade. It owns the shared
//! [`core::EngineCore`] behind one mutex, the observer list, and the
//! background ticker thread, and it exposes the configuration surface.
//! All setters may be called from any thread concurrently with the
//! loop; every read-modify-write on the shared state takes the lock.

mod core;
mod ticker;
mod tolerance;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub use self::core::{DEFAULT_DURATION_MS, MAX_DURATION_MS, MIN_DURATION_MS};
use self::core::EngineCore;
use self::ticker::Ticker;
use crate::error::FederError;
use crate::observer::SharedObserver;
use crate::options::InterpolatorOptions;
use crate::spring::Endpoint;

/// Lock acquisition that survives poisoning: a panic on another thread
/// must not wedge the engine, so the inner guard is recovered.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Copy of the observer list taken under its lock; dispatch iterates
/// the copy so concurrent removal can never skip an element.
pub(crate) fn observer_snapshot(
    observers: &Mutex<Vec<SharedObserver>>,
) -> Vec<SharedObserver> {
    lock(observers).clone()
}

/// Duration-agnostic interpolator driven by a damped mass-spring model.
///
/// On construction the model sits settled at its initial endpoint and
/// the periodic loop is already running; flipping the target with
/// [`set_final_position`](Self::set_final_position) arms the motion.
/// Observers then receive one normalized value per tick until the model
/// has stayed within tolerance of its target for the full observation
/// window, at which point a single settle event fires and updates cease
/// until the next flip.
pub struct SpringInterpolator {
    core: Arc<Mutex<EngineCore>>,
    observers: Arc<Mutex<Vec<SharedObserver>>>,
    update_period: Duration,
    value_out: triple_buffer::Output<f64>,
    ticker: Ticker,
}

impl SpringInterpolator {
    /// Interpolator with the given update rate (ticks per second) and
    /// initial endpoint; remaining parameters take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`FederError::ThreadSpawn`] if the ticker thread cannot
    /// be started.
    pub fn new(
        update_rate: u32,
        initial_target: Endpoint,
    ) -> Result<Self, FederError> {
        Self::with_options(&InterpolatorOptions {
            update_rate,
            initial_target,
            ..Default::default()
        })
    }

    /// Interpolator configured from options.
    ///
    /// Out-of-range option fields do not error; they fall back to their
    /// defaults through the same rejecting setters the live API uses.
    ///
    /// # Errors
    ///
    /// Returns [`FederError::ThreadSpawn`] if the ticker thread cannot
    /// be started.
    pub fn with_options(
        options: &InterpolatorOptions,
    ) -> Result<Self, FederError> {
        let core = EngineCore::from_options(options);
        let update_period = Duration::from_secs_f64(
            1.0 / f64::from(options.update_rate.max(1)),
        );

        let (value_in, value_out) =
            triple_buffer::triple_buffer(&core.current_value());
        let core = Arc::new(Mutex::new(core));
        let observers: Arc<Mutex<Vec<SharedObserver>>> =
            Arc::new(Mutex::new(Vec::new()));

        let ticker = Ticker::spawn(
            update_period,
            Arc::clone(&core),
            Arc::clone(&observers),
            value_in,
        )
        .map_err(FederError::ThreadSpawn)?;

        Ok(Self {
            core,
            observers,
            update_period,
            value_out,
            ticker,
        })
    }

    /// Drive the model toward `target`.
    ///
    /// No-op if `target` is already current. With `skip_motion` the
    /// system jumps straight to rest at the new endpoint without an
    /// animated transition (idempotent: already-settled engines stay
    /// settled); a skip that cuts a running motion short dispatches the
    /// settle event on the calling thread. Without `skip_motion` the
    /// motion is re-armed and ticks resume publishing updates.
    pub fn set_final_position(&self, target: Endpoint, skip_motion: bool) {
        let event = lock(&self.core).set_final_position(target, skip_motion);
        if let Some((value, settled_at)) = event {
            for observer in observer_snapshot(&self.observers) {
                observer.on_settled(value, settled_at);
            }
        }
    }

    /// Current normalized value: the exact endpoint (`0.0` or `1.0`)
    /// while settled, otherwise the live `position / rest_position`.
    #[must_use]
    pub fn current_value(&self) -> f64 {
        lock(&self.core).current_value()
    }

    /// Newest published value from the ticker thread, read through the
    /// lock-free triple buffer. Unlike
    /// [`current_value`](Self::current_value) this never contends with
    /// a tick in progress, at the cost of being at most one tick stale.
    pub fn latest_value(&mut self) -> f64 {
        let _ = self.value_out.update();
        *self.value_out.output_buffer_mut()
    }

    /// Whether the model has settled and updates have ceased.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        lock(&self.core).is_settled()
    }

    /// Endpoint the model is currently driven toward. Note that this
    /// does not imply the motion is over; check
    /// [`is_settled`](Self::is_settled) for that.
    #[must_use]
    pub fn final_position(&self) -> Endpoint {
        lock(&self.core).model().target()
    }

    /// Set the spring stiffness (k). Out-of-range values (outside the
    /// open interval `(0.1, 20)`) are rejected, leaving the previous
    /// value in effect; returns whether the value was applied.
    pub fn set_stiffness(&self, k: f64) -> bool {
        lock(&self.core).model_mut().set_stiffness(k)
    }

    /// Current spring stiffness (k).
    #[must_use]
    pub fn stiffness(&self) -> f64 {
        lock(&self.core).model().stiffness()
    }

    /// Set the damper dampening (d). Out-of-range values (outside the
    /// open interval `(0.1, 10)`) are rejected, leaving the previous
    /// value in effect; returns whether the value was applied.
    pub fn set_dampening(&self, d: f64) -> bool {
        lock(&self.core).model_mut().set_dampening(d)
    }

    /// Current damper dampening (d).
    #[must_use]
    pub fn dampening(&self) -> f64 {
        lock(&self.core).model().dampening()
    }

    /// Set the real-time milliseconds one full simulation sweep should
    /// take. Values outside `[100, 5000]` (inclusive) are rejected;
    /// returns whether the value was applied.
    pub fn set_approximate_duration(&self, ms: f64) -> bool {
        lock(&self.core).set_approximate_duration(ms)
    }

    /// Current duration mapping in milliseconds.
    #[must_use]
    pub fn approximate_duration(&self) -> f64 {
        lock(&self.core).approximate_duration()
    }

    /// Nominal pause between ticks, derived from the update rate.
    #[must_use]
    pub fn update_period(&self) -> Duration {
        self.update_period
    }

    /// Register an observer. Observers are dispatched in insertion
    /// order; duplicates are not detected.
    pub fn add_observer(&self, observer: SharedObserver) {
        lock(&self.observers).push(observer);
    }

    /// Remove a previously registered observer by pointer identity.
    pub fn remove_observer(&self, observer: &SharedObserver) {
        lock(&self.observers).retain(|o| !Arc::ptr_eq(o, observer));
    }

    /// Remove every registered observer.
    pub fn remove_all_observers(&self) {
        lock(&self.observers).clear();
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        lock(&self.observers).len()
    }

    /// Stop the periodic loop and wait for the ticker thread to exit.
    /// The engine stays queryable afterwards but no further updates are
    /// published. Called automatically on drop.
    pub fn stop(&mut self) {
        self.ticker.stop();
    }
}

impl Drop for SpringInterpolator {
    fn drop(&mut self) {
        self.stop();
    }
}
