//! Callback contract between the engine and its consumers.

use std::sync::Arc;

use crate::spring::Endpoint;

/// Receiver for interpolation events from a
/// [`SpringInterpolator`](crate::engine::SpringInterpolator).
///
/// Callbacks fire on the engine's ticker thread (or, for a settle
/// forced by a skip-motion target change, on the caller's thread), so
/// implementations must be `Send + Sync`. No timeout is enforced: a
/// slow `on_update` delays the next tick.
pub trait SpringObserver: Send + Sync {
    /// Current normalized value, fired once per tick while the model is
    /// in motion. Usually in `[0, 1]`; under-damped parameters may
    /// overshoot slightly past an endpoint before settling.
    fn on_update(&self, value: f64);

    /// The model has settled and updates cease until re-armed. Fired
    /// exactly once per motion; `value` is exactly `0.0` or `1.0`.
    fn on_settled(&self, value: f64, target: Endpoint);
}

/// Shared observer handle as stored by the engine.
pub type SharedObserver = Arc<dyn SpringObserver>;
