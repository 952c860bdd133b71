//! Tick state machine: time mapping, sub-stepping, settle detection.
//!
//! `EngineCore` is the part of the engine that is pure bookkeeping: it
//! owns the model, the tolerance window, the settled flag, and the
//! duration mapping, and it advances them one measured tick at a time.
//! It knows nothing about threads or observers, which keeps every
//! scenario deterministic under test; the ticker thread and the
//! dispatch plumbing live in the sibling modules.

use std::time::Duration;

use super::tolerance::ToleranceWindow;
use crate::options::InterpolatorOptions;
use crate::spring::{Endpoint, SpringModel};

/// Fixed integration sub-step H, in simulation seconds.
pub(crate) const SUB_STEP: f64 = 0.02;

/// Simulation seconds of one full sweep; elapsed real time is mapped
/// onto this span via the configured duration.
const SWEEP_SIMULATION_SECONDS: f64 = 5.0;

/// Normalized distance from the target below which a sub-step counts
/// as within tolerance.
const SETTLE_TOLERANCE: f64 = 0.01;

/// Number of consecutive within-tolerance sub-steps required to declare
/// settlement: 2 simulation seconds of observations at H = 0.02.
const OBSERVATION_COUNT: usize = 100;

/// Inclusive lower bound for the duration mapping, in milliseconds.
pub const MIN_DURATION_MS: f64 = 100.0;
/// Inclusive upper bound for the duration mapping, in milliseconds.
pub const MAX_DURATION_MS: f64 = 5000.0;
/// Default duration mapping, in milliseconds.
pub const DEFAULT_DURATION_MS: f64 = 1000.0;

/// Below this magnitude the rest position is treated as degenerate and
/// the normalized value degrades to the target endpoint instead of
/// dividing. Unreachable through the bounded stiffness setter, but the
/// division must never produce infinities.
const REST_POSITION_EPSILON: f64 = 1e-9;

/// Result of processing one measured tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TickOutcome {
    /// Already settled; nothing happened.
    Idle,
    /// Still in motion; carries the new normalized value.
    Update(f64),
    /// This tick completed the observation window. Reported exactly
    /// once per motion.
    Settled {
        /// Final normalized value, exactly `0.0` or `1.0`.
        value: f64,
        /// Endpoint the model settled at.
        target: Endpoint,
    },
}

/// Model, settle bookkeeping, and duration mapping behind one lock.
#[derive(Debug, Clone)]
pub(crate) struct EngineCore {
    model: SpringModel,
    window: ToleranceWindow,
    settled: bool,
    duration_ms: f64,
}

impl EngineCore {
    /// Core with the model at rest at `initial_target`.
    ///
    /// A model constructed at rest is already at its target, so the
    /// engine starts settled; the first target flip arms the motion.
    pub(crate) fn new(initial_target: Endpoint) -> Self {
        Self {
            model: SpringModel::new(initial_target),
            window: ToleranceWindow::new(OBSERVATION_COUNT),
            settled: true,
            duration_ms: DEFAULT_DURATION_MS,
        }
    }

    /// Core configured from options.
    ///
    /// Each field goes through the corresponding rejecting setter, so
    /// out-of-range values silently fall back to the defaults instead
    /// of erroring.
    pub(crate) fn from_options(options: &InterpolatorOptions) -> Self {
        let mut core = Self::new(options.initial_target);
        if !core.model.set_stiffness(options.stiffness) {
            log::warn!(
                "options stiffness {} out of range, keeping default",
                options.stiffness
            );
        }
        if !core.model.set_dampening(options.dampening) {
            log::warn!(
                "options dampening {} out of range, keeping default",
                options.dampening
            );
        }
        if !core.set_approximate_duration(options.approximate_duration_ms) {
            log::warn!(
                "options duration {} ms out of range, keeping default",
                options.approximate_duration_ms
            );
        }
        core
    }

    /// Process one tick of measured elapsed real time.
    ///
    /// Maps the elapsed time onto simulation time
    /// (`elapsed / duration * 5 s`), advances the model in fixed
    /// sub-steps of [`SUB_STEP`] plus one remainder step, records a
    /// tolerance observation per sub-step, and reports the outcome.
    /// The settle transition is edge-triggered: once settled, every
    /// subsequent tick is [`TickOutcome::Idle`] until re-armed.
    pub(crate) fn tick(&mut self, elapsed: Duration) -> TickOutcome {
        if self.settled {
            return TickOutcome::Idle;
        }

        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let mut mapped =
            elapsed_ms / self.duration_ms * SWEEP_SIMULATION_SECONDS;
        log::trace!("tick: {elapsed_ms:.3} ms -> {mapped:.4} sim-s");

        while mapped > SUB_STEP {
            let x = self.model.step(SUB_STEP);
            self.observe(x);
            mapped -= SUB_STEP;
        }
        let x = self.model.step(mapped);
        self.observe(x);

        if self.window.is_filled() {
            self.settled = true;
            let target = self.model.target();
            log::debug!("spring settled at {target:?}");
            TickOutcome::Settled {
                value: target.normalized(),
                target,
            }
        } else {
            TickOutcome::Update(self.normalized_position())
        }
    }

    /// Record whether a sub-step landed within tolerance of the target.
    fn observe(&mut self, x: f64) {
        let xe = self.model.rest_position();
        let normalized = if xe.abs() < REST_POSITION_EPSILON {
            self.model.target().normalized()
        } else {
            x / xe
        };
        let diff = (self.model.target().normalized() - normalized).abs();
        self.window.record(diff <= SETTLE_TOLERANCE);
    }

    /// Live normalized position, guarding the degenerate rest position.
    fn normalized_position(&self) -> f64 {
        let xe = self.model.rest_position();
        if xe.abs() < REST_POSITION_EPSILON {
            self.model.target().normalized()
        } else {
            self.model.position() / xe
        }
    }

    /// Current normalized value: the exact endpoint while settled,
    /// otherwise the live position.
    pub(crate) fn current_value(&self) -> f64 {
        if self.settled {
            self.model.target().normalized()
        } else {
            self.normalized_position()
        }
    }

    /// Change the endpoint the model is driven toward.
    ///
    /// No-op when `target` is already current. With `skip_motion` the
    /// model jumps straight to rest at the new endpoint and the settled
    /// flag is forced only if it was previously false; the returned
    /// settle event (if any) covers exactly that false-to-true
    /// transition. Without `skip_motion` the motion is re-armed and the
    /// observation window cleared.
    pub(crate) fn set_final_position(
        &mut self,
        target: Endpoint,
        skip_motion: bool,
    ) -> Option<(f64, Endpoint)> {
        if target == self.model.target() {
            return None;
        }

        self.model.set_target(target, skip_motion);

        if skip_motion {
            if self.settled {
                None
            } else {
                self.settled = true;
                log::debug!("skip-motion settle at {target:?}");
                Some((target.normalized(), target))
            }
        } else {
            // Stale within-tolerance entries from the previous settle
            // must not re-declare settlement on the very next tick.
            self.window.reset();
            self.settled = false;
            log::debug!("motion re-armed toward {target:?}");
            None
        }
    }

    /// Set the duration mapping in milliseconds.
    ///
    /// Values outside `[MIN_DURATION_MS, MAX_DURATION_MS]` (inclusive,
    /// unlike the exclusive spring parameter bounds) are rejected and
    /// leave the previous value in effect. Returns whether the value
    /// was applied.
    pub(crate) fn set_approximate_duration(&mut self, ms: f64) -> bool {
        if (MIN_DURATION_MS..=MAX_DURATION_MS).contains(&ms) {
            self.duration_ms = ms;
            true
        } else {
            false
        }
    }

    /// Current duration mapping in milliseconds.
    pub(crate) fn approximate_duration(&self) -> f64 {
        self.duration_ms
    }

    /// Whether the model has settled and updates have ceased.
    pub(crate) fn is_settled(&self) -> bool {
        self.settled
    }

    /// Shared access to the embedded model.
    pub(crate) fn model(&self) -> &SpringModel {
        &self.model
    }

    /// Exclusive access to the embedded model.
    pub(crate) fn model_mut(&mut self) -> &mut SpringModel {
        &mut self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One 60 fps frame of measured elapsed time.
    const FRAME: Duration = Duration::from_millis(16);

    /// Tick until settled, returning every outcome on the way.
    fn run_to_settle(core: &mut EngineCore) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        for _ in 0..10_000 {
            let outcome = core.tick(FRAME);
            outcomes.push(outcome);
            if matches!(outcome, TickOutcome::Settled { .. }) {
                return outcomes;
            }
        }
        panic!("spring did not settle within 10k ticks");
    }

    #[test]
    fn test_starts_settled_at_initial_target() {
        let core = EngineCore::new(Endpoint::Bottom);
        assert!(core.is_settled());
        assert_eq!(core.current_value(), 0.0);

        let core = EngineCore::new(Endpoint::Top);
        assert!(core.is_settled());
        assert_eq!(core.current_value(), 1.0);
    }

    #[test]
    fn test_tick_is_noop_while_settled() {
        let mut core = EngineCore::new(Endpoint::Bottom);
        for _ in 0..5 {
            assert_eq!(core.tick(FRAME), TickOutcome::Idle);
        }
        assert_eq!(core.current_value(), 0.0);
    }

    #[test]
    fn test_full_motion_bottom_to_top() {
        let mut core = EngineCore::new(Endpoint::Bottom);
        assert!(core.set_final_position(Endpoint::Top, false).is_none());
        assert!(!core.is_settled());

        let outcomes = run_to_settle(&mut core);
        let updates: Vec<f64> = outcomes
            .iter()
            .filter_map(|o| match o {
                TickOutcome::Update(v) => Some(*v),
                _ => None,
            })
            .collect();
        assert!(!updates.is_empty());

        // Under-damped defaults may overshoot 1.0, but the overshoot is
        // bounded by the damping envelope (zeta ~ 0.24 -> peak ~ 1.46).
        for v in &updates {
            assert!(*v > -0.01 && *v < 1.5, "value {v} outside envelope");
        }
        // The motion must actually approach the top endpoint.
        assert!(updates.iter().copied().fold(0.0, f64::max) > 0.9);

        match outcomes.last() {
            Some(TickOutcome::Settled { value, target }) => {
                assert_eq!(*value, 1.0);
                assert_eq!(*target, Endpoint::Top);
            }
            other => panic!("expected settle, got {other:?}"),
        }
        assert_eq!(core.current_value(), 1.0);
    }

    #[test]
    fn test_settle_is_edge_triggered() {
        let mut core = EngineCore::new(Endpoint::Bottom);
        assert!(core.set_final_position(Endpoint::Top, false).is_none());
        let outcomes = run_to_settle(&mut core);

        let settles = outcomes
            .iter()
            .filter(|o| matches!(o, TickOutcome::Settled { .. }))
            .count();
        assert_eq!(settles, 1);

        // No further updates or settles without re-arming
        for _ in 0..50 {
            assert_eq!(core.tick(FRAME), TickOutcome::Idle);
        }
    }

    #[test]
    fn test_skip_motion_settles_immediately() {
        let mut core = EngineCore::new(Endpoint::Bottom);

        // Settled -> settled is not a transition, so no event: the
        // motion was never armed.
        let event = core.set_final_position(Endpoint::Top, true);
        assert!(event.is_none());
        assert!(core.is_settled());
        assert_eq!(core.current_value(), 1.0);
        assert_eq!(core.tick(FRAME), TickOutcome::Idle);

        // Repeating the same call is a no-op.
        assert!(core.set_final_position(Endpoint::Top, true).is_none());
        assert!(core.is_settled());
        assert_eq!(core.current_value(), 1.0);
    }

    #[test]
    fn test_skip_motion_mid_motion_reports_settle_event() {
        let mut core = EngineCore::new(Endpoint::Bottom);
        assert!(core.set_final_position(Endpoint::Top, false).is_none());
        for _ in 0..10 {
            let _ = core.tick(FRAME);
        }
        assert!(!core.is_settled());

        let event = core.set_final_position(Endpoint::Bottom, true);
        assert_eq!(event, Some((0.0, Endpoint::Bottom)));
        assert!(core.is_settled());
        assert_eq!(core.current_value(), 0.0);
        assert_eq!(core.model().velocity(), 0.0);
    }

    #[test]
    fn test_rapid_flip_preserves_physical_state() {
        let mut core = EngineCore::new(Endpoint::Bottom);
        assert!(core.set_final_position(Endpoint::Top, false).is_none());
        for _ in 0..20 {
            let _ = core.tick(FRAME);
        }
        let x = core.model().position();
        let v = core.model().velocity();
        assert!(x != 0.0);

        // Flip twice before settling: the model keeps its momentum.
        assert!(core
            .set_final_position(Endpoint::Bottom, false)
            .is_none());
        assert!(core.set_final_position(Endpoint::Top, false).is_none());
        assert_eq!(core.model().position(), x);
        assert_eq!(core.model().velocity(), v);

        // And the motion still completes.
        let outcomes = run_to_settle(&mut core);
        assert!(matches!(
            outcomes.last(),
            Some(TickOutcome::Settled { target: Endpoint::Top, .. })
        ));
    }

    #[test]
    fn test_rearm_resets_observation_window() {
        let mut core = EngineCore::new(Endpoint::Bottom);
        assert!(core.set_final_position(Endpoint::Top, false).is_none());
        let _ = run_to_settle(&mut core);

        // Flip away and straight back: the model is still within
        // tolerance of top, but the cleared window must make it
        // re-observe for the full span before settling again.
        assert!(core
            .set_final_position(Endpoint::Bottom, false)
            .is_none());
        assert!(core.set_final_position(Endpoint::Top, false).is_none());
        assert!(matches!(core.tick(FRAME), TickOutcome::Update(_)));
    }

    #[test]
    fn test_duration_bounds_are_inclusive() {
        let mut core = EngineCore::new(Endpoint::Bottom);

        assert!(core.set_approximate_duration(100.0));
        assert_eq!(core.approximate_duration(), 100.0);
        assert!(core.set_approximate_duration(5000.0));
        assert_eq!(core.approximate_duration(), 5000.0);

        assert!(!core.set_approximate_duration(99.9));
        assert!(!core.set_approximate_duration(5000.1));
        assert!(!core.set_approximate_duration(-1.0));
        assert_eq!(core.approximate_duration(), 5000.0);
    }

    #[test]
    fn test_shorter_duration_settles_in_fewer_ticks() {
        let mut slow = EngineCore::new(Endpoint::Bottom);
        let mut fast = EngineCore::new(Endpoint::Bottom);
        assert!(fast.set_approximate_duration(200.0));

        assert!(slow.set_final_position(Endpoint::Top, false).is_none());
        assert!(fast.set_final_position(Endpoint::Top, false).is_none());

        let slow_ticks = run_to_settle(&mut slow).len();
        let fast_ticks = run_to_settle(&mut fast).len();
        assert!(fast_ticks < slow_ticks);
    }

    #[test]
    fn test_from_options_applies_valid_fields() {
        let options = InterpolatorOptions {
            update_rate: 30,
            initial_target: Endpoint::Top,
            approximate_duration_ms: 500.0,
            stiffness: 8.0,
            dampening: 2.5,
        };
        let core = EngineCore::from_options(&options);
        assert_eq!(core.model().target(), Endpoint::Top);
        assert_eq!(core.approximate_duration(), 500.0);
        assert_eq!(core.model().stiffness(), 8.0);
        assert_eq!(core.model().dampening(), 2.5);
    }

    #[test]
    fn test_from_options_rejects_invalid_fields_to_defaults() {
        let options = InterpolatorOptions {
            stiffness: 50.0,
            dampening: 0.0,
            approximate_duration_ms: 6000.0,
            ..Default::default()
        };
        let core = EngineCore::from_options(&options);
        assert_eq!(core.model().stiffness(), 4.25);
        assert_eq!(core.model().dampening(), 1.0);
        assert_eq!(core.approximate_duration(), DEFAULT_DURATION_MS);
    }

    #[test]
    fn test_zero_elapsed_tick_makes_progress_observation() {
        let mut core = EngineCore::new(Endpoint::Bottom);
        assert!(core.set_final_position(Endpoint::Top, false).is_none());
        // A zero-length tick still records one (zero-length) sub-step.
        assert!(matches!(
            core.tick(Duration::ZERO),
            TickOutcome::Update(_)
        ));
    }
}
