//! Mechanical spring model solved with classic Runge-Kutta 4.
//!
//! The model is a unit mass suspended between two spring/damper pairs:
//! one pair is fixed, the other is user-tunable. Driving the forcing
//! input `u` to "top" pulls the mass toward its rest position `xe`;
//! releasing it to "bottom" lets the mass relax back to zero. The
//! transient between the two is the animation curve.
//!
//! The model is purely a function of elapsed simulation time: identical
//! `(state, h)` inputs always produce identical outputs. Wall-clock
//! mapping lives one layer up, in [`crate::engine`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Mass of the suspended body.
const MASS: f64 = 1.0;
/// Dampening of the fixed (secondary) damper.
const FIXED_DAMPENING: f64 = 0.2;
/// Stiffness of the fixed (secondary) spring.
const FIXED_STIFFNESS: f64 = 2.0;
/// Amplitude of the forcing input when the target is [`Endpoint::Top`].
const FORCING_AMPLITUDE: f64 = 1.0;

/// Exclusive lower bound for the tunable stiffness.
pub const MIN_STIFFNESS: f64 = 0.1;
/// Exclusive upper bound for the tunable stiffness.
pub const MAX_STIFFNESS: f64 = 20.0;
/// Exclusive lower bound for the tunable dampening.
pub const MIN_DAMPENING: f64 = 0.1;
/// Exclusive upper bound for the tunable dampening.
pub const MAX_DAMPENING: f64 = 10.0;

/// Default tunable stiffness.
pub const DEFAULT_STIFFNESS: f64 = 4.25;
/// Default tunable dampening.
pub const DEFAULT_DAMPENING: f64 = 1.0;

/// The logical endpoint the model is driven toward.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// The relaxed position; normalizes to `0.0`.
    #[default]
    Bottom,
    /// The forced position; normalizes to `1.0`.
    Top,
}

impl Endpoint {
    /// The normalized value this endpoint maps to.
    #[must_use]
    pub fn normalized(self) -> f64 {
        match self {
            Self::Bottom => 0.0,
            Self::Top => 1.0,
        }
    }

    /// The other endpoint.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Bottom => Self::Top,
            Self::Top => Self::Bottom,
        }
    }
}

/// Damped mass-spring model state.
///
/// `position` and `velocity` are only mutated by [`SpringModel::step`]
/// (or placed at rest by a skip-transient target change). The rest
/// position `xe` is a function of the current stiffness, recomputed on
/// every accepted stiffness change:
///
/// `xe = kf / (k + kf) * du`
///
/// with `kf` the fixed stiffness and `du` the forcing amplitude.
#[derive(Debug, Clone)]
pub struct SpringModel {
    /// Position of the mass (x).
    position: f64,
    /// Velocity of the mass (v).
    velocity: f64,
    /// Rest position the mass approaches when driven to top (xe).
    rest_position: f64,
    /// Tunable stiffness (k).
    stiffness: f64,
    /// Tunable dampening (d).
    dampening: f64,
    /// Endpoint the forcing input currently drives toward (u).
    target: Endpoint,
}

impl SpringModel {
    /// Model at rest at the given endpoint, with default parameters.
    #[must_use]
    pub fn new(initial_target: Endpoint) -> Self {
        let mut model = Self {
            position: 0.0,
            velocity: 0.0,
            rest_position: 0.0,
            stiffness: DEFAULT_STIFFNESS,
            dampening: DEFAULT_DAMPENING,
            target: initial_target,
        };
        model.update_rest_position();
        model.place_at_rest();
        model
    }

    /// Recompute `xe` from the current stiffness.
    fn update_rest_position(&mut self) {
        self.rest_position =
            FIXED_STIFFNESS / (self.stiffness + FIXED_STIFFNESS)
                * FORCING_AMPLITUDE;
    }

    /// Place the mass at rest at its current target.
    fn place_at_rest(&mut self) {
        self.velocity = 0.0;
        self.position = match self.target {
            Endpoint::Top => self.rest_position,
            Endpoint::Bottom => 0.0,
        };
    }

    /// Acceleration of the mass for the given forcing input and state.
    ///
    /// `v' = -v·(df+d)/m − x·(kf+k)/m + u·kf/m`
    ///
    /// The forcing term needs no explicit time argument: it depends only
    /// on the current target.
    fn acceleration(&self, u: f64, v: f64, x: f64) -> f64 {
        -v * (FIXED_DAMPENING + self.dampening) / MASS
            - x * (FIXED_STIFFNESS + self.stiffness) / MASS
            + u * FIXED_STIFFNESS / MASS
    }

    /// Advance `(position, velocity)` by simulation time `h` using one
    /// classic RK4 step and return the new position.
    ///
    /// Four stage evaluations of the coupled first-order system
    /// `x' = v`, `v' = a(u, v, x)` are combined with the `(1,2,2,1)/6`
    /// weights; both position and velocity are updated from their
    /// respective weighted sums.
    pub fn step(&mut self, h: f64) -> f64 {
        let u = match self.target {
            Endpoint::Top => FORCING_AMPLITUDE,
            Endpoint::Bottom => 0.0,
        };
        let h2 = h / 2.0;
        let x = self.position;
        let v = self.velocity;

        let kx1 = v;
        let kv1 = self.acceleration(u, v, x);

        let kx2 = v + kv1 * h2;
        let kv2 = self.acceleration(u, v + kv1 * h2, x + kx1 * h2);

        let kx3 = v + kv2 * h2;
        let kv3 = self.acceleration(u, v + kv2 * h2, x + kx2 * h2);

        let kx4 = v + kv3 * h;
        let kv4 = self.acceleration(u, v + kv3 * h, x + kx3 * h);

        self.position = x + h * (kx1 + 2.0 * kx2 + 2.0 * kx3 + kx4) / 6.0;
        self.velocity = v + h * (kv1 + 2.0 * kv2 + 2.0 * kv3 + kv4) / 6.0;

        self.position
    }

    /// Set the tunable stiffness.
    ///
    /// Values outside the open interval
    /// ([`MIN_STIFFNESS`], [`MAX_STIFFNESS`]) are rejected and leave the
    /// previous value in effect. Returns whether the value was applied.
    /// An accepted change recomputes the rest position, which is a
    /// function of the current stiffness, not of history.
    pub fn set_stiffness(&mut self, k: f64) -> bool {
        if k > MIN_STIFFNESS && k < MAX_STIFFNESS {
            self.stiffness = k;
            self.update_rest_position();
            true
        } else {
            false
        }
    }

    /// Set the tunable dampening.
    ///
    /// Values outside the open interval
    /// ([`MIN_DAMPENING`], [`MAX_DAMPENING`]) are rejected and leave the
    /// previous value in effect. Returns whether the value was applied.
    pub fn set_dampening(&mut self, d: f64) -> bool {
        if d > MIN_DAMPENING && d < MAX_DAMPENING {
            self.dampening = d;
            true
        } else {
            false
        }
    }

    /// Change the endpoint the model is driven toward.
    ///
    /// With `skip_transient` the state is instantly placed at its new
    /// resting state (zero velocity, position at the endpoint), modeling
    /// an already-settled system switched without an animated
    /// transition. Without it, `(position, velocity)` are left as-is so
    /// subsequent steps animate the transition from the current
    /// physical state.
    pub fn set_target(&mut self, target: Endpoint, skip_transient: bool) {
        self.target = target;
        if skip_transient {
            self.place_at_rest();
        }
    }

    /// Current position of the mass (x).
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity of the mass (v).
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Rest position the mass approaches when driven to top (xe).
    #[must_use]
    pub fn rest_position(&self) -> f64 {
        self.rest_position
    }

    /// Current tunable stiffness (k).
    #[must_use]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Current tunable dampening (d).
    #[must_use]
    pub fn dampening(&self) -> f64 {
        self.dampening
    }

    /// Endpoint the model is currently driven toward (u).
    #[must_use]
    pub fn target(&self) -> Endpoint {
        self.target
    }
}
