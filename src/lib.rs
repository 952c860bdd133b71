// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Spring math: exact comparisons against endpoints and staged RK4
// coefficients are intentional
#![allow(clippy::float_cmp)]
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]

//! Physically-based interpolation for animation, without a fixed duration.
//!
//! Instead of evaluating a hand-drawn easing curve over a preset time
//! span, `feder` moves a value between two endpoints ("bottom" = 0,
//! "top" = 1) by simulating a damped mass-spring model and streaming the
//! normalized spring position to observers. The motion ends when the
//! model physically settles, not when a timer expires.
//!
//! # Key entry points
//!
//! - [`engine::SpringInterpolator`] - the interpolation engine
//! - [`spring::SpringModel`] - the underlying mechanical model
//! - [`observer::SpringObserver`] - callback contract for value updates
//! - [`options::InterpolatorOptions`] - configuration with TOML presets
//!
//! # Architecture
//!
//! The engine runs a background ticker thread that sleeps one update
//! period per cycle, measures the wall-clock time that actually passed,
//! and maps it onto simulation time before advancing the model in fixed
//! `0.02 s` sub-steps. Shared state lives behind a single mutex;
//! observer callbacks fire outside the lock, and the newest value is
//! additionally published through a lock-free triple buffer for
//! pull-style consumers.

pub mod engine;
pub mod error;
pub mod observer;
pub mod options;
pub mod spring;

pub use engine::SpringInterpolator;
pub use error::FederError;
pub use observer::SpringObserver;
pub use options::InterpolatorOptions;
pub use spring::{Endpoint, SpringModel};
