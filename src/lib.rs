//! # Neuromotor
//!
//! A trajectory-synthesis engine that produces pointer traces and
//! input-event schedules with the statistical signatures of human motor
//! control: Fitts'-Law-bounded movement times, asymmetric minimum-jerk
//! velocity profiles, submovement corrections, signal-dependent noise,
//! 8-12 Hz physiological tremor, and log-normal click timing.
//!
//! ## Quick start
//!
//! ```no_run
//! use neuromotor::{MotionConfig, NullDriver, Point, Session, Target};
//!
//! # async fn demo() -> neuromotor::Result<()> {
//! let mut config = MotionConfig::default();
//! config.seed = Some(42);
//!
//! let session = Session::new(NullDriver, config)?;
//! let trace = session
//!     .move_to(Point::new(100.0, 100.0), Target::new(Point::new(500.0, 300.0), 100.0, 100.0))
//!     .await?;
//!
//! let report = neuromotor::diagnose(&trace, 100.0)?;
//! assert!(report.overall_valid);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The synthesis pipeline composes several stochastic models into a single
//! time-stamped trace:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  Fitts' Law  │──▶│  Submovement │──▶│ Minimum-jerk │──▶│ Path lift +  │
//! │  (duration)  │   │   planner    │   │   profile    │   │  curvature   │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                                                 │
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐          ▼
//! │    Driver    │◀──│   Composer   │◀──│    Noise     │◀─────────┘
//! │  (dispatch)  │   │ (stitch+pace)│   │ (SDN+tremor) │
//! └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! The [`diagnostics`] module is orthogonal: it consumes a finished trace
//! and reports throughput, straightness, peak-velocity timing, path RMSE,
//! and tremor band power against published human pass bands.
//!
//! ## Modules
//!
//! - [`config`]: validated configuration value object
//! - [`rng`]: seedable random source with the motor-control distributions
//! - [`trace`]: points, targets, samples, traces, and input events
//! - [`kinematics`]: Fitts' Law, minimum-jerk profiles, path geometry,
//!   submovement planning
//! - [`noise`]: signal-dependent noise and band-passed tremor injection
//! - [`composer`]: the session that stitches, paces, and drives a trace
//! - [`diagnostics`]: trace analysis and human-plausibility verdicts

pub mod composer;
pub mod config;
pub mod diagnostics;
pub mod kinematics;
pub mod noise;
pub mod rng;
pub mod trace;

// Re-export the types most callers need.
pub use composer::driver::{NullDriver, PointerDriver};
pub use composer::Session;
pub use config::{
    ClickTiming, FittsParams, MotionConfig, NoiseParams, PathParams, SubmovementParams,
};
pub use diagnostics::{diagnose, DiagnosticsReport};
pub use rng::MotorRng;
pub use trace::{InputEvent, InputEventKind, MouseButton, Point, Sample, Target, Trace};

/// Result type alias for the neuromotor engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the neuromotor engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Geometry that cannot be moved through: non-finite coordinates,
    /// non-positive target extents, degenerate distances.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A configuration field outside its admissible range, reported at
    /// session construction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The wall-clock watchdog (2x the planned duration) expired while
    /// dispatching to the driver.
    #[error("pointer driver stalled: {0}")]
    DriverStalled(String),

    /// The underlying pointer driver reported a failure.
    #[error("driver error: {0}")]
    Driver(String),

    /// The operation was cancelled cooperatively. No retry is attempted.
    #[error("operation cancelled")]
    Cancelled,
}
