//! Trajectory Composer
//!
//! [`Session`] is the integrative component: it samples a Fitts'
//! duration, plans submovements, renders each leg through the
//! minimum-jerk profile and path lift, injects noise, stitches the legs
//! into one monotonic trace, and then dispatches the trace to the driver
//! at its scheduled wall times.
//!
//! Concurrency model: single-threaded cooperative. All state lives
//! behind one per-session mutex, so concurrent calls against the same
//! session serialize; the composer yields between samples by sleeping
//! until the next dispatch time. Cancellation is observed at every
//! suspension point, and a pending `button_down` is always balanced by a
//! `button_up`, even on cancellation, driver failure, or watchdog expiry.

pub mod driver;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::config::MotionConfig;
use crate::kinematics::{curved_path, minimum_jerk, FittsSampler, SubmovementPlanner};
use crate::noise::{NoiseInjector, TREMOR_FULL_SCALE_PX};
use crate::rng::MotorRng;
use crate::trace::{InputEvent, InputEventKind, MouseButton, Point, Sample, Target, Trace};
use crate::{Error, Result};

use driver::PointerDriver;

/// Correction legs shorter than this get proportionally attenuated
/// curvature.
const SHORT_LEG_PX: f64 = 40.0;

/// Pre-click verification dwell clamp, seconds.
const DWELL_CLAMP_S: (f64, f64) = (0.10, 0.60);

/// Button hold clamp, seconds.
const HOLD_CLAMP_S: (f64, f64) = (0.05, 0.35);

/// Inter-click gap clamp for double clicks, seconds.
const DOUBLE_GAP_CLAMP_S: (f64, f64) = (0.05, 0.20);

/// Watchdog never fires before this floor, to tolerate scheduler jitter
/// on very short traces.
const WATCHDOG_FLOOR_S: f64 = 1.0;

/// Mutable session state, guarded by the session mutex.
struct SessionCore {
    rng: MotorRng,
    /// Last composed pointer position, if any operation has completed.
    position: Option<Point>,
}

/// A motion session owning one driver, one PRNG, and one config.
///
/// Operations on a session serialize: the session mutex is held from
/// synthesis through the final driver call of each operation.
pub struct Session<D: PointerDriver> {
    driver: Arc<D>,
    config: MotionConfig,
    fitts: FittsSampler,
    planner: SubmovementPlanner,
    injector: NoiseInjector,
    core: Mutex<SessionCore>,
    cancel: watch::Sender<bool>,
    id: Uuid,
}

impl<D: PointerDriver> Session<D> {
    /// Create a session, validating the configuration.
    pub fn new(driver: D, config: MotionConfig) -> Result<Self> {
        config.validate()?;
        let id = Uuid::new_v4();
        info!(session = %id, seed = ?config.seed, "motion session created");
        Ok(Self {
            driver: Arc::new(driver),
            fitts: FittsSampler::new(config.fitts.clone()),
            planner: SubmovementPlanner::new(
                config.submovement.clone(),
                config.fitts.nominal_error_rate,
            ),
            injector: NoiseInjector::new(config.noise.clone(), config.sample_rate_hz),
            core: Mutex::new(SessionCore {
                rng: MotorRng::new(config.seed),
                position: None,
            }),
            cancel: watch::Sender::new(false),
            id,
            config,
        })
    }

    /// The session's identifier, for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The active configuration.
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// The driver backing this session.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Request cooperative cancellation of the in-flight operation.
    ///
    /// The composer observes the signal at its next suspension point,
    /// balances any pending `button_down`, stops emitting, and surfaces
    /// [`Error::Cancelled`]. Subsequent operations start afresh.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Move from `start` into `target` and return the composed trace.
    pub async fn move_to(&self, start: Point, target: Target) -> Result<Trace> {
        self.run_move(start, target, None).await
    }

    /// Move from `start` into `target`, then click `button` after a
    /// verification dwell.
    pub async fn move_and_click(
        &self,
        start: Point,
        target: Target,
        button: MouseButton,
    ) -> Result<Trace> {
        self.run_move(start, target, Some(button)).await
    }

    /// Click in place after a verification dwell.
    ///
    /// With `at = None` the session's last composed position is used;
    /// if the session has never moved, that is an `InvalidGeometry`
    /// error. `double` emits two down/up pairs with a human inter-click
    /// gap.
    pub async fn click(
        &self,
        at: Option<Point>,
        button: MouseButton,
        double: bool,
    ) -> Result<Trace> {
        let mut core = self.core.lock().await;
        self.cancel.send_replace(false);

        let at = match at.or(core.position) {
            Some(p) => p,
            None => {
                return Err(Error::InvalidGeometry(
                    "click position unknown: no prior movement and no explicit point".into(),
                ))
            }
        };
        at.validate("click position")?;

        let trace = self.synthesize_click(&mut core, at, button, double);
        match self.dispatch(&trace).await {
            Ok(()) => {
                core.position = Some(at);
                Ok(trace)
            }
            Err(err) => {
                core.position = None;
                Err(err)
            }
        }
    }

    /// Scroll by a total wheel delta, distributed over a minimum-jerk
    /// magnitude profile at the session cadence.
    pub async fn scroll(&self, dx: f64, dy: f64) -> Result<()> {
        if !dx.is_finite() || !dy.is_finite() {
            return Err(Error::InvalidGeometry(format!(
                "scroll delta must be finite, got ({dx}, {dy})"
            )));
        }
        if dx == 0.0 && dy == 0.0 {
            return Ok(());
        }

        let mut core = self.core.lock().await;
        self.cancel.send_replace(false);

        let duration = core.rng.truncated_gaussian(0.35, 0.08, 0.20, 0.60);
        let profile = minimum_jerk::profile(
            duration,
            self.config.sample_rate_hz,
            self.config.velocity_asymmetry,
        );

        let mut schedule = Vec::with_capacity(profile.len().saturating_sub(1));
        for i in 1..profile.len() {
            let ds = profile.progress[i] - profile.progress[i - 1];
            schedule.push(Emission {
                at: profile.times[i],
                action: Action::Scroll {
                    dx: ds * dx,
                    dy: ds * dy,
                },
            });
        }

        debug!(session = %self.id, dx, dy, steps = schedule.len(), "scrolling");
        self.emit_with_watchdog(&schedule, duration).await
    }

    async fn run_move(
        &self,
        start: Point,
        target: Target,
        click: Option<MouseButton>,
    ) -> Result<Trace> {
        start.validate("start position")?;
        target.validate()?;

        let mut core = self.core.lock().await;
        self.cancel.send_replace(false);

        let trace = self.synthesize_move(&mut core, start, target, click)?;
        match self.dispatch(&trace).await {
            Ok(()) => {
                core.position = trace.last().map(|s| s.point());
                Ok(trace)
            }
            Err(err) => {
                // The pointer stopped somewhere mid-path; forget it.
                core.position = None;
                Err(err)
            }
        }
    }

    /// Compose the full trace for one move: rest lead-in, planned legs,
    /// rest tail (or pre-click dwell plus button events).
    fn synthesize_move(
        &self,
        core: &mut SessionCore,
        start: Point,
        target: Target,
        click: Option<MouseButton>,
    ) -> Result<Trace> {
        let rng = &mut core.rng;
        let fs = self.config.sample_rate_hz;

        // Reaction-time lead-in and settle tail. The tail becomes the
        // verification dwell when a click follows.
        let lead = rng.exgaussian(0.045, 0.008, 0.012).clamp(0.04, 0.09);
        let tail = if click.is_some() {
            (rng.lognormal(self.config.click.dwell_mu, self.config.click.dwell_sigma) / 1000.0)
                .clamp(DWELL_CLAMP_S.0, DWELL_CLAMP_S.1)
        } else {
            rng.truncated_gaussian(0.05, 0.012, 0.03, 0.08)
        };

        let distance = start.distance_to(target.center);
        let movement_time = self
            .fitts
            .duration(rng, distance, target.effective_width())?;

        let plan = self.planner.plan(rng, start, &target);
        let total_span = lead + movement_time + tail;

        trace!(
            session = %self.id,
            distance_px = format_args!("{distance:.1}"),
            movement_s = format_args!("{movement_time:.3}"),
            legs = plan.legs.len(),
            missed = plan.missed,
            "synthesizing move"
        );

        // Solve the primary leg's asymmetry so the composite velocity
        // peak lands at the configured fraction of the whole trace.
        let primary_time = plan.primary_fraction() * movement_time;
        let alpha_primary = ((self.config.velocity_asymmetry * total_span - lead) / primary_time)
            .clamp(0.30, 0.50);

        let mut samples: Vec<Sample> = Vec::new();
        let mut clock = 0.0;

        self.append_leg(
            &mut samples,
            self.stationary_leg(start, lead, clock, fs),
            start,
            start,
            rng,
        );
        clock += lead;

        let mut cursor = start;
        for (index, leg) in plan.legs.iter().enumerate() {
            let leg_time = leg.fraction * movement_time;
            let alpha = if index == 0 {
                alpha_primary
            } else {
                self.config.velocity_asymmetry
            };

            let profile = minimum_jerk::profile(leg_time, fs, alpha);
            let deviation = self.draw_deviation(rng, index, cursor.distance_to(leg.endpoint));
            let sign = rng.coin_sign();
            let path = curved_path(cursor, leg.endpoint, &profile.progress, deviation, sign);

            let leg_samples: Vec<Sample> = profile
                .times
                .iter()
                .zip(&path)
                .map(|(&t, p)| Sample::new(clock + t, p.x, p.y))
                .collect();
            self.append_leg(&mut samples, leg_samples, cursor, leg.endpoint, rng);

            clock += leg_time;
            cursor = leg.endpoint;
        }

        self.append_leg(
            &mut samples,
            self.stationary_leg(cursor, tail, clock, fs),
            cursor,
            cursor,
            rng,
        );
        clock += tail;

        // Tremor runs phase-continuous across the whole trace; small
        // precise movements carry proportionally less.
        let tremor_scale = (distance / TREMOR_FULL_SCALE_PX).min(1.0);
        self.injector
            .inject_tremor(rng, &mut samples, start, cursor, tremor_scale);

        let mut events = Vec::new();
        if let Some(button) = click {
            let hold = (rng
                .lognormal(self.config.click.duration_mu, self.config.click.duration_sigma)
                / 1000.0)
                .clamp(HOLD_CLAMP_S.0, HOLD_CLAMP_S.1);
            events.push(InputEvent {
                t: clock,
                kind: InputEventKind::ButtonDown,
                button,
                x: cursor.x,
                y: cursor.y,
            });
            events.push(InputEvent {
                t: clock + hold,
                kind: InputEventKind::ButtonUp,
                button,
                x: cursor.x,
                y: cursor.y,
            });
        }

        debug!(
            session = %self.id,
            samples = samples.len(),
            span_s = format_args!("{clock:.3}"),
            "move synthesized"
        );
        Ok(Trace::new(samples, events))
    }

    /// Compose a pure click trace: verification dwell plus button events.
    fn synthesize_click(
        &self,
        core: &mut SessionCore,
        at: Point,
        button: MouseButton,
        double: bool,
    ) -> Trace {
        let rng = &mut core.rng;
        let fs = self.config.sample_rate_hz;

        let dwell = (rng.lognormal(self.config.click.dwell_mu, self.config.click.dwell_sigma)
            / 1000.0)
            .clamp(DWELL_CLAMP_S.0, DWELL_CLAMP_S.1);

        let mut samples = Vec::new();
        self.append_leg(
            &mut samples,
            self.stationary_leg(at, dwell, 0.0, fs),
            at,
            at,
            rng,
        );
        self.injector.inject_tremor(rng, &mut samples, at, at, 1.0);

        let mut events = Vec::new();
        let mut clock = dwell;
        let presses = if double { 2 } else { 1 };
        for press in 0..presses {
            if press > 0 {
                clock += rng
                    .exgaussian(0.07, 0.012, 0.025)
                    .clamp(DOUBLE_GAP_CLAMP_S.0, DOUBLE_GAP_CLAMP_S.1);
            }
            let hold = (rng
                .lognormal(self.config.click.duration_mu, self.config.click.duration_sigma)
                / 1000.0)
                .clamp(HOLD_CLAMP_S.0, HOLD_CLAMP_S.1);
            events.push(InputEvent {
                t: clock,
                kind: InputEventKind::ButtonDown,
                button,
                x: at.x,
                y: at.y,
            });
            clock += hold;
            events.push(InputEvent {
                t: clock,
                kind: InputEventKind::ButtonUp,
                button,
                x: at.x,
                y: at.y,
            });
        }

        Trace::new(samples, events)
    }

    /// A constant-position leg; noise injection supplies the tremor.
    fn stationary_leg(&self, at: Point, duration: f64, t0: f64, fs: f64) -> Vec<Sample> {
        let n = ((duration * fs).round() as usize).max(2);
        (0..n)
            .map(|i| {
                let t = duration * i as f64 / (n - 1) as f64;
                Sample::new(t0 + t, at.x, at.y)
            })
            .collect()
    }

    /// Inject the motion-coupled noise into a leg and append it, dropping
    /// the first sample of every leg after the first to keep timestamps
    /// strictly increasing.
    fn append_leg(
        &self,
        samples: &mut Vec<Sample>,
        mut leg: Vec<Sample>,
        nominal_start: Point,
        nominal_end: Point,
        rng: &mut MotorRng,
    ) {
        self.injector
            .inject_leg(rng, &mut leg, nominal_start, nominal_end);
        let skip = usize::from(!samples.is_empty());
        samples.extend(leg.into_iter().skip(skip));
    }

    /// Per-leg perpendicular deviation fraction: a truncated draw around
    /// the configured center, capped, and attenuated on short correction
    /// legs.
    fn draw_deviation(&self, rng: &mut MotorRng, leg_index: usize, leg_distance: f64) -> f64 {
        let center = self.config.path.deviation;
        if center <= 0.0 {
            return 0.0;
        }
        let mut deviation = rng
            .truncated_gaussian(center, 0.22 * center, 0.65 * center, 1.2 * center)
            .min(self.config.path.curvature);
        if leg_index > 0 && leg_distance < SHORT_LEG_PX {
            deviation *= leg_distance / SHORT_LEG_PX;
        }
        deviation
    }

    /// Replay a composed trace against the driver at its scheduled wall
    /// times.
    async fn dispatch(&self, trace: &Trace) -> Result<()> {
        let schedule = build_schedule(trace);
        let span = schedule.last().map(|e| e.at).unwrap_or(0.0);
        self.emit_with_watchdog(&schedule, span).await
    }

    /// Emit a schedule under the 2x wall-clock watchdog, balancing any
    /// pending button on every exit path.
    async fn emit_with_watchdog(&self, schedule: &[Emission], span: f64) -> Result<()> {
        let watchdog = Duration::from_secs_f64((2.0 * span).max(WATCHDOG_FLOOR_S));
        let mut cancel_rx = self.cancel.subscribe();
        let mut pending_down: Option<MouseButton> = None;
        let started = Instant::now();

        let outcome = tokio::time::timeout(
            watchdog,
            self.emit_schedule(schedule, started, &mut cancel_rx, &mut pending_down),
        )
        .await;

        let result = match outcome {
            Ok(result) => result,
            Err(_) => Err(Error::DriverStalled(format!(
                "schedule of {} emissions did not complete within {:.1}s",
                schedule.len(),
                watchdog.as_secs_f64()
            ))),
        };

        if let Err(err) = &result {
            if let Some(button) = pending_down {
                // Never leave a button held: best-effort release.
                debug!(session = %self.id, ?button, error = %err, "releasing button after failure");
                let _ = self.driver.button_up(button).await;
            }
        }
        result
    }

    async fn emit_schedule(
        &self,
        schedule: &[Emission],
        started: Instant,
        cancel_rx: &mut watch::Receiver<bool>,
        pending_down: &mut Option<MouseButton>,
    ) -> Result<()> {
        for emission in schedule {
            sleep_or_cancelled(started + Duration::from_secs_f64(emission.at), cancel_rx).await?;
            match emission.action {
                Action::MoveTo { x, y } => self.driver.move_to(x, y).await?,
                Action::ButtonDown { button } => {
                    // Pending from the attempt on: if the driver fails
                    // mid-press, the cleanup path still releases.
                    *pending_down = Some(button);
                    self.driver.button_down(button).await?;
                }
                Action::ButtonUp { button } => {
                    self.driver.button_up(button).await?;
                    *pending_down = None;
                }
                Action::Scroll { dx, dy } => self.driver.scroll(dx, dy).await?,
            }
        }
        Ok(())
    }
}

/// One scheduled driver call.
#[derive(Debug, Clone, Copy)]
struct Emission {
    /// Seconds from operation start
    at: f64,
    action: Action,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    MoveTo { x: f64, y: f64 },
    ButtonDown { button: MouseButton },
    ButtonUp { button: MouseButton },
    Scroll { dx: f64, dy: f64 },
}

/// Merge samples and events into one time-ordered schedule. Events at a
/// sample's exact timestamp come after the move.
fn build_schedule(trace: &Trace) -> Vec<Emission> {
    let mut schedule = Vec::with_capacity(trace.samples.len() + trace.events.len());
    let mut events = trace.events.iter().peekable();

    for sample in &trace.samples {
        while let Some(event) = events.peek() {
            if event.t < sample.t {
                schedule.push(emission_for(event));
                events.next();
            } else {
                break;
            }
        }
        schedule.push(Emission {
            at: sample.t,
            action: Action::MoveTo {
                x: sample.x,
                y: sample.y,
            },
        });
    }
    for event in events {
        schedule.push(emission_for(event));
    }
    schedule
}

fn emission_for(event: &InputEvent) -> Emission {
    Emission {
        at: event.t,
        action: match event.kind {
            InputEventKind::ButtonDown => Action::ButtonDown {
                button: event.button,
            },
            InputEventKind::ButtonUp => Action::ButtonUp {
                button: event.button,
            },
        },
    }
}

/// Sleep until `deadline`, resolving early with `Cancelled` if the
/// session's cancellation flag is raised.
async fn sleep_or_cancelled(
    deadline: Instant,
    cancel_rx: &mut watch::Receiver<bool>,
) -> Result<()> {
    loop {
        if *cancel_rx.borrow() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            changed = cancel_rx.changed() => {
                if changed.is_err() {
                    // Sender dropped with the session; treat as cancel.
                    return Err(Error::Cancelled);
                }
            }
            _ = tokio::time::sleep_until(deadline) => return Ok(()),
        }
    }
}
