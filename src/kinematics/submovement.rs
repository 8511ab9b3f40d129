//! Submovement Planning
//!
//! Decomposes a macro-movement into a primary ballistic leg plus up to
//! `max_corrections` visually-guided corrections, following the
//! two-component model of aimed movement: the primary leg covers most of
//! the distance with an endpoint drawn from a bivariate error
//! distribution, and each correction closes ~70% of the remaining error.

use tracing::debug;

use crate::config::SubmovementParams;
use crate::rng::MotorRng;
use crate::trace::{Point, Target};

/// Below this distance the plan is a single direct leg.
const DIRECT_LEG_DISTANCE_PX: f64 = 1.0;

/// Fraction of the remaining error a correction closes.
const CORRECTION_GAIN: f64 = 0.7;

/// One planned leg: where it ends and its share of the total duration.
#[derive(Debug, Clone, Copy)]
pub struct PlannedLeg {
    pub endpoint: Point,
    /// Fraction of the Fitts duration, in (0, 1]; fractions across a plan
    /// sum to 1 within 1e-9
    pub fraction: f64,
}

/// An ordered submovement plan.
#[derive(Debug, Clone)]
pub struct MovementPlan {
    pub legs: Vec<PlannedLeg>,
    /// The miss branch fired: the final endpoint lies outside the target
    pub missed: bool,
}

impl MovementPlan {
    pub fn final_endpoint(&self) -> Point {
        self.legs.last().expect("plans have at least one leg").endpoint
    }

    /// Share of the total duration taken by the primary leg.
    pub fn primary_fraction(&self) -> f64 {
        self.legs.first().expect("plans have at least one leg").fraction
    }
}

/// Plans submovements for one macro-movement.
#[derive(Debug, Clone)]
pub struct SubmovementPlanner {
    params: SubmovementParams,
    nominal_error_rate: f64,
}

impl SubmovementPlanner {
    pub fn new(params: SubmovementParams, nominal_error_rate: f64) -> Self {
        Self {
            params,
            nominal_error_rate,
        }
    }

    /// Decompose `start -> target` into an ordered list of legs.
    ///
    /// Guarantees: at least one leg; fractions sum to 1; the final
    /// endpoint is inside the target box unless `missed` is set, in which
    /// case it is strictly outside.
    pub fn plan(&self, rng: &mut MotorRng, start: Point, target: &Target) -> MovementPlan {
        let center = target.center;
        let distance = start.distance_to(center);

        if distance < DIRECT_LEG_DISTANCE_PX {
            return MovementPlan {
                legs: vec![PlannedLeg {
                    endpoint: center,
                    fraction: 1.0,
                }],
                missed: false,
            };
        }

        let mut legs = Vec::with_capacity(1 + self.params.max_corrections as usize);

        // Primary ballistic leg: covers primary_coverage of the distance
        // with an isotropic endpoint error.
        let primary_fraction = rng.uniform_in(0.70, 0.85);
        let error_std = self.params.primary_error_std * distance;
        let nominal_x = start.x + self.params.primary_coverage * (center.x - start.x);
        let nominal_y = start.y + self.params.primary_coverage * (center.y - start.y);
        let (ex, ey) = rng.bivariate_normal(nominal_x, nominal_y, error_std, error_std);
        let mut current = Point::new(ex, ey);
        legs.push(PlannedLeg {
            endpoint: current,
            fraction: primary_fraction,
        });
        let primary_distance = start.distance_to(current);

        let missed = rng.uniform() < self.nominal_error_rate;

        // Visually-guided corrections while the endpoint is still outside
        // the box. Error shrinks by half per correction round. A larger
        // residual error earns a longer correction within the 0.08-0.15
        // band, and the floor keeps every correction's peak speed below
        // the ballistic peak (duration normalization scales all legs
        // alike, so the speed ratio fixed here survives it).
        let mut correction = 0u32;
        while !target.contains(current) && correction < self.params.max_corrections {
            correction += 1;
            let error = current.distance_to(center);
            let std = self.params.primary_error_std / 2f64.powi(correction as i32) * error;
            let nominal_x = current.x + CORRECTION_GAIN * (center.x - current.x);
            let nominal_y = current.y + CORRECTION_GAIN * (center.y - current.y);
            let (cx, cy) = rng.bivariate_normal(nominal_x, nominal_y, std, std);
            let next = Point::new(cx, cy);

            let mut fraction = (0.08 + 0.07 * (error / 120.0).min(1.0)
                + rng.gaussian(0.0, 0.008))
            .clamp(0.08, 0.15);
            if primary_distance >= 1.0 {
                let speed_floor =
                    current.distance_to(next) * primary_fraction / (0.75 * primary_distance);
                fraction = fraction.max(speed_floor).clamp(0.08, 0.15);
            }

            current = next;
            legs.push(PlannedLeg {
                endpoint: current,
                fraction,
            });
        }

        // Endpoint contract: a miss ends strictly outside the box, a hit
        // strictly inside, whatever the correction loop left behind.
        let last = legs.last_mut().expect("primary leg present");
        if missed {
            last.endpoint = displace_outside(rng, target, last.endpoint);
        } else if !target.contains(last.endpoint) {
            last.endpoint = pull_inside(target, last.endpoint);
        }

        let total: f64 = legs.iter().map(|leg| leg.fraction).sum();
        for leg in &mut legs {
            leg.fraction /= total;
        }

        debug!(
            legs = legs.len(),
            missed,
            distance_px = format_args!("{distance:.1}"),
            "planned submovements"
        );

        MovementPlan { legs, missed }
    }
}

/// Scale factor along `(ux, uy)` at which a unit direction exits the box.
fn box_exit_scale(target: &Target, ux: f64, uy: f64) -> f64 {
    let rx = ux.abs() / (target.width / 2.0);
    let ry = uy.abs() / (target.height / 2.0);
    1.0 / rx.max(ry)
}

/// Move an endpoint just outside the target box along its current error
/// direction (a near-miss, not a wild one).
fn displace_outside(rng: &mut MotorRng, target: &Target, endpoint: Point) -> Point {
    let center = target.center;
    let (mut ux, mut uy) = (endpoint.x - center.x, endpoint.y - center.y);
    let norm = (ux * ux + uy * uy).sqrt();
    if norm < 1e-9 {
        let angle = rng.uniform_in(0.0, std::f64::consts::TAU);
        ux = angle.cos();
        uy = angle.sin();
    } else {
        ux /= norm;
        uy /= norm;
    }
    let overshoot = rng.uniform_in(1.05, 1.6);
    let scale = box_exit_scale(target, ux, uy) * overshoot;
    Point::new(center.x + ux * scale, center.y + uy * scale)
}

/// Pull an endpoint into the central 80% of the box, preserving its
/// direction from the center.
fn pull_inside(target: &Target, endpoint: Point) -> Point {
    let center = target.center;
    let (ux, uy) = (endpoint.x - center.x, endpoint.y - center.y);
    let norm = (ux * ux + uy * uy).sqrt();
    if norm < 1e-9 {
        return center;
    }
    let scale = box_exit_scale(target, ux / norm, uy / norm) * 0.8;
    if norm <= scale {
        return endpoint;
    }
    Point::new(
        center.x + ux / norm * scale,
        center.y + uy / norm * scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner(error_rate: f64) -> SubmovementPlanner {
        SubmovementPlanner::new(SubmovementParams::default(), error_rate)
    }

    fn target_at(x: f64, y: f64, w: f64, h: f64) -> Target {
        Target::new(Point::new(x, y), w, h)
    }

    #[test]
    fn test_at_least_one_leg() {
        let planner = planner(0.0);
        let mut rng = MotorRng::new(Some(42));
        for _ in 0..100 {
            let plan = planner.plan(&mut rng, Point::new(0.0, 0.0), &target_at(500.0, 300.0, 80.0, 80.0));
            assert!(!plan.legs.is_empty());
        }
    }

    #[test]
    fn test_fractions_sum_to_one() {
        let planner = planner(0.04);
        let mut rng = MotorRng::new(Some(7));
        for _ in 0..200 {
            let plan = planner.plan(&mut rng, Point::new(10.0, 10.0), &target_at(900.0, 200.0, 30.0, 30.0));
            let total: f64 = plan.legs.iter().map(|l| l.fraction).sum();
            assert!((total - 1.0).abs() < 1e-9, "fractions summed to {total}");
        }
    }

    #[test]
    fn test_hit_plans_end_inside_box() {
        let planner = planner(0.0);
        let mut rng = MotorRng::new(Some(11));
        let target = target_at(700.0, 400.0, 60.0, 60.0);
        for _ in 0..300 {
            let plan = planner.plan(&mut rng, Point::new(0.0, 0.0), &target);
            assert!(!plan.missed);
            assert!(target.contains(plan.final_endpoint()));
        }
    }

    #[test]
    fn test_miss_plans_end_outside_box() {
        let planner = planner(1.0);
        let mut rng = MotorRng::new(Some(42));
        let target = target_at(400.0, 0.0, 10.0, 10.0);
        for _ in 0..100 {
            let plan = planner.plan(&mut rng, Point::new(0.0, 0.0), &target);
            assert!(plan.missed);
            assert!(!target.contains(plan.final_endpoint()));
        }
    }

    #[test]
    fn test_miss_stays_near_box() {
        let planner = planner(1.0);
        let mut rng = MotorRng::new(Some(5));
        let target = target_at(400.0, 0.0, 10.0, 10.0);
        for _ in 0..100 {
            let plan = planner.plan(&mut rng, Point::new(0.0, 0.0), &target);
            let miss_distance = plan.final_endpoint().distance_to(target.center);
            assert!(miss_distance < 30.0, "miss landed {miss_distance} px away");
        }
    }

    #[test]
    fn test_small_target_generates_corrections() {
        let planner = planner(0.0);
        let mut rng = MotorRng::new(Some(42));
        let target = target_at(1000.0, 0.0, 5.0, 5.0);
        let mut with_corrections = 0;
        for _ in 0..100 {
            let plan = planner.plan(&mut rng, Point::new(0.0, 0.0), &target);
            if plan.legs.len() > 1 {
                with_corrections += 1;
            }
        }
        // a 5 px box 1000 px away is essentially never hit ballistically
        assert!(with_corrections >= 99, "only {with_corrections} plans corrected");
    }

    #[test]
    fn test_correction_count_bounded() {
        let planner = planner(0.04);
        let mut rng = MotorRng::new(Some(23));
        for _ in 0..300 {
            let plan = planner.plan(&mut rng, Point::new(0.0, 0.0), &target_at(1500.0, 900.0, 4.0, 4.0));
            assert!(plan.legs.len() <= 1 + SubmovementParams::default().max_corrections as usize);
        }
    }

    #[test]
    fn test_corrections_contract_toward_center() {
        let planner = planner(0.0);
        let mut rng = MotorRng::new(Some(31));
        let target = target_at(1000.0, 0.0, 5.0, 5.0);
        let mut ratios = Vec::new();
        for _ in 0..200 {
            let plan = planner.plan(&mut rng, Point::new(0.0, 0.0), &target);
            for pair in plan.legs.windows(2) {
                let before = pair[0].endpoint.distance_to(target.center);
                let after = pair[1].endpoint.distance_to(target.center);
                if before > 1.0 {
                    ratios.push(after / before);
                }
            }
        }
        let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
        assert!(mean <= 0.35, "mean contraction ratio was {mean}");
    }

    #[test]
    fn test_primary_fraction_range() {
        let planner = planner(0.0);
        let mut rng = MotorRng::new(Some(13));
        for _ in 0..100 {
            let plan = planner.plan(&mut rng, Point::new(0.0, 0.0), &target_at(600.0, 0.0, 40.0, 40.0));
            // 0.70..0.85 before normalization; never below 0.55 after
            assert!(plan.primary_fraction() > 0.55);
            assert!(plan.primary_fraction() <= 1.0);
        }
    }

    #[test]
    fn test_zero_distance_is_single_direct_leg() {
        let planner = planner(0.04);
        let mut rng = MotorRng::new(Some(3));
        let target = target_at(100.0, 100.0, 20.0, 20.0);
        let plan = planner.plan(&mut rng, Point::new(100.0, 100.0), &target);
        assert_eq!(plan.legs.len(), 1);
        assert_eq!(plan.legs[0].fraction, 1.0);
        assert!(!plan.missed);
        assert!(target.contains(plan.final_endpoint()));
    }

    #[test]
    fn test_pull_inside_rectangular_box() {
        let target = target_at(0.0, 0.0, 100.0, 20.0);
        let pulled = pull_inside(&target, Point::new(0.0, 50.0));
        assert!(target.contains(pulled));
        let pulled = pull_inside(&target, Point::new(200.0, 0.0));
        assert!(target.contains(pulled));
    }

    #[test]
    fn test_displace_outside_rectangular_box() {
        let target = target_at(0.0, 0.0, 100.0, 20.0);
        let mut rng = MotorRng::new(Some(17));
        for _ in 0..100 {
            let out = displace_outside(&mut rng, &target, Point::new(3.0, 2.0));
            assert!(!target.contains(out));
        }
    }
}
