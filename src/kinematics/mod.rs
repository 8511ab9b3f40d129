//! Kinematic models
//!
//! The deterministic and stochastic building blocks of a movement:
//! Fitts'-Law movement times, asymmetric minimum-jerk profiles, curved
//! 2-D path lifts, and submovement decomposition.

pub mod fitts;
pub mod minimum_jerk;
pub mod path;
pub mod submovement;

pub use fitts::{index_of_difficulty, FittsSampler};
pub use minimum_jerk::{profile, JerkProfile};
pub use path::curved_path;
pub use submovement::{MovementPlan, PlannedLeg, SubmovementPlanner};
