//! Jerk limited velocity profiles
//!
//! The profile is built by passing a velocity impulse through two moving
//! average filters. The first filter's length is the time needed to reach
//! full velocity at the acceleration limit, the second's the time needed to
//! reach full acceleration at the jerk limit, which together bound the
//! acceleration and jerk of the output.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use std::collections::VecDeque;

use super::GenerationError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Hard cap on the number of samples in a profile.
pub const MAX_PROFILE_SAMPLES: usize = 1_000_000;

/// Tolerance used when snapping step counts to whole numbers.
const STEP_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motion along the path at one time step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProfileSample {
    /// Distance travelled
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub jerk: f64,
}

/// A rest to rest profile covering a fixed distance.
#[derive(Debug, Clone)]
pub struct SCurveProfile {
    /// Sample spacing.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Samples, the first of which is at rest at time 0.
    pub samples: Vec<ProfileSample>,

    /// Cruise velocity actually used, which is below the limit for paths too
    /// short to reach it.
    pub cruise_velocity: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SCurveProfile {
    /// Build a profile covering `length` within the given limits.
    pub fn new(
        length: f64,
        max_velocity: f64,
        max_acceleration: f64,
        max_jerk: f64,
        dt_s: f64,
    ) -> Result<Self, GenerationError> {
        for &(name, value) in &[
            ("length", length),
            ("velocity", max_velocity),
            ("acceleration", max_acceleration),
            ("jerk", max_jerk),
            ("time step", dt_s),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GenerationError::Infeasible(format!(
                    "the {} must be finite and > 0, found {}",
                    name, value
                )));
            }
        }

        // Short paths never reach the velocity limit, so cruise at the peak of
        // a triangular profile instead.
        let mut velocity = max_velocity.min((length * max_acceleration).sqrt());
        let mut f1_len = steps(velocity / max_acceleration / dt_s);
        let mut impulse = snap(length / velocity / dt_s);

        // The first filter must saturate for the profile to cover exactly the
        // requested length, which needs at least as many impulse steps as
        // the filter is long.
        if impulse.floor() < f1_len as f64 {
            velocity = length / (f1_len as f64 * dt_s);
            impulse = f1_len as f64;
            f1_len = steps(velocity / max_acceleration / dt_s);
        }

        let f2_len = steps(max_acceleration / max_jerk / dt_s);

        let expected = impulse.ceil() + f1_len as f64 + f2_len as f64 + 1.0;
        if expected > MAX_PROFILE_SAMPLES as f64 {
            return Err(GenerationError::Infeasible(format!(
                "the profile would need {:.0} samples, the limit is {}",
                expected, MAX_PROFILE_SAMPLES
            )));
        }

        trace!(
            "Profile: length {}, cruise velocity {}, filters {}/{}, impulse {}",
            length,
            velocity,
            f1_len,
            f2_len,
            impulse
        );

        let samples = filter(impulse, f1_len, f2_len, velocity, dt_s);

        Ok(Self {
            dt_s,
            samples,
            cruise_velocity: velocity,
        })
    }

    /// Distance covered by the profile.
    pub fn length(&self) -> f64 {
        self.samples.last().map(|s| s.position).unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the two stage filter.
fn filter(mut impulse: f64, f1_len: usize, f2_len: usize, velocity: f64, dt_s: f64) -> Vec<ProfileSample> {
    let mut samples = vec![ProfileSample::default()];
    let mut window: VecDeque<f64> = VecDeque::with_capacity(f2_len + 1);
    let mut f1 = 0.0;

    loop {
        // Full steps of the impulse, then whatever fraction is left while
        // starting to decelerate, then deceleration only.
        let input = if impulse >= 1.0 {
            impulse -= 1.0;
            1.0
        } else {
            let input = impulse - 1.0;
            impulse = 0.0;
            input
        };

        f1 = (f1 + input).max(0.0).min(f1_len as f64);

        window.push_back(f1);
        if window.len() > f2_len {
            window.pop_front();
        }
        let f2: f64 = window.iter().sum::<f64>() / f1_len as f64;

        let last = samples[samples.len() - 1];
        let v = f2 / f2_len as f64 * velocity;
        let a = (v - last.velocity) / dt_s;

        samples.push(ProfileSample {
            position: last.position + (last.velocity + v) / 2.0 * dt_s,
            velocity: v,
            acceleration: a,
            jerk: (a - last.acceleration) / dt_s,
        });

        if impulse <= 0.0 && v <= 0.0 {
            break;
        }
    }

    samples
}

/// Number of whole steps needed to cover `value` steps.
fn steps(value: f64) -> usize {
    (value - STEP_EPSILON).ceil().max(1.0) as usize
}

/// Snap a step count which is a whole number up to floating point error.
fn snap(value: f64) -> f64 {
    if (value - value.round()).abs() < STEP_EPSILON {
        value.round()
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
