//! Hermite spline segments

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

use crate::project::{FitMethod, Waypoint};
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Below this speed (|dP/dt|) the curvature of a spline is taken to be zero.
const MIN_CURVATURE_SPEED: f64 = 1e-12;

/// Maximum number of intervals kept in a spline's arc length table.
///
/// Finer sample densities are integrated in full but only every `stride`th
/// cumulative length is stored, lookups re-walk one stored interval.
const MAX_ARC_TABLE_INTERVALS: usize = 1024;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A parametric Hermite spline joining two waypoints, parametrised by
/// `t` in [0, 1].
///
/// The end tangents point along the waypoint headings with a magnitude equal
/// to the chord length. Quintic splines additionally have zero second
/// derivative at both ends.
#[derive(Debug, Clone)]
pub struct HermiteSpline {
    fit_method: FitMethod,

    start: Vector2<f64>,
    end: Vector2<f64>,
    start_tangent: Vector2<f64>,
    end_tangent: Vector2<f64>,

    /// Cumulative arc length at every `stride`th sample, starting at 0
    arc_table: Vec<f64>,

    /// Number of samples between two arc table entries
    stride: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HermiteSpline {
    /// Fit a spline between two waypoints, or `None` if they are at the same
    /// position.
    ///
    /// `samples` is the number of intervals used for the arc length table.
    pub fn fit(from: &Waypoint, to: &Waypoint, fit_method: FitMethod, samples: usize) -> Option<Self> {
        let start = Vector2::new(from.x(), from.y());
        let end = Vector2::new(to.x(), to.y());

        let chord = (end - start).norm();
        if !chord.is_finite() || chord <= f64::EPSILON {
            return None;
        }

        let heading_vec = |h: f64| Vector2::new(h.cos(), h.sin());

        let mut spline = Self {
            fit_method,
            start,
            end,
            start_tangent: heading_vec(from.heading_rad()) * chord,
            end_tangent: heading_vec(to.heading_rad()) * chord,
            arc_table: Vec::new(),
            stride: 1,
        };
        spline.build_arc_table(samples.max(1));

        Some(spline)
    }

    /// Position at parameter `t`.
    pub fn point(&self, t: f64) -> Vector2<f64> {
        self.combine(self.basis(t, 0))
    }

    /// First derivative with respect to `t`.
    pub fn derivative(&self, t: f64) -> Vector2<f64> {
        self.combine(self.basis(t, 1))
    }

    /// Second derivative with respect to `t`.
    pub fn second_derivative(&self, t: f64) -> Vector2<f64> {
        self.combine(self.basis(t, 2))
    }

    /// Direction of travel at parameter `t`.
    ///
    /// Units: radians
    pub fn heading(&self, t: f64) -> f64 {
        let d = self.derivative(t);
        d.y.atan2(d.x)
    }

    /// Signed curvature at parameter `t`, positive when turning left.
    pub fn curvature(&self, t: f64) -> f64 {
        let d = self.derivative(t);
        let dd = self.second_derivative(t);
        let speed = d.norm();

        if speed < MIN_CURVATURE_SPEED {
            return 0.0;
        }

        (d.x * dd.y - d.y * dd.x) / speed.powi(3)
    }

    /// Total arc length of the spline.
    pub fn length(&self) -> f64 {
        self.arc_table.last().copied().unwrap_or(0.0)
    }

    /// Parameter `t` at which the given arc length is reached.
    ///
    /// Distances outside [0, length] are clamped.
    pub fn param_at_distance(&self, distance: f64) -> f64 {
        let distance = distance.max(0.0).min(self.length());

        // First table entry at or beyond the distance
        let idx = self.arc_table.partition_point(|&s| s < distance);
        if idx == 0 {
            return 0.0;
        }
        if idx >= self.arc_table.len() {
            return 1.0;
        }

        // Repeat the integration over the stored interval, which reproduces
        // the table entries exactly
        let first = (idx - 1) * self.stride;
        let mut s0 = self.arc_table[idx - 1];
        let mut last = self.point(self.sample_param(first));

        for i in first + 1..=first + self.stride {
            let t1 = self.sample_param(i);
            let p = self.point(t1);
            let s1 = s0 + (p - last).norm();

            if s1 >= distance {
                if distance >= s1 || s1 - s0 <= f64::EPSILON {
                    return t1;
                }
                return lin_map((s0, s1), (self.sample_param(i - 1), t1), distance);
            }

            s0 = s1;
            last = p;
        }

        self.sample_param(idx * self.stride)
    }

    /// Number of intervals kept in the arc length table.
    pub fn arc_table_intervals(&self) -> usize {
        self.arc_table.len() - 1
    }

    fn sample_param(&self, i: usize) -> f64 {
        i as f64 / (self.arc_table_intervals() * self.stride) as f64
    }

    /// Weighted sum of the control vectors given the basis weights for
    /// (start, start tangent, end tangent, end).
    fn combine(&self, w: [f64; 4]) -> Vector2<f64> {
        self.start * w[0] + self.start_tangent * w[1] + self.end_tangent * w[2] + self.end * w[3]
    }

    /// Hermite basis weights (or their `order`th derivative) at `t`.
    fn basis(&self, t: f64, order: u8) -> [f64; 4] {
        let t2 = t * t;
        let t3 = t2 * t;

        match self.fit_method {
            FitMethod::Cubic => match order {
                0 => [
                    2.0 * t3 - 3.0 * t2 + 1.0,
                    t3 - 2.0 * t2 + t,
                    t3 - t2,
                    -2.0 * t3 + 3.0 * t2,
                ],
                1 => [
                    6.0 * t2 - 6.0 * t,
                    3.0 * t2 - 4.0 * t + 1.0,
                    3.0 * t2 - 2.0 * t,
                    -6.0 * t2 + 6.0 * t,
                ],
                _ => [
                    12.0 * t - 6.0,
                    6.0 * t - 4.0,
                    6.0 * t - 2.0,
                    -12.0 * t + 6.0,
                ],
            },
            FitMethod::Quintic => {
                let t4 = t3 * t;
                let t5 = t4 * t;

                match order {
                    0 => [
                        1.0 - 10.0 * t3 + 15.0 * t4 - 6.0 * t5,
                        t - 6.0 * t3 + 8.0 * t4 - 3.0 * t5,
                        -4.0 * t3 + 7.0 * t4 - 3.0 * t5,
                        10.0 * t3 - 15.0 * t4 + 6.0 * t5,
                    ],
                    1 => [
                        -30.0 * t2 + 60.0 * t3 - 30.0 * t4,
                        1.0 - 18.0 * t2 + 32.0 * t3 - 15.0 * t4,
                        -12.0 * t2 + 28.0 * t3 - 15.0 * t4,
                        30.0 * t2 - 60.0 * t3 + 30.0 * t4,
                    ],
                    _ => [
                        -60.0 * t + 180.0 * t2 - 120.0 * t3,
                        -36.0 * t + 96.0 * t2 - 60.0 * t3,
                        -24.0 * t + 84.0 * t2 - 60.0 * t3,
                        60.0 * t - 180.0 * t2 + 120.0 * t3,
                    ],
                }
            }
        }
    }

    fn build_arc_table(&mut self, samples: usize) {
        let stride = (samples + MAX_ARC_TABLE_INTERVALS - 1) / MAX_ARC_TABLE_INTERVALS;
        let intervals = (samples + stride - 1) / stride;
        let total = (intervals * stride) as f64;

        let mut table = Vec::with_capacity(intervals + 1);
        let mut length = 0.0;
        let mut last = self.point(0.0);
        table.push(0.0);

        for i in 1..=intervals * stride {
            let p = self.point(i as f64 / total);
            length += (p - last).norm();
            last = p;

            if i % stride == 0 {
                table.push(length);
            }
        }

        self.arc_table = table;
        self.stride = stride;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
