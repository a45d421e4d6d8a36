//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Round a value to the given number of decimal places.
pub fn round_to<T>(value: T, decimal_places: i32) -> T
where
    T: Float
{
    let scale = T::from(10).unwrap().powi(decimal_places);

    (value * scale).round() / scale
}

/// Round a value to the nearest multiple of `step`.
///
/// A non-positive step leaves the value unchanged.
pub fn round_to_multiple<T>(value: T, step: T) -> T
where
    T: Float
{
    if step <= T::zero() {
        return value;
    }

    (value / step).round() * step
}

/// Get the signed angular distance between two angles in the range of [0, 2pi].
///
/// This function will return the shortest signed distance between a and b accounting for wrapping
/// between 0 and 2pi.
pub fn get_ang_dist_2pi<T>(a: T, b: T) -> T
where
    T: Float
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    let c = rem_euclid(a - b, tau_t);
    let d = rem_euclid(b - a, tau_t);

    if c < d {
        -c
    }
    else {
        d
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `self` is much smaller than `rhs.abs()` in
/// magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_ang_dist_2pi() {
        const TAU: f64 = std::f64::consts::TAU;

        assert_eq!(get_ang_dist_2pi(1f64, 2f64), 1f64);
        assert_eq!(get_ang_dist_2pi(2f64, 1f64), -1f64);
        assert_eq!(get_ang_dist_2pi(0f64, TAU), 0f64);
        assert_eq!(get_ang_dist_2pi(TAU, 0f64), 0f64);
        assert_eq!(get_ang_dist_2pi(1f64, TAU), -1f64);
        assert_eq!(get_ang_dist_2pi(0f64, TAU - 1f64), -1f64);
        assert_eq!(get_ang_dist_2pi(TAU - 1f64, 1f64), 2f64);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456f64, 4), 1.2346);
        assert_eq!(round_to(0.30483048f64, 4), 0.3048);
        assert_eq!(round_to(-2.00004f64, 4), -2.0);
        assert_eq!(round_to(7.5f64, 0), 8.0);
    }

    #[test]
    fn test_round_to_multiple() {
        assert_eq!(round_to_multiple(50f64, 45f64), 45.0);
        assert_eq!(round_to_multiple(-70f64, 45f64), -90.0);
        assert_eq!(round_to_multiple(3.3f64, 0f64), 3.3);
    }

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 10f64), (0f64, 1f64), 5f64), 0.5);
        assert_eq!(lin_map((2f64, 4f64), (10f64, 20f64), 3f64), 15.0);
    }
}
