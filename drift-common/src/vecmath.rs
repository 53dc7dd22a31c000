use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Sub};

/// A 2D vector in canvas space (pixels, y pointing down).
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Creates a new Vec2.
    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Calculates the squared length (magnitude) of the vector.
    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Calculates the length (magnitude) of the vector.
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Returns a unit vector pointing the same way, or zero for a zero vector.
    pub fn normalize_or_zero(&self) -> Self {
        let len_sq = self.length_squared();
        if len_sq > 1e-12 {
            let inv_len = 1.0 / len_sq.sqrt();
            Vec2 { x: self.x * inv_len, y: self.y * inv_len }
        } else {
            Vec2::ZERO
        }
    }

    /// Rescales the vector to the given magnitude. A zero vector stays zero.
    pub fn with_length(&self, magnitude: f32) -> Self {
        self.normalize_or_zero() * magnitude
    }

    /// Caps the magnitude at `max`, keeping the direction.
    pub fn limit(&self, max: f32) -> Self {
        let len_sq = self.length_squared();
        if len_sq > max * max {
            *self * (max / len_sq.sqrt())
        } else {
            *self
        }
    }

    /// Calculates the squared distance to another point.
    pub fn distance_squared(&self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Calculates the distance to another point.
    pub fn distance(&self, other: Vec2) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Perpendicular vector (rotated 90 degrees counter-clockwise).
    pub fn perp(&self) -> Self {
        Vec2 { x: -self.y, y: self.x }
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self { x: self.x - other.x, y: self.y - other.y }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self { x: self.x * scalar, y: self.y * scalar }
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;
    fn div(self, scalar: f32) -> Self {
        Self { x: self.x / scalar, y: self.y / scalar }
    }
}

/// Converts an angle (in radians) to a unit vector.
pub fn angle_to_vec(angle_rad: f32) -> Vec2 {
    Vec2::new(angle_rad.cos(), angle_rad.sin())
}

/// Linearly remaps `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
/// The result is not clamped.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if (in_max - in_min).abs() < f32::EPSILON {
        return out_min;
    }
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_caps_long_vectors_only() {
        let long = Vec2::new(3.0, 4.0).limit(2.5);
        assert!((long.length() - 2.5).abs() < 1e-6);
        assert!((long.x / long.y - 0.75).abs() < 1e-6);

        let short = Vec2::new(0.3, 0.4);
        assert_eq!(short.limit(2.5), short);
    }

    #[test]
    fn with_length_keeps_zero_vector() {
        assert_eq!(Vec2::ZERO.with_length(3.0), Vec2::ZERO);
        let v = Vec2::new(0.0, -2.0).with_length(0.5);
        assert!((v.y + 0.5).abs() < 1e-6);
    }

    #[test]
    fn map_range_matches_endpoints() {
        assert_eq!(map_range(1.0, 1.0, 30.0, 50.0, 5.0), 50.0);
        assert_eq!(map_range(30.0, 1.0, 30.0, 50.0, 5.0), 5.0);
        assert_eq!(map_range(2.0, 0.0, 4.0, 1.5, 0.5), 1.0);
    }
}
