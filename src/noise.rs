use drift_common::Vec2;
use ::noise::{NoiseFn, Perlin};
use std::f32::consts::TAU;

/// Largest value `sample` can return.
const SAMPLE_MAX: f32 = 1.0 - f32::EPSILON;

// Octave layout of the flow angle
const LOW_WEIGHT: f32 = 0.7;
const LOW_ANGLE_SPAN: f32 = 2.0 * TAU;
const HIGH_WEIGHT: f32 = 0.3;
const HIGH_ANGLE_SPAN: f32 = TAU;
const HIGH_SPATIAL_FACTOR: f32 = 2.5;
const HIGH_TEMPORAL_FACTOR: f32 = 1.5;
/// Shifts the high band away from the low band so they don't correlate.
const HIGH_OFFSET: f32 = 1000.0;

/// Seeded, continuous 3D noise over (x, y, time).
#[derive(Clone)]
pub struct NoiseField {
    seed: u64,
    perlin: Perlin,
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        NoiseField { seed, perlin: Perlin::new(fold_seed(seed)) }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Replaces the generator; subsequent samples depend only on `seed`.
    pub fn reseed(&mut self, seed: u64) {
        *self = NoiseField::new(seed);
    }

    /// Noise value in [0, 1). Deterministic for a fixed seed.
    pub fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        let raw = self.perlin.get([x as f64, y as f64, z as f64]) as f32;
        (raw * 0.5 + 0.5).clamp(0.0, SAMPLE_MAX)
    }

    /// Steering angle (radians) at `pos`: large-scale drift blended with
    /// finer, faster turbulence.
    pub fn flow_angle(&self, pos: Vec2, scale: f32, z: f32) -> f32 {
        let low = self.sample(pos.x * scale, pos.y * scale, z) * LOW_ANGLE_SPAN;

        let high_scale = scale * HIGH_SPATIAL_FACTOR;
        let high = self.sample(
            pos.x * high_scale + HIGH_OFFSET,
            pos.y * high_scale + HIGH_OFFSET,
            z * HIGH_TEMPORAL_FACTOR,
        ) * HIGH_ANGLE_SPAN;

        low * LOW_WEIGHT + high * HIGH_WEIGHT
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish()
    }
}

// Perlin takes a 32-bit seed; keep the high bits in play.
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}
