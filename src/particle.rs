use crate::canvas::{Canvas, Stroke};
use crate::grid::SpatialHash;
use crate::noise::NoiseField;
use anyhow::Result;
use drift_common::{angle_to_vec, map_range, HexColor, SimulationParams, Vec2};
use rand::distr::Uniform;
use rand::Rng;

/// Range a particle's speed cap is drawn from at creation.
pub const MIN_MAX_SPEED: f32 = 1.5;
pub const MAX_MAX_SPEED: f32 = 4.0;

const FLOW_FORCE_FACTOR: f32 = 0.1;
const ALIGNMENT_FORCE_FACTOR: f32 = 0.05;

// Stroke ranges, mapped from speed 0 to the particle's speed cap
const ALPHA_SLOW: f32 = 30.0;
const ALPHA_FAST: f32 = 120.0;
const WEIGHT_SLOW: f32 = 1.5;
const WEIGHT_FAST: f32 = 0.5;

/// One simulated tracer.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    /// Position before the last integration; the rendered segment starts here.
    pub previous: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Speed cap, fixed at creation.
    pub max_speed: f32,
}

impl Particle {
    /// A particle at rest at `position`.
    pub fn at_rest(position: Vec2, max_speed: f32) -> Self {
        Particle {
            position,
            previous: position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            max_speed,
        }
    }

    /// Places a particle uniformly on the canvas with a random speed cap.
    /// Draws x, then y, then the speed cap from `rng`.
    pub fn spawn<R: Rng>(rng: &mut R, width: u32, height: u32) -> Result<Self> {
        let x_dist = Uniform::new(0.0f32, width as f32)?;
        let y_dist = Uniform::new(0.0f32, height as f32)?;
        let speed_dist = Uniform::new(MIN_MAX_SPEED, MAX_MAX_SPEED)?;
        let x = rng.sample(x_dist);
        let y = rng.sample(y_dist);
        let max_speed = rng.sample(speed_dist);
        Ok(Particle::at_rest(Vec2::new(x, y), max_speed))
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Accumulates a steering force into the acceleration.
    pub fn follow(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Applies the accumulated acceleration and moves one step.
    pub fn integrate(&mut self) {
        self.velocity = (self.velocity + self.acceleration).limit(self.max_speed);
        self.previous = self.position;
        self.position += self.velocity;
        self.acceleration = Vec2::ZERO;
    }

    /// Toroidal wraparound. The wrapped axis of `previous` moves with the
    /// position so the segment does not streak across the canvas.
    pub fn wrap_edges(&mut self, width: f32, height: f32) {
        if self.position.x > width {
            self.position.x = 0.0;
            self.previous.x = 0.0;
        }
        if self.position.x < 0.0 {
            self.position.x = width;
            self.previous.x = width;
        }
        if self.position.y > height {
            self.position.y = 0.0;
            self.previous.y = 0.0;
        }
        if self.position.y < 0.0 {
            self.position.y = height;
            self.previous.y = height;
        }
    }

    /// Color, opacity and thickness for the current speed. Fast particles
    /// are drawn thinner and more opaque.
    pub fn stroke(&self, color_slow: HexColor, color_fast: HexColor) -> Stroke {
        let speed = self.speed();
        let t = map_range(speed, 0.0, self.max_speed, 0.0, 1.0).clamp(0.0, 1.0);
        Stroke {
            color: color_slow.lerp(color_fast, t),
            alpha: map_range(speed, 0.0, self.max_speed, ALPHA_SLOW, ALPHA_FAST),
            weight: map_range(speed, 0.0, self.max_speed, WEIGHT_SLOW, WEIGHT_FAST),
        }
    }

    pub fn render(&self, canvas: &mut Canvas, params: &SimulationParams) {
        let stroke = self.stroke(params.color_slow, params.color_fast);
        canvas.stroke_segment(self.previous, self.position, &stroke);
    }
}

/// Read-only view of the particle set used to compute every steering force
/// of a tick before any particle moves.
pub struct FlowContext<'a> {
    pub noise: &'a NoiseField,
    pub grid: &'a SpatialHash,
    pub positions: &'a [Vec2],
    pub velocities: &'a [Vec2],
    pub params: &'a SimulationParams,
    pub time_offset: f32,
}

impl FlowContext<'_> {
    /// Steering force for particle `idx`: the noise flow direction, plus
    /// alignment with the average neighbour velocity when enabled.
    pub fn steering_force(&self, idx: usize) -> Vec2 {
        let pos = self.positions[idx];
        let angle = self.noise.flow_angle(pos, self.params.noise_scale, self.time_offset);
        let mut force = angle_to_vec(angle).with_length(self.params.flow_intensity * FLOW_FORCE_FACTOR);

        if self.params.neighbor_influence > 0.0 {
            force += self.alignment(idx, pos);
        }
        force
    }

    fn alignment(&self, idx: usize, pos: Vec2) -> Vec2 {
        let mut sum = Vec2::ZERO;
        let mut count = 0u32;
        self.grid.for_each_neighbor(idx as u32, pos, self.positions, |neighbor_idx| {
            sum += self.velocities[neighbor_idx as usize];
            count += 1;
            true
        });

        if count == 0 {
            return Vec2::ZERO;
        }
        (sum / count as f32).with_length(self.params.neighbor_influence * ALIGNMENT_FORCE_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn spawn_stays_on_canvas_with_valid_cap() {
        let mut rng = StdRng::seed_from_u64(12345);
        for _ in 0..1000 {
            let p = Particle::spawn(&mut rng, 900, 600).unwrap();
            assert!(p.position.x >= 0.0 && p.position.x < 900.0);
            assert!(p.position.y >= 0.0 && p.position.y < 600.0);
            assert!(p.max_speed >= MIN_MAX_SPEED && p.max_speed < MAX_MAX_SPEED);
            assert_eq!(p.velocity, Vec2::ZERO);
            assert_eq!(p.previous, p.position);
        }
    }

    #[test]
    fn integrate_caps_speed_and_clears_acceleration() {
        let mut p = Particle::at_rest(Vec2::new(100.0, 100.0), 2.0);
        p.follow(Vec2::new(30.0, -40.0));
        p.integrate();
        assert!(p.speed() <= p.max_speed + 1e-5);
        assert_eq!(p.acceleration, Vec2::ZERO);
        assert_eq!(p.previous, Vec2::new(100.0, 100.0));
        assert!((p.position.x - 101.2).abs() < 1e-4);
        assert!((p.position.y - 98.4).abs() < 1e-4);
    }

    #[test]
    fn integrate_keeps_slow_velocity() {
        let mut p = Particle::at_rest(Vec2::new(10.0, 10.0), 4.0);
        p.follow(Vec2::new(0.1, 0.0));
        p.follow(Vec2::new(0.0, 0.2));
        p.integrate();
        assert_eq!(p.velocity, Vec2::new(0.1, 0.2));
    }

    #[test]
    fn wraps_each_edge() {
        let mut right = Particle::at_rest(Vec2::new(900.5, 10.0), 2.0);
        right.previous = Vec2::new(899.0, 10.0);
        right.wrap_edges(900.0, 900.0);
        assert_eq!(right.position.x, 0.0);
        assert_eq!(right.previous.x, 0.0);
        assert_eq!(right.previous.y, 10.0);

        let mut left = Particle::at_rest(Vec2::new(-0.1, 10.0), 2.0);
        left.wrap_edges(900.0, 900.0);
        assert_eq!(left.position.x, 900.0);

        let mut bottom = Particle::at_rest(Vec2::new(5.0, 901.0), 2.0);
        bottom.wrap_edges(900.0, 900.0);
        assert_eq!(bottom.position.y, 0.0);

        let mut top = Particle::at_rest(Vec2::new(5.0, -3.0), 2.0);
        top.wrap_edges(900.0, 900.0);
        assert_eq!((top.position.y, top.previous.y), (900.0, 900.0));

        let mut inside = Particle::at_rest(Vec2::new(900.0, 0.0), 2.0);
        inside.wrap_edges(900.0, 900.0);
        assert_eq!(inside.position, Vec2::new(900.0, 0.0));
    }

    #[test]
    fn stroke_interpolates_by_speed() {
        let slow = HexColor::new(0xd9, 0x77, 0x57);
        let fast = HexColor::new(0x4e, 0xcd, 0xc4);

        let resting = Particle::at_rest(Vec2::new(0.0, 0.0), 2.0);
        let s = resting.stroke(slow, fast);
        assert_eq!(s.color, slow);
        assert_eq!(s.alpha, ALPHA_SLOW);
        assert_eq!(s.weight, WEIGHT_SLOW);

        let mut flying = Particle::at_rest(Vec2::new(0.0, 0.0), 2.0);
        flying.velocity = Vec2::new(2.0, 0.0);
        let s = flying.stroke(slow, fast);
        assert_eq!(s.color, fast);
        assert_eq!(s.alpha, ALPHA_FAST);
        assert_eq!(s.weight, WEIGHT_FAST);
    }

    fn context_fixture(params: &SimulationParams, positions: &[Vec2], velocities: &[Vec2], f: impl FnOnce(&FlowContext)) {
        let noise = NoiseField::new(params.seed);
        let mut grid = SpatialHash::new(900, 900);
        grid.rebuild(positions);
        let ctx = FlowContext { noise: &noise, grid: &grid, positions, velocities, params, time_offset: 0.0 };
        f(&ctx);
    }

    #[test]
    fn flow_force_has_intensity_magnitude_without_neighbours() {
        let params = SimulationParams::default();
        let positions = [Vec2::new(450.0, 450.0)];
        let velocities = [Vec2::ZERO];
        context_fixture(&params, &positions, &velocities, |ctx| {
            let force = ctx.steering_force(0);
            assert!((force.length() - params.flow_intensity * FLOW_FORCE_FACTOR).abs() < 1e-5);
        });
    }

    #[test]
    fn neighbour_alignment_adds_scaled_average_velocity() {
        let mut params = SimulationParams::default();
        params.neighbor_influence = 1.0;
        let positions = [Vec2::new(450.0, 450.0), Vec2::new(460.0, 450.0), Vec2::new(450.0, 470.0)];
        let velocities = [Vec2::ZERO, Vec2::new(3.0, 0.0), Vec2::new(1.0, 0.0)];

        context_fixture(&params, &positions, &velocities, |ctx| {
            let with_neighbours = ctx.steering_force(0);
            let mut alone = params.clone();
            alone.neighbor_influence = 0.0;
            let bare = FlowContext { params: &alone, ..*ctx }.steering_force(0);
            let delta = with_neighbours - bare;
            assert!((delta.x - ALIGNMENT_FORCE_FACTOR).abs() < 1e-5);
            assert!(delta.y.abs() < 1e-5);
        });
    }

    #[test]
    fn zero_average_neighbour_velocity_adds_nothing() {
        let mut params = SimulationParams::default();
        params.neighbor_influence = 0.8;
        let positions = [Vec2::new(100.0, 100.0), Vec2::new(110.0, 100.0)];
        let velocities = [Vec2::ZERO, Vec2::ZERO];
        context_fixture(&params, &positions, &velocities, |ctx| {
            let force = ctx.steering_force(0);
            assert!((force.length() - params.flow_intensity * FLOW_FORCE_FACTOR).abs() < 1e-5);
        });
    }
}
