use crate::canvas::Canvas;
use crate::grid::SpatialHash;
use crate::noise::NoiseField;
use crate::particle::{FlowContext, Particle};
use anyhow::Result;
use drift_common::{map_range, FrameStats, SimulationParams, Vec2};
use log::{debug, trace};
use rand::prelude::*;
use rayon::prelude::*;

// Fade opacity (out of 255) at the ends of the trail persistence slider
const FADE_ALPHA_SHORT_TRAILS: f32 = 50.0;
const FADE_ALPHA_LONG_TRAILS: f32 = 5.0;
const PERSISTENCE_MIN: f32 = 1.0;
const PERSISTENCE_MAX: f32 = 30.0;

/// Opacity of the background wash drawn at the start of every tick.
pub fn fade_alpha(trail_persistence: f32) -> f32 {
    map_range(
        trail_persistence,
        PERSISTENCE_MIN,
        PERSISTENCE_MAX,
        FADE_ALPHA_SHORT_TRAILS,
        FADE_ALPHA_LONG_TRAILS,
    )
}

/// Owns the particle set, the spatial hash, the noise field and the canvas,
/// and advances them one frame at a time.
pub struct Simulation {
    width: u32,
    height: u32,
    particles: Vec<Particle>,
    grid: SpatialHash,
    noise: NoiseField,
    canvas: Canvas,
    /// Noise time coordinate, advanced by `time_evolution` per tick.
    time_offset: f32,
    frame: u64,
    // Per-tick snapshot buffers, reused across frames.
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    forces: Vec<Vec2>,
}

impl Simulation {
    /// Acquires a canvas and seeds the first particle batch from `params`.
    pub fn new(width: u32, height: u32, params: &SimulationParams) -> Result<Self> {
        params.validate()?;
        let canvas = Canvas::new(width, height, params.color_bg)?;
        let mut sim = Simulation {
            width,
            height,
            particles: Vec::new(),
            grid: SpatialHash::new(width, height),
            noise: NoiseField::new(params.seed),
            canvas,
            time_offset: 0.0,
            frame: 0,
            positions: Vec::new(),
            velocities: Vec::new(),
            forces: Vec::new(),
        };
        sim.reinit(params.seed, params)?;
        Ok(sim)
    }

    /// Discards every particle and rebuilds the scene from `seed`: fresh
    /// particles, time offset 0, reseeded noise, solid background.
    pub fn reinit(&mut self, seed: u64, params: &SimulationParams) -> Result<()> {
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let count = params.particle_count as usize;

        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            particles.push(Particle::spawn(&mut rng, self.width, self.height)?);
        }
        self.particles = particles;

        self.time_offset = 0.0;
        self.frame = 0;
        self.noise.reseed(seed);
        self.canvas.fill(params.color_bg);
        self.grid.clear();

        debug!("Reinitialized with seed {} and {} particles.", seed, count);
        Ok(())
    }

    /// Advances one frame: fade, rebuild the grid, steer and move every
    /// particle, draw, then advance the noise time.
    pub fn tick(&mut self, params: &SimulationParams) {
        self.canvas.fade(params.color_bg, fade_alpha(params.trail_persistence));

        // --- 1. Snapshot the previous frame and rebuild the grid ---
        self.positions.clear();
        self.positions.extend(self.particles.iter().map(|p| p.position));
        self.velocities.clear();
        self.velocities.extend(self.particles.iter().map(|p| p.velocity));
        self.grid.rebuild(&self.positions);

        // --- 2. Steering forces (parallel, read-only snapshot) ---
        let ctx = FlowContext {
            noise: &self.noise,
            grid: &self.grid,
            positions: &self.positions,
            velocities: &self.velocities,
            params,
            time_offset: self.time_offset,
        };
        (0..self.particles.len())
            .into_par_iter()
            .map(|idx| ctx.steering_force(idx))
            .collect_into_vec(&mut self.forces);

        // --- 3. Integrate, wrap and draw (serial, canvas order is stable) ---
        let (width, height) = (self.width as f32, self.height as f32);
        for (particle, force) in self.particles.iter_mut().zip(&self.forces) {
            particle.follow(*force);
            particle.integrate();
            particle.wrap_edges(width, height);
            particle.render(&mut self.canvas, params);
        }

        self.time_offset += params.time_evolution;
        self.frame += 1;
        trace!("Frame {} done, time offset {:.5}.", self.frame, self.time_offset);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to the particle set, e.g. to reorder it.
    pub fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn time_offset(&self) -> f32 {
        self.time_offset
    }

    /// Ticks since the last reinit.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn seed(&self) -> u64 {
        self.noise.seed()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn stats(&self) -> FrameStats {
        let count = self.particles.len();
        let (speed_sum, max_ratio) = self.particles.iter().fold((0.0f32, 0.0f32), |(sum, max), p| {
            let speed = p.speed();
            (sum + speed, max.max(speed / p.max_speed))
        });
        FrameStats {
            frame: self.frame,
            time_offset: self.time_offset,
            particle_count: count as u32,
            mean_speed: if count > 0 { speed_sum / count as f32 } else { 0.0 },
            max_speed_ratio: max_ratio.min(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_common::HexColor;
    use image::Rgb;

    fn small_params() -> SimulationParams {
        SimulationParams { particle_count: 200, ..SimulationParams::default() }
    }

    #[test]
    fn fade_alpha_follows_persistence() {
        assert_eq!(fade_alpha(1.0), 50.0);
        assert_eq!(fade_alpha(30.0), 5.0);
        assert!(fade_alpha(12.0) < fade_alpha(5.0));
    }

    #[test]
    fn new_rejects_missing_surface() {
        assert!(Simulation::new(0, 0, &small_params()).is_err());
    }

    #[test]
    fn new_places_requested_count() {
        let sim = Simulation::new(300, 200, &small_params()).unwrap();
        assert_eq!(sim.particles().len(), 200);
        assert_eq!(sim.frame(), 0);
        assert_eq!(sim.time_offset(), 0.0);
        assert_eq!(sim.seed(), 12345);
    }

    #[test]
    fn tick_advances_time_and_moves_particles() {
        let params = small_params();
        let mut sim = Simulation::new(300, 300, &params).unwrap();
        let before: Vec<Vec2> = sim.particles().iter().map(|p| p.position).collect();
        sim.tick(&params);
        sim.tick(&params);
        assert_eq!(sim.frame(), 2);
        assert!((sim.time_offset() - 2.0 * params.time_evolution).abs() < 1e-9);
        let moved = sim.particles().iter().zip(&before).filter(|(p, b)| p.position != **b).count();
        assert!(moved > 0);
        for p in sim.particles() {
            assert!(p.position.x >= 0.0 && p.position.x <= 300.0);
            assert!(p.position.y >= 0.0 && p.position.y <= 300.0);
            assert!(p.speed() <= p.max_speed + 1e-4);
            assert_eq!(p.acceleration, Vec2::ZERO);
        }
    }

    #[test]
    fn reinit_resets_time_and_repaints() {
        let mut params = small_params();
        let mut sim = Simulation::new(120, 120, &params).unwrap();
        for _ in 0..5 {
            sim.tick(&params);
        }
        params.color_bg = HexColor::new(1, 2, 3);
        params.particle_count = 50;
        sim.reinit(777, &params).unwrap();
        assert_eq!(sim.particles().len(), 50);
        assert_eq!(sim.time_offset(), 0.0);
        assert_eq!(sim.frame(), 0);
        assert_eq!(sim.seed(), 777);
        assert_eq!(sim.canvas().pixel(60, 60), Rgb([1, 2, 3]));
    }

    #[test]
    fn stats_summarise_speeds() {
        let params = small_params();
        let mut sim = Simulation::new(200, 200, &params).unwrap();
        assert_eq!(sim.stats().mean_speed, 0.0);
        sim.tick(&params);
        let stats = sim.stats();
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.particle_count, 200);
        assert!(stats.mean_speed > 0.0);
        assert!(stats.max_speed_ratio <= 1.0);
    }
}
