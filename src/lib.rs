//! Noise-driven particle flow renderer.
//!
//! A [`store::ParameterStore`] owns the live [`drift_common::SimulationParams`]
//! and the [`simulation::Simulation`] they drive. Each tick fades the canvas,
//! rebuilds the spatial hash, steers every particle along the noise field
//! (plus neighbour alignment), moves and draws it.

pub mod canvas;
pub mod clock;
pub mod grid;
pub mod noise;
pub mod particle;
pub mod simulation;
pub mod store;

pub use canvas::{Canvas, Stroke};
pub use clock::FrameClock;
pub use grid::{SpatialHash, CELL_SIZE};
pub use noise::NoiseField;
pub use particle::{FlowContext, Particle};
pub use simulation::Simulation;
pub use store::{ChangeOutcome, ParameterStore, DEFAULT_EXPORT_PREFIX, RANDOM_SEED_MAX};
