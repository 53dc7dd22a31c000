use crate::simulation::Simulation;
use anyhow::{Context, Result};
use drift_common::{find_preset, ParamKey, ParamValue, ReinitPolicy, SimulationParams};
use log::{debug, info, warn};
use rand::Rng;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXPORT_PREFIX: &str = "neural-drift";

/// Largest seed the random seed button picks.
pub const RANDOM_SEED_MAX: u64 = 999_999;

/// What a single parameter write did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Input was rejected; the previous value is kept.
    Ignored,
    /// Read by the next tick.
    Live,
    /// The simulation was rebuilt.
    Reinitialized,
}

/// Owns the live parameters and the simulation they drive. Every mutation
/// goes through here, between ticks.
pub struct ParameterStore {
    params: SimulationParams,
    policy: ReinitPolicy,
    simulation: Simulation,
}

impl ParameterStore {
    /// Builds the simulation for `params` on a `width` x `height` canvas,
    /// using the default reinit policy.
    pub fn new(params: SimulationParams, width: u32, height: u32) -> Result<Self> {
        Self::with_policy(params, ReinitPolicy::default(), width, height)
    }

    pub fn with_policy(params: SimulationParams, policy: ReinitPolicy, width: u32, height: u32) -> Result<Self> {
        let simulation = Simulation::new(width, height, &params)
            .context("Failed to acquire the render surface")?;
        Ok(ParameterStore { params, policy, simulation })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    /// Writes one parameter. Keys in the reinit policy rebuild the scene;
    /// everything else is picked up by the next tick.
    pub fn on_change(&mut self, key: ParamKey, value: ParamValue) -> Result<ChangeOutcome> {
        let mut next = self.params.clone();
        if !next.set(key, value) {
            warn!("Ignoring {} = {}: not accepted for this parameter.", key, value);
            return Ok(ChangeOutcome::Ignored);
        }
        self.params = next;
        debug!("Set {} = {}.", key, self.params.get(key));

        if self.policy.requires_reinit(key) {
            self.reinit()?;
            return Ok(ChangeOutcome::Reinitialized);
        }
        Ok(ChangeOutcome::Live)
    }

    /// Widget-facing variant of [`Self::on_change`] taking raw text. Text
    /// that does not parse for the key is ignored.
    pub fn on_change_str(&mut self, key: &str, raw: &str) -> Result<ChangeOutcome> {
        let key: ParamKey = key.parse()?;
        match ParamValue::parse_for(key, raw) {
            Some(value) => self.on_change(key, value),
            None => {
                warn!("Ignoring {} = '{}': could not parse input.", key, raw);
                Ok(ChangeOutcome::Ignored)
            }
        }
    }

    /// Steps the seed down by one, stopping at 1.
    pub fn previous_seed(&mut self) -> Result<ChangeOutcome> {
        let seed = self.params.seed.saturating_sub(1).max(1);
        self.change_seed(seed)
    }

    pub fn next_seed(&mut self) -> Result<ChangeOutcome> {
        let seed = self.params.seed.saturating_add(1).min(i64::MAX as u64);
        self.change_seed(seed)
    }

    /// Picks a seed in `1..=RANDOM_SEED_MAX` from the thread-local generator.
    pub fn random_seed(&mut self) -> Result<ChangeOutcome> {
        self.random_seed_with(&mut rand::rng())
    }

    pub fn random_seed_with<R: Rng>(&mut self, rng: &mut R) -> Result<ChangeOutcome> {
        let seed = rng.random_range(1..=RANDOM_SEED_MAX);
        self.change_seed(seed)
    }

    fn change_seed(&mut self, seed: u64) -> Result<ChangeOutcome> {
        self.on_change(ParamKey::Seed, ParamValue::Int(seed as i64))
    }

    /// Merges a built-in preset over the current params and rebuilds.
    pub fn apply_preset(&mut self, name: &str) -> Result<()> {
        let preset = find_preset(name).ok_or_else(|| anyhow::anyhow!("Unknown preset '{}'.", name))?;
        self.params = (preset.overrides)().merge_over(&self.params);
        info!("Applied preset '{}': {}.", preset.name, preset.description);
        self.reinit()
    }

    /// Restores the default params and rebuilds.
    pub fn reset(&mut self) -> Result<()> {
        self.params = SimulationParams::default();
        info!("Reset to default parameters.");
        self.reinit()
    }

    /// Rebuilds the simulation from the current params.
    pub fn reinit(&mut self) -> Result<()> {
        self.simulation.reinit(self.params.seed, &self.params)
    }

    /// Advances the simulation one frame with the live params.
    pub fn tick(&mut self) {
        self.simulation.tick(&self.params);
    }

    /// File name of a still export: `<prefix>-<seed>.png`.
    pub fn export_file_name(&self, prefix: &str) -> String {
        format!("{}-{}.png", prefix, self.params.seed)
    }

    /// Saves the current canvas to `<dir>/<prefix>-<seed>.png`.
    pub fn export_image(&self, dir: &Path, prefix: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
        let path = dir.join(self.export_file_name(prefix));
        self.simulation.canvas().save_png(&path)?;
        info!("Exported {}.", path.display());
        Ok(path)
    }
}
