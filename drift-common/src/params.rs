use crate::color::HexColor;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Tunable configuration of the flow simulation. Read once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Seed for particle placement and the noise field. Always positive.
    pub seed: u64,
    pub particle_count: u32,
    /// Strength of the noise steering force.
    pub flow_intensity: f32,
    /// Spatial frequency of the noise field (smaller = larger swirls).
    pub noise_scale: f32,
    /// Higher values fade old frames more slowly, leaving longer trails.
    pub trail_persistence: f32,
    /// Weight of neighbour velocity alignment. 0 disables the neighbour query.
    pub neighbor_influence: f32,
    /// Noise time offset added per tick.
    pub time_evolution: f32,
    pub color_slow: HexColor,
    pub color_fast: HexColor,
    pub color_bg: HexColor,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            seed: 12345,
            particle_count: 1500,
            flow_intensity: 1.5,
            noise_scale: 0.006,
            trail_persistence: 12.0,
            neighbor_influence: 0.3,
            time_evolution: 0.0005,
            color_slow: HexColor::new(0xd9, 0x77, 0x57),
            color_fast: HexColor::new(0x4e, 0xcd, 0xc4),
            color_bg: HexColor::new(0x0d, 0x11, 0x17),
        }
    }
}

impl SimulationParams {
    /// Checks the invariants the simulation relies on.
    pub fn validate(&self) -> Result<()> {
        if self.seed == 0 {
            anyhow::bail!("seed must be a positive integer.");
        }
        if self.particle_count == 0 {
            anyhow::bail!("particle_count must be greater than 0.");
        }
        if !(self.noise_scale > 0.0) {
            anyhow::bail!("noise_scale must be positive (got {}).", self.noise_scale);
        }
        Ok(())
    }

    /// Current value of a single parameter.
    pub fn get(&self, key: ParamKey) -> ParamValue {
        match key {
            ParamKey::Seed => ParamValue::Int(self.seed as i64),
            ParamKey::ParticleCount => ParamValue::Int(self.particle_count as i64),
            ParamKey::FlowIntensity => ParamValue::Float(self.flow_intensity),
            ParamKey::NoiseScale => ParamValue::Float(self.noise_scale),
            ParamKey::TrailPersistence => ParamValue::Float(self.trail_persistence),
            ParamKey::NeighborInfluence => ParamValue::Float(self.neighbor_influence),
            ParamKey::TimeEvolution => ParamValue::Float(self.time_evolution),
            ParamKey::ColorSlow => ParamValue::Color(self.color_slow),
            ParamKey::ColorFast => ParamValue::Color(self.color_fast),
            ParamKey::ColorBg => ParamValue::Color(self.color_bg),
        }
    }

    /// Writes a single parameter, clamping numbers to the widget range.
    /// Returns `false` (and leaves the params untouched) when the value is
    /// rejected: a non-positive seed, or a value of the wrong kind.
    pub fn set(&mut self, key: ParamKey, value: ParamValue) -> bool {
        match (key, value) {
            (ParamKey::Seed, ParamValue::Int(v)) if v > 0 => self.seed = v as u64,
            (ParamKey::Seed, ParamValue::Float(v)) if v >= 1.0 && v.is_finite() => {
                self.seed = (v as u64).min(i64::MAX as u64)
            }
            (ParamKey::Seed, _) => return false,
            (ParamKey::ParticleCount, value) => match value.as_f32() {
                Some(v) => self.particle_count = key.clamp(v).round() as u32,
                None => return false,
            },
            (ParamKey::ColorSlow, ParamValue::Color(c)) => self.color_slow = c,
            (ParamKey::ColorFast, ParamValue::Color(c)) => self.color_fast = c,
            (ParamKey::ColorBg, ParamValue::Color(c)) => self.color_bg = c,
            (ParamKey::ColorSlow | ParamKey::ColorFast | ParamKey::ColorBg, _) => return false,
            (key, value) => {
                let Some(v) = value.as_f32() else { return false };
                let v = key.clamp(v);
                match key {
                    ParamKey::FlowIntensity => self.flow_intensity = v,
                    ParamKey::NoiseScale => self.noise_scale = v,
                    ParamKey::TrailPersistence => self.trail_persistence = v,
                    ParamKey::NeighborInfluence => self.neighbor_influence = v,
                    ParamKey::TimeEvolution => self.time_evolution = v,
                    _ => return false,
                }
            }
        }
        true
    }
}

/// Names of the individually editable parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Seed,
    ParticleCount,
    FlowIntensity,
    NoiseScale,
    TrailPersistence,
    NeighborInfluence,
    TimeEvolution,
    ColorSlow,
    ColorFast,
    ColorBg,
}

impl ParamKey {
    pub const ALL: [ParamKey; 10] = [
        ParamKey::Seed,
        ParamKey::ParticleCount,
        ParamKey::FlowIntensity,
        ParamKey::NoiseScale,
        ParamKey::TrailPersistence,
        ParamKey::NeighborInfluence,
        ParamKey::TimeEvolution,
        ParamKey::ColorSlow,
        ParamKey::ColorFast,
        ParamKey::ColorBg,
    ];

    /// The snake_case name used in config files.
    pub fn name(&self) -> &'static str {
        match self {
            ParamKey::Seed => "seed",
            ParamKey::ParticleCount => "particle_count",
            ParamKey::FlowIntensity => "flow_intensity",
            ParamKey::NoiseScale => "noise_scale",
            ParamKey::TrailPersistence => "trail_persistence",
            ParamKey::NeighborInfluence => "neighbor_influence",
            ParamKey::TimeEvolution => "time_evolution",
            ParamKey::ColorSlow => "color_slow",
            ParamKey::ColorFast => "color_fast",
            ParamKey::ColorBg => "color_bg",
        }
    }

    /// Slider range of a numeric parameter. `None` for seed and colors.
    pub fn range(&self) -> Option<RangeInclusive<f32>> {
        match self {
            ParamKey::ParticleCount => Some(500.0..=8000.0),
            ParamKey::FlowIntensity => Some(0.5..=3.0),
            ParamKey::NoiseScale => Some(0.002..=0.015),
            ParamKey::TrailPersistence => Some(1.0..=30.0),
            ParamKey::NeighborInfluence => Some(0.0..=1.0),
            ParamKey::TimeEvolution => Some(0.0001..=0.002),
            _ => None,
        }
    }

    pub fn is_color(&self) -> bool {
        matches!(self, ParamKey::ColorSlow | ParamKey::ColorFast | ParamKey::ColorBg)
    }

    fn clamp(&self, value: f32) -> f32 {
        match self.range() {
            Some(range) => value.clamp(*range.start(), *range.end()),
            None => value,
        }
    }
}

impl FromStr for ParamKey {
    type Err = anyhow::Error;

    /// Accepts both `snake_case` and the `camelCase` widget names.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        ParamKey::ALL
            .into_iter()
            .find(|key| key.name().replace('_', "") == normalized)
            .ok_or_else(|| anyhow::anyhow!("Unknown parameter '{}'.", s))
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value written to one parameter.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f32),
    Color(HexColor),
}

impl ParamValue {
    fn as_f32(&self) -> Option<f32> {
        match self {
            ParamValue::Int(v) => Some(*v as f32),
            ParamValue::Float(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Parses widget text for `key`. Returns `None` for input the widget
    /// would not accept.
    pub fn parse_for(key: ParamKey, raw: &str) -> Option<ParamValue> {
        let raw = raw.trim();
        if key.is_color() {
            return raw.parse().ok().map(ParamValue::Color);
        }
        if let Ok(v) = raw.parse::<i64>() {
            return Some(ParamValue::Int(v));
        }
        raw.parse::<f32>().ok().filter(|v| v.is_finite()).map(ParamValue::Float)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Color(c) => write!(f, "{}", c),
        }
    }
}

/// Which parameter changes discard the simulation and rebuild it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReinitPolicy {
    table: HashMap<ParamKey, bool>,
}

impl ReinitPolicy {
    pub fn new(table: HashMap<ParamKey, bool>) -> Self {
        ReinitPolicy { table }
    }

    pub fn requires_reinit(&self, key: ParamKey) -> bool {
        self.table.get(&key).copied().unwrap_or(false)
    }
}

impl Default for ReinitPolicy {
    /// Seed, particle count and background color rebuild the scene.
    fn default() -> Self {
        let table = ParamKey::ALL
            .into_iter()
            .map(|key| {
                let reinit = matches!(key, ParamKey::Seed | ParamKey::ParticleCount | ParamKey::ColorBg);
                (key, reinit)
            })
            .collect();
        ReinitPolicy { table }
    }
}
