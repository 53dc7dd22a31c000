//! Built-in parameter presets.

use crate::color::HexColor;
use crate::params::SimulationParams;

/// Partial set of parameters. `None` fields keep the current value when merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetOverrides {
    pub seed: Option<u64>,
    pub particle_count: Option<u32>,
    pub flow_intensity: Option<f32>,
    pub noise_scale: Option<f32>,
    pub trail_persistence: Option<f32>,
    pub neighbor_influence: Option<f32>,
    pub time_evolution: Option<f32>,
    pub color_slow: Option<HexColor>,
    pub color_fast: Option<HexColor>,
    pub color_bg: Option<HexColor>,
}

impl PresetOverrides {
    /// Returns `base` with every overridden field replaced.
    pub fn merge_over(&self, base: &SimulationParams) -> SimulationParams {
        SimulationParams {
            seed: self.seed.unwrap_or(base.seed),
            particle_count: self.particle_count.unwrap_or(base.particle_count),
            flow_intensity: self.flow_intensity.unwrap_or(base.flow_intensity),
            noise_scale: self.noise_scale.unwrap_or(base.noise_scale),
            trail_persistence: self.trail_persistence.unwrap_or(base.trail_persistence),
            neighbor_influence: self.neighbor_influence.unwrap_or(base.neighbor_influence),
            time_evolution: self.time_evolution.unwrap_or(base.time_evolution),
            color_slow: self.color_slow.unwrap_or(base.color_slow),
            color_fast: self.color_fast.unwrap_or(base.color_fast),
            color_bg: self.color_bg.unwrap_or(base.color_bg),
        }
    }
}

pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub overrides: fn() -> PresetOverrides,
}

pub static PRESETS: &[Preset] = &[
    Preset {
        name: "Classic Neural",
        description: "Balanced flow with warm-to-cool gradients",
        overrides: || PresetOverrides {
            particle_count: Some(1500),
            flow_intensity: Some(1.5),
            noise_scale: Some(0.006),
            trail_persistence: Some(12.0),
            neighbor_influence: Some(0.3),
            color_slow: Some(HexColor::new(0xd9, 0x77, 0x57)),
            color_fast: Some(HexColor::new(0x4e, 0xcd, 0xc4)),
            color_bg: Some(HexColor::new(0x0d, 0x11, 0x17)),
            ..Default::default()
        },
    },
    Preset {
        name: "Ethereal Dreams",
        description: "Light, flowing particles with long trails",
        overrides: || PresetOverrides {
            particle_count: Some(1200),
            flow_intensity: Some(1.0),
            noise_scale: Some(0.004),
            trail_persistence: Some(25.0),
            neighbor_influence: Some(0.1),
            color_slow: Some(HexColor::new(0xe8, 0xd5, 0xb7)),
            color_fast: Some(HexColor::new(0xa8, 0xd8, 0xea)),
            color_bg: Some(HexColor::new(0x1a, 0x1a, 0x2e)),
            ..Default::default()
        },
    },
    Preset {
        name: "Electric Storm",
        description: "Intense, fast-moving neural activity",
        overrides: || PresetOverrides {
            particle_count: Some(2500),
            flow_intensity: Some(2.5),
            noise_scale: Some(0.010),
            trail_persistence: Some(5.0),
            neighbor_influence: Some(0.5),
            color_slow: Some(HexColor::new(0xff, 0x6b, 0x35)),
            color_fast: Some(HexColor::new(0x00, 0xd9, 0xff)),
            color_bg: Some(HexColor::new(0x0a, 0x0a, 0x0a)),
            ..Default::default()
        },
    },
    Preset {
        name: "Oceanic Flow",
        description: "Calm, blue-green fluid dynamics",
        overrides: || PresetOverrides {
            particle_count: Some(2000),
            flow_intensity: Some(1.2),
            noise_scale: Some(0.005),
            trail_persistence: Some(18.0),
            neighbor_influence: Some(0.4),
            color_slow: Some(HexColor::new(0x2d, 0x6a, 0x4f)),
            color_fast: Some(HexColor::new(0x48, 0xca, 0xe4)),
            color_bg: Some(HexColor::new(0x08, 0x1c, 0x15)),
            ..Default::default()
        },
    },
    Preset {
        name: "Sunset Neural",
        description: "Warm oranges and purples",
        overrides: || PresetOverrides {
            particle_count: Some(1800),
            flow_intensity: Some(1.8),
            noise_scale: Some(0.007),
            trail_persistence: Some(10.0),
            neighbor_influence: Some(0.25),
            color_slow: Some(HexColor::new(0xf7, 0x25, 0x85)),
            color_fast: Some(HexColor::new(0x4c, 0xc9, 0xf0)),
            color_bg: Some(HexColor::new(0x1a, 0x0b, 0x2e)),
            ..Default::default()
        },
    },
];

/// Finds a built-in preset by name, ignoring case and surrounding whitespace.
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    let name = name.trim();
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
