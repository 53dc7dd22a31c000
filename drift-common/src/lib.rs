pub mod color;
pub mod config;
pub mod params;
pub mod presets;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use color::HexColor;
pub use config::{CanvasConfig, OutputConfig, SessionConfig, StudioConfig};
pub use params::{ParamKey, ParamValue, ReinitPolicy, SimulationParams};
pub use presets::{find_preset, Preset, PresetOverrides, PRESETS};
pub use snapshot::FrameStats;
pub use vecmath::{angle_to_vec, map_range, Vec2};
