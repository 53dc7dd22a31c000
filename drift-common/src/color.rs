use anyhow::{Context, Result};
use palette::{Mix, Srgb};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque sRGB color, written as `#RRGGBB` in configs and widget input.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        HexColor { r, g, b }
    }

    pub fn to_srgb(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    pub fn from_srgb(color: Srgb<u8>) -> Self {
        HexColor::new(color.red, color.green, color.blue)
    }

    /// Linear interpolation in RGB space. `t` is clamped to [0, 1];
    /// `t = 0` yields `self` and `t = 1` yields `other` exactly.
    pub fn lerp(self, other: HexColor, t: f32) -> HexColor {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return self;
        }
        if t >= 1.0 {
            return other;
        }
        let from: Srgb<f32> = self.to_srgb().into_format();
        let to: Srgb<f32> = other.to_srgb().into_format();
        HexColor::from_srgb(from.mix(to, t).into_format())
    }
}

impl FromStr for HexColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            anyhow::bail!("Color '{}' is not of the form #RRGGBB.", s);
        }
        let rgb = Srgb::<u8>::from_str(digits)
            .map_err(|e| anyhow::anyhow!("{:?}", e))
            .with_context(|| format!("Color '{}' is not valid hex.", s))?;
        Ok(HexColor::from_srgb(rgb))
    }
}

impl TryFrom<String> for HexColor {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_hash() {
        let a: HexColor = "#d97757".parse().unwrap();
        let b: HexColor = "D97757".parse().unwrap();
        assert_eq!(a, HexColor::new(0xd9, 0x77, 0x57));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "#d97757");
    }

    #[test]
    fn rejects_short_or_garbage() {
        assert!("#fff".parse::<HexColor>().is_err());
        assert!("#zzzzzz".parse::<HexColor>().is_err());
        assert!("".parse::<HexColor>().is_err());
    }

    #[test]
    fn rejects_non_ascii_and_signed_digits() {
        assert!("#aébcd".parse::<HexColor>().is_err());
        assert!("#+1+2+3".parse::<HexColor>().is_err());
        assert!(HexColor::try_from("ééé".to_string()).is_err());
    }

    #[test]
    fn lerp_endpoints_are_exact() {
        let slow = HexColor::new(0xd9, 0x77, 0x57);
        let fast = HexColor::new(0x4e, 0xcd, 0xc4);
        assert_eq!(slow.lerp(fast, 0.0), slow);
        assert_eq!(slow.lerp(fast, 1.0), fast);
        assert_eq!(slow.lerp(fast, -3.0), slow);
        assert_eq!(slow.lerp(fast, 7.0), fast);
    }

    #[test]
    fn lerp_midpoint() {
        let black = HexColor::new(0, 0, 0);
        let white = HexColor::new(200, 100, 50);
        assert_eq!(black.lerp(white, 0.5), HexColor::new(100, 50, 25));
    }
}
