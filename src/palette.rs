use crate::error::{SceneError, SceneResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const TEAL: &str = "#21808D";
pub const CREAM: &str = "#FCFCF9";
pub const CHARCOAL: &str = "#1F2121";
pub const ORANGE: &str = "#A84B2F";

/// Color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "default_alpha")]
    pub a: u8,
}

fn default_alpha() -> u8 {
    255
}

fn hex_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^#([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})?$")
            .expect("static hex color pattern")
    })
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`
    pub fn from_hex(value: &str) -> SceneResult<Self> {
        let invalid = || SceneError::InvalidColor {
            value: value.to_string(),
        };
        let caps = hex_pattern().captures(value.trim()).ok_or_else(invalid)?;
        let channel = |idx: usize| -> SceneResult<u8> {
            match caps.get(idx) {
                Some(m) => u8::from_str_radix(m.as_str(), 16).map_err(|_| invalid()),
                None => Ok(255),
            }
        };

        Ok(Self {
            r: channel(1)?,
            g: channel(2)?,
            b: channel(3)?,
            a: channel(4)?,
        })
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// RGBA bytes with alpha scaled by `opacity`
    pub fn with_opacity(&self, opacity: f32) -> [u8; 4] {
        let alpha = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        [self.r, self.g, self.b, alpha]
    }

    pub fn rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// The fixed colors of the financial scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub teal: Color,
    pub cream: Color,
    pub charcoal: Color,
    pub orange: Color,
}

impl Palette {
    pub fn load() -> SceneResult<Self> {
        Ok(Self {
            teal: Color::from_hex(TEAL)?,
            cream: Color::from_hex(CREAM)?,
            charcoal: Color::from_hex(CHARCOAL)?,
            orange: Color::from_hex(ORANGE)?,
        })
    }
}
