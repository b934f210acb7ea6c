use std::fmt;

use serde::{Serialize, Serializer};

/// An RGB color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub [f64; 3]);

impl Rgb {
    /// Opaque default for unannotated objects
    pub const WHITE: Rgb = Rgb([1.0, 1.0, 1.0]);

    /// Drop the alpha channel of an RGBA quadruple
    pub fn from_rgba(rgba: [f64; 4]) -> Self {
        Rgb([rgba[0], rgba[1], rgba[2]])
    }

    /// `#RRGGBB`, each component truncated from `component * 255`
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.0.map(channel_byte);
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }
}

fn channel_byte(component: f64) -> u8 {
    // `as` saturates, so out-of-range and NaN components clamp
    (component * 255.0) as u8
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
