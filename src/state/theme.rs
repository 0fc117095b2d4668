use serde::{Deserialize, Serialize};

use crate::processing::statistics::Stability;
use crate::report::model::Severity;

/// A 24-bit RGB colour, written in config files as `"1a1a2e"` or `"#1a1a2e"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u32);

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return Err(format!("expected 6 hex digits, got '{s}'"));
        }
        u32::from_str_radix(hex, 16)
            .map(Rgb)
            .map_err(|e| format!("invalid colour '{s}': {e}"))
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        format!("{:06x}", c.0)
    }
}

/// Colours used by the workbook renderer. Every field can be overridden from
/// the `palette` block of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub bg_dark: Rgb,
    pub bg_card: Rgb,
    pub bg_header: Rgb,
    pub accent: Rgb,
    pub green: Rgb,
    pub blue: Rgb,
    pub yellow: Rgb,
    pub orange: Rgb,
    pub red: Rgb,
    pub white: Rgb,
    pub dim: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bg_dark: Rgb(0x1a1a2e),
            bg_card: Rgb(0x16213e),
            bg_header: Rgb(0x0f3460),
            accent: Rgb(0x00d4ff),
            green: Rgb(0x00e676),
            blue: Rgb(0x2979ff),
            yellow: Rgb(0xffab00),
            orange: Rgb(0xff6d00),
            red: Rgb(0xff1744),
            white: Rgb(0xffffff),
            dim: Rgb(0x8892a0),
        }
    }
}

impl Palette {
    pub fn stability(&self, stability: Stability) -> Rgb {
        match stability {
            Stability::VeryStable => self.green,
            Stability::Stable => self.blue,
            Stability::Variable => self.yellow,
            Stability::HighlyVariable => self.red,
        }
    }

    pub fn severity(&self, severity: Severity) -> Rgb {
        match severity {
            Severity::Normal => self.green,
            Severity::Warning => self.orange,
            Severity::Critical => self.red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_accepts_leading_hash() {
        assert_eq!(Rgb::try_from("#00d4ff".to_string()), Ok(Rgb(0x00d4ff)));
        assert_eq!(Rgb::try_from("1a1a2e".to_string()), Ok(Rgb(0x1a1a2e)));
        assert!(Rgb::try_from("fff".to_string()).is_err());
        assert!(Rgb::try_from("zzzzzz".to_string()).is_err());
    }

    #[test]
    fn partial_palette_override_keeps_defaults() {
        let p: Palette = serde_json::from_str(r##"{"red": "#aa0000"}"##).unwrap();
        assert_eq!(p.red, Rgb(0xaa0000));
        assert_eq!(p.green, Palette::default().green);
        assert_eq!(String::from(p.red), "aa0000");
    }
}
