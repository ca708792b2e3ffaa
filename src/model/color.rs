// Canonical color value — every textual encoding the hooks read or write
// is parsed into / rendered from this one type.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("empty color value")]
    Empty,
    #[error("'{0}' is not a hex color (expected #RGB, #RRGGBB or #AARRGGBB)")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#AARRGGBB` (Android order). Leading `#`
    /// runs and a `0x` prefix are tolerated.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let s = input.trim();
        if s.is_empty() { return Err(ColorError::Empty); }
        let digits = s.trim_start_matches('#');
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::Invalid(input.to_string()));
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);
        match digits.len() {
            3 => {
                let nib = |i: usize| {
                    let v = u8::from_str_radix(&digits[i..i + 1], 16).unwrap_or(0);
                    v << 4 | v
                };
                Ok(Self::rgb(nib(0), nib(1), nib(2)))
            }
            6 => Ok(Self::rgb(byte(0), byte(2), byte(4))),
            8 => Ok(Self { a: byte(0), r: byte(2), g: byte(4), b: byte(6) }),
            _ => Err(ColorError::Invalid(input.to_string())),
        }
    }

    /// `#RRGGBB`, uppercase, alpha dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// `RRGGBB` without the `#`.
    pub fn hex_digits(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// `#AARRGGBB` as Android resources expect it.
    pub fn to_android_hex(&self) -> String {
        format!("#{:02X}{}", self.a, self.hex_digits())
    }

    pub fn to_rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub fn to_css_rgb(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// Signed 32-bit ARGB, the value `android.graphics.Color` works with.
    pub fn to_argb_int(&self) -> i32 {
        (u32::from(self.a) << 24 | u32::from(self.r) << 16 | u32::from(self.g) << 8 | u32::from(self.b)) as i32
    }

    pub fn from_argb_int(value: i32) -> Self {
        let v = value as u32;
        Self {
            a: (v >> 24) as u8,
            r: (v >> 16) as u8,
            g: (v >> 8) as u8,
            b: v as u8,
        }
    }

    /// `0xAARRGGBB` Java int literal.
    pub fn to_java_literal(&self) -> String {
        format!("0x{:02X}{}", self.a, self.hex_digits())
    }

    /// Components normalized to 0.0–1.0 for UIKit / storyboards.
    pub fn to_unit_rgb(&self) -> (f64, f64, f64) {
        (unit(self.r), unit(self.g), unit(self.b))
    }

    pub fn unit_alpha(&self) -> f64 {
        unit(self.a)
    }

    pub fn to_swift_literal(&self) -> String {
        self.swift_literal_with_alpha(self.unit_alpha())
    }

    pub fn swift_literal_with_alpha(&self, alpha: f64) -> String {
        let (r, g, b) = self.to_unit_rgb();
        format!(
            "UIColor(red: {}, green: {}, blue: {}, alpha: {})",
            short_float(r), short_float(g), short_float(b), short_float(alpha)
        )
    }

    pub fn to_objc_literal(&self) -> String {
        let (r, g, b) = self.to_unit_rgb();
        format!(
            "[UIColor colorWithRed:{} green:{} blue:{} alpha:{}]",
            short_float(r), short_float(g), short_float(b), short_float(self.unit_alpha())
        )
    }

    /// True when the 0–1 components round to this color's bytes.
    pub fn matches_unit(&self, r: f64, g: f64, b: f64) -> bool {
        let (sr, sg, sb) = self.to_unit_rgb();
        let tol = 0.5 / 255.0 + 1e-9;
        (sr - r).abs() <= tol && (sg - g).abs() <= tol && (sb - b).abs() <= tol
    }

    /// Same RGB, ignoring alpha.
    pub fn same_rgb(&self, other: &Color) -> bool {
        self.to_rgb() == other.to_rgb()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn unit(v: u8) -> f64 {
    f64::from(v) / 255.0
}

/// Three decimals, trailing zeros trimmed but always one decimal kept.
pub fn short_float(v: f64) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0');
    if s.ends_with('.') { format!("{}0", s) } else { s.to_string() }
}

/// Full-precision component as Xcode writes it into storyboards.
pub fn storyboard_float(v: f64) -> String {
    if v == 0.0 || v == 1.0 { format!("{}", v as u8) } else { format!("{}", v) }
}

// ── Free-function conversions ─────────────────────────────────────────────────

/// `#rgb`, `RRGGBB`, `##RRGGBB` … → `#RRGGBB`. Idempotent.
pub fn normalize_hex_color(input: &str) -> Option<String> {
    Color::parse(input).ok().map(|c| c.to_hex())
}

pub fn hex_to_rgb(input: &str) -> Option<(u8, u8, u8)> {
    Color::parse(input).ok().map(|c| c.to_rgb())
}

pub fn hex_to_argb(input: &str) -> Option<i32> {
    Color::parse(input).ok().map(|c| c.to_argb_int())
}

// ── Variations ────────────────────────────────────────────────────────────────

/// Every encoding of one color that may appear in a platform source file.
#[derive(Debug, Clone)]
pub struct ColorVariations {
    pub hex: String,
    pub hex_lower: String,
    pub bare: String,
    pub android_hex: String,
    pub css_rgb: String,
    pub argb_int: i32,
    pub java_literal: String,
    pub unit_rgb: (f64, f64, f64),
    pub swift: String,
    pub objc: String,
}

impl ColorVariations {
    pub fn of(color: &Color) -> Self {
        let hex = color.to_hex();
        Self {
            hex_lower: hex.to_lowercase(),
            bare: color.hex_digits(),
            android_hex: color.to_android_hex(),
            css_rgb: color.to_css_rgb(),
            argb_int: color.to_argb_int(),
            java_literal: color.to_java_literal(),
            unit_rgb: color.to_unit_rgb(),
            swift: color.to_swift_literal(),
            objc: color.to_objc_literal(),
            hex,
        }
    }

    /// (label, rendering) pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let (r, g, b) = self.unit_rgb;
        vec![
            ("hex", self.hex.clone()),
            ("hex (lower)", self.hex_lower.clone()),
            ("bare", self.bare.clone()),
            ("android", self.android_hex.clone()),
            ("css", self.css_rgb.clone()),
            ("argb int", self.argb_int.to_string()),
            ("java", self.java_literal.clone()),
            ("unit", format!("{} {} {}", storyboard_float(r), storyboard_float(g), storyboard_float(b))),
            ("swift", self.swift.clone()),
            ("objc", self.objc.clone()),
        ]
    }
}
