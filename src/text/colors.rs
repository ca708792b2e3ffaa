// Color replacement across every encoding a platform file may use.
// Each family is matched as a whole token and compared numerically, so a
// token is either rewritten completely or left untouched.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::{Captures, Regex};

use crate::model::color::{short_float, storyboard_float, Color};
use crate::text::files::patch_file;

// `#` runs collapse to one `#` on rewrite — `##1E1464` never becomes `##001833`.
static HEX_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#+([0-9A-Fa-f]{8}|[0-9A-Fa-f]{6})\b").unwrap());
static JAVA_HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(0[xX])([0-9A-Fa-f]{8}|[0-9A-Fa-f]{6})\b").unwrap());
static CSS_RGB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(rgba?)\(\s*(\d{1,3})(\s*,\s*)(\d{1,3})\s*,\s*(\d{1,3})(\s*,\s*[0-9.]+)?\s*\)").unwrap()
});
static SWIFT_UICOLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"UIColor\(\s*red:\s*([0-9]*\.?[0-9]+)\s*,\s*green:\s*([0-9]*\.?[0-9]+)\s*,\s*blue:\s*([0-9]*\.?[0-9]+)\s*,\s*alpha:\s*([0-9]*\.?[0-9]+)\s*\)").unwrap()
});
static OBJC_UICOLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"colorWithRed:\s*([0-9]*\.?[0-9]+)\s+green:\s*([0-9]*\.?[0-9]+)\s+blue:\s*([0-9]*\.?[0-9]+)\s+alpha:\s*([0-9]*\.?[0-9]+)").unwrap()
});
static UNIT_TRIPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"red="([0-9]*\.?[0-9]+)"(\s+)green="([0-9]*\.?[0-9]+)"(\s+)blue="([0-9]*\.?[0-9]+)""#).unwrap()
});

// `setBackgroundColor(-1)`, `Color.valueOf(-1)`, `brandColor = -1`
static ARGB_INT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)((?:\bcolor\.\w+\s*\(|\b\w*colou?r\s*\(|\b\w*colou?r\s*=)\s*)(-?\d{1,10})([.\w]*)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaced {
    pub text: String,
    pub count: usize,
}

/// Rewrite every encoding of `old` in `text` to the same encoding of `new`.
pub fn replace_colors_in_text(text: &str, old: &Color, new: &Color) -> Replaced {
    let mut count = 0;
    if old.same_rgb(new) {
        return Replaced { text: text.to_string(), count };
    }
    let old_digits = old.hex_digits();

    let out = HEX_TOKEN.replace_all(text, |caps: &Captures| {
        match swap_hex_digits(&caps[1], &old_digits, new) {
            Some(digits) => { count += 1; format!("#{}", digits) }
            None => caps[0].to_string(),
        }
    });

    let out = JAVA_HEX.replace_all(&out, |caps: &Captures| {
        match swap_hex_digits(&caps[2], &old_digits, new) {
            Some(digits) => { count += 1; format!("{}{}", &caps[1], digits) }
            None => caps[0].to_string(),
        }
    });

    let out = CSS_RGB.replace_all(&out, |caps: &Captures| {
        let triple = (caps[2].parse::<u16>(), caps[4].parse::<u16>(), caps[5].parse::<u16>());
        let matches = matches!(triple, (Ok(r), Ok(g), Ok(b))
            if (r, g, b) == (u16::from(old.r), u16::from(old.g), u16::from(old.b)));
        if !matches { return caps[0].to_string(); }
        count += 1;
        let sep = &caps[3];
        let alpha = caps.get(6).map(|m| m.as_str()).unwrap_or("");
        format!("{}({}{}{}{}{}{})", &caps[1], new.r, sep, new.g, sep, new.b, alpha)
    });

    let out = replace_argb_int(&out, old, new, &mut count);

    let out = SWIFT_UICOLOR.replace_all(&out, |caps: &Captures| {
        match unit_triple(&caps[1], &caps[2], &caps[3]) {
            Some((r, g, b)) if old.matches_unit(r, g, b) => {
                count += 1;
                let alpha = caps[4].parse::<f64>().unwrap_or(1.0);
                new.swift_literal_with_alpha(alpha)
            }
            _ => caps[0].to_string(),
        }
    });

    let out = OBJC_UICOLOR.replace_all(&out, |caps: &Captures| {
        match unit_triple(&caps[1], &caps[2], &caps[3]) {
            Some((r, g, b)) if old.matches_unit(r, g, b) => {
                count += 1;
                let (nr, ng, nb) = new.to_unit_rgb();
                format!(
                    "colorWithRed:{} green:{} blue:{} alpha:{}",
                    short_float(nr), short_float(ng), short_float(nb), &caps[4]
                )
            }
            _ => caps[0].to_string(),
        }
    });

    let out = UNIT_TRIPLE.replace_all(&out, |caps: &Captures| {
        match unit_triple(&caps[1], &caps[3], &caps[5]) {
            Some((r, g, b)) if old.matches_unit(r, g, b) => {
                count += 1;
                let (nr, ng, nb) = new.to_unit_rgb();
                format!(
                    r#"red="{}"{}green="{}"{}blue="{}""#,
                    storyboard_float(nr), &caps[2], storyboard_float(ng), &caps[4], storyboard_float(nb)
                )
            }
            _ => caps[0].to_string(),
        }
    });

    Replaced { text: out.into_owned(), count }
}

/// Replace colors in a file in place. Returns the number of replacements.
pub fn replace_colors_in_file(path: &Path, old: &Color, new: &Color) -> Result<usize> {
    let mut count = 0;
    patch_file(path, |text| {
        let replaced = replace_colors_in_text(text, old, new);
        count = replaced.count;
        Ok(replaced.text)
    })?;
    Ok(count)
}

/// `digits` is 6 (RRGGBB) or 8 (AARRGGBB) hex digits. Android resources and
/// `0x` literals only ever put alpha first, so an 8-digit token is compared
/// on its last six. Returns the rewritten digits, keeping alpha and case.
fn swap_hex_digits(digits: &str, old: &str, new: &Color) -> Option<String> {
    let lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let new_digits = if lower { new.hex_digits().to_lowercase() } else { new.hex_digits() };
    let swapped = match digits.len() {
        6 if digits.eq_ignore_ascii_case(old) => new_digits,
        8 if digits[2..].eq_ignore_ascii_case(old) => format!("{}{}", &digits[..2], new_digits),
        _ => return None,
    };
    Some(swapped)
}

fn unit_triple(r: &str, g: &str, b: &str) -> Option<(f64, f64, f64)> {
    Some((r.parse().ok()?, g.parse().ok()?, b.parse().ok()?))
}

/// Signed ARGB ints (`-14805916`), only where a color is expected: the
/// argument of a `…Color(` / `Color.…(` call or the value assigned to a
/// `…Color` name. Bare ints elsewhere are left alone.
fn replace_argb_int(text: &str, old: &Color, new: &Color, count: &mut usize) -> String {
    let needle = i64::from(old.to_argb_int());
    let replacement = new.to_argb_int().to_string();
    ARGB_INT.replace_all(text, |caps: &Captures| {
        let is_old = caps[3].is_empty() && caps[2].parse::<i64>().is_ok_and(|v| v == needle);
        if !is_old { return caps[0].to_string(); }
        *count += 1;
        format!("{}{}", &caps[1], replacement)
    })
    .into_owned()
}
