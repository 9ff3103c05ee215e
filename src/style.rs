use std::fmt;
use std::str::FromStr;

use crate::error::SubtitleError;

/// Color returned when a color directive cannot be decoded.
pub const FALLBACK_COLOR: &str = "ff000000";

/// A color in its canonical form: 8 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Color(String);

impl Color {
    pub fn fallback() -> Self {
        Color(FALLBACK_COLOR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Inverse of the `&HAABBGGRR` decoding.
    pub fn to_ass_hex(&self) -> String {
        let c = &self.0;
        format!("&H{}{}{}{}", &c[6..8], &c[4..6], &c[2..4], &c[0..2]).to_ascii_uppercase()
    }

    /// Inverse of the decimal-coded `BBGGRR` decoding. Alpha is dropped.
    pub fn to_ssa_decimal(&self) -> String {
        let c = &self.0;
        let bgr = format!("{}{}{}", &c[4..6], &c[2..4], &c[0..2]);
        // Always valid: the canonical form only holds hex digits.
        u32::from_str_radix(&bgr, 16).unwrap_or(0).to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The source encodings a color directive may come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    /// W3C keyword such as `black` or `teal`.
    Name,
    /// `&HBBGGRR`, used by SSA.
    HexBgr,
    /// `&HAABBGGRR`, used by ASS.
    HexAbgr,
    /// Decimal number holding `BBGGRR`, used by SSA.
    DecimalBgr,
    /// Decimal number holding `AABBGGRR`, used by ASS.
    DecimalAbgr,
}

impl FromStr for ColorFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(ColorFormat::Name),
            "&hbbggrr" => Ok(ColorFormat::HexBgr),
            "&haabbggrr" => Ok(ColorFormat::HexAbgr),
            "decimalcodedbbggrr" => Ok(ColorFormat::DecimalBgr),
            "decimalcodedaabbggrr" => Ok(ColorFormat::DecimalAbgr),
            _ => Err(SubtitleError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Outcome of decoding a color directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParse {
    Parsed(Color),
    /// The directive was malformed; the value is [`FALLBACK_COLOR`].
    Fallback(Color),
    /// A color keyword that is not in the table.
    Unrecognized,
}

impl ColorParse {
    /// The decoded color, or the fallback color. `None` only for unknown keywords.
    pub fn color(self) -> Option<Color> {
        match self {
            ColorParse::Parsed(c) | ColorParse::Fallback(c) => Some(c),
            ColorParse::Unrecognized => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ColorParse::Fallback(_))
    }
}

const NAMED_COLORS: &[(&str, &str)] = &[
    ("transparent", "00000000"),
    ("black", "ff000000"),
    ("silver", "ffc0c0c0"),
    ("gray", "ff808080"),
    ("white", "ffffffff"),
    ("maroon", "ff800000"),
    ("red", "ffff0000"),
    ("purple", "ff800080"),
    ("fuchsia", "ffff00ff"),
    ("magenta", "ffff00ff"),
    ("green", "ff008000"),
    ("lime", "ff00ff00"),
    ("olive", "ff808000"),
    ("yellow", "ffffff00"),
    ("navy", "ff000080"),
    ("blue", "ff0000ff"),
    ("teal", "ff008080"),
    ("aqua", "ff00ffff"),
    ("cyan", "ff00ffff"),
];

/// Decode `value`, given in `format`, into the canonical color form.
pub fn normalize_color(format: ColorFormat, value: &str) -> ColorParse {
    if format == ColorFormat::Name {
        let value = value.trim();
        return NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == value)
            .map_or(ColorParse::Unrecognized, |(_, hex)| {
                ColorParse::Parsed(Color(hex.to_string()))
            });
    }
    match decode_numeric(format, value.trim()) {
        Some(hex) => ColorParse::Parsed(Color(hex)),
        None => ColorParse::Fallback(Color::fallback()),
    }
}

fn decode_numeric(format: ColorFormat, value: &str) -> Option<String> {
    match format {
        ColorFormat::HexBgr => {
            let c = padded_hex(value, 6)?;
            Some(format!("{}{}{}ff", &c[4..6], &c[2..4], &c[0..2]))
        }
        ColorFormat::HexAbgr => {
            let c = padded_hex(value, 8)?;
            Some(format!("{}{}{}{}", &c[6..8], &c[4..6], &c[2..4], &c[0..2]))
        }
        ColorFormat::DecimalBgr => {
            let n = value.parse::<i64>().ok()? as u64 & 0x00ff_ffff;
            let c = format!("{:06x}", n);
            Some(format!("{}{}{}ff", &c[4..6], &c[2..4], &c[0..2]))
        }
        ColorFormat::DecimalAbgr => {
            let n = value.parse::<i64>().ok()? as u64 & 0xffff_ffff;
            let c = format!("{:08x}", n);
            Some(format!("{}{}{}{}", &c[6..8], &c[4..6], &c[2..4], &c[0..2]))
        }
        ColorFormat::Name => None,
    }
}

/// Strips the `&H` marker and pads short values by repeating their last digit,
/// so `&H0` and `&HF` (as written by ffmpeg) become full-width colors.
fn padded_hex(value: &str, width: usize) -> Option<String> {
    let digits = value.trim_end_matches('&');
    let digits = if digits
        .get(..2)
        .map_or(false, |marker| marker.eq_ignore_ascii_case("&h"))
    {
        &digits[2..]
    } else {
        digits
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let mut digits = digits.to_ascii_lowercase();
    while digits.len() < width {
        let last = digits.chars().last()?;
        digits.push(last);
    }
    Some(digits[digits.len() - width..].to_string())
}

/// Hands out `default0`, `default1`, ... for styles that have no name.
///
/// Each parse owns one generator, so identifiers are unique within the
/// aggregate and deterministic from run to run.
#[derive(Debug, Clone, Default)]
pub struct StyleIdGenerator {
    next: u32,
}

impl StyleIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_id(&mut self) -> String {
        let id = format!("default{}", self.next);
        self.next += 1;
        id
    }
}

/// Named presentation attributes shared by captions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub id: String,
    pub font: String,
    pub font_size: String,
    pub color: Option<Color>,
    pub background_color: Option<Color>,
    pub text_align: String,
    pub italic: bool,
    pub bold: bool,
    pub underline: bool,
}

impl Style {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Style {
            id: id.into(),
            font: String::new(),
            font_size: String::new(),
            color: None,
            background_color: None,
            text_align: String::new(),
            italic: false,
            bold: false,
            underline: false,
        }
    }

    /// Copy of `base` under a different identifier.
    pub fn fork<S: Into<String>>(id: S, base: &Style) -> Self {
        Style {
            id: id.into(),
            ..base.clone()
        }
    }
}
