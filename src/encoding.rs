//! Turning raw subtitle bytes into text.

use log::debug;

use crate::error::{Result, SubtitleError};

/// Encodings that can be selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Latin1,
    Windows1252,
}

impl Encoding {
    /// Looks up a manual encoding name, ignoring case.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "utf-16le" | "utf16le" => Ok(Encoding::Utf16Le),
            "utf-16be" | "utf16be" => Ok(Encoding::Utf16Be),
            "iso-8859-1" | "latin1" => Ok(Encoding::Latin1),
            "windows-1252" | "cp1252" => Ok(Encoding::Windows1252),
            _ => Err(SubtitleError::Encoding(name.to_string())),
        }
    }

    fn sniff(bytes: &[u8]) -> Option<(Self, usize)> {
        match bytes {
            [0xEF, 0xBB, 0xBF, ..] => Some((Encoding::Utf8, 3)),
            [0xFF, 0xFE, ..] => Some((Encoding::Utf16Le, 2)),
            [0xFE, 0xFF, ..] => Some((Encoding::Utf16Be, 2)),
            _ => None,
        }
    }

    fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Utf16Le => utf16(bytes, u16::from_le_bytes),
            Encoding::Utf16Be => utf16(bytes, u16::from_be_bytes),
            Encoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Encoding::Windows1252 => bytes.iter().map(|&b| windows_1252(b)).collect(),
        }
    }
}

/// Decodes `bytes` with the manual encoding if one is given, else by byte
/// order mark, else as UTF-8 when valid and Windows-1252 otherwise.
pub fn decode(bytes: &[u8], language: Option<&str>, manual: Option<&str>) -> Result<String> {
    let manual = manual.filter(|name| !name.trim().is_empty());
    if let Some(name) = manual {
        let encoding = Encoding::from_name(name)?;
        let skip = match Encoding::sniff(bytes) {
            Some((sniffed, len)) if sniffed == encoding => len,
            _ => 0,
        };
        return Ok(encoding.decode(&bytes[skip..]));
    }

    if let Some((encoding, len)) = Encoding::sniff(bytes) {
        debug!("Byte order mark selects {:?}", encoding);
        return Ok(encoding.decode(&bytes[len..]));
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(_) => {
            debug!(
                "Input is not UTF-8, reading it as Windows-1252 (language hint: {})",
                language.unwrap_or("none")
            );
            Ok(Encoding::Windows1252.decode(bytes))
        }
    }
}

/// Splits decoded text into lines without their `\r` and the leading BOM.
pub fn split_lines(text: &str) -> Vec<&str> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

fn utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// The 0x80..=0x9F block is where Windows-1252 departs from Latin-1.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

fn windows_1252(byte: u8) -> char {
    match byte {
        0x80..=0x9F => WINDOWS_1252_HIGH[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_passes_through() {
        assert_eq!(decode("héllo".as_bytes(), None, None).unwrap(), "héllo");
    }

    #[test]
    fn bom_selects_decoder() {
        assert_eq!(decode(b"\xEF\xBB\xBFabc", None, None).unwrap(), "abc");
        assert_eq!(decode(b"\xFF\xFEa\x00b\x00", None, None).unwrap(), "ab");
        assert_eq!(decode(b"\xFE\xFF\x00a\x00b", None, None).unwrap(), "ab");
    }

    #[test]
    fn invalid_utf8_falls_back_to_windows_1252() {
        assert_eq!(decode(b"caf\xE9 \x80", Some("fr"), None).unwrap(), "café €");
    }

    #[test]
    fn manual_encoding_wins() {
        assert_eq!(decode(b"\xE9", None, Some("LATIN1")).unwrap(), "é");
        assert_eq!(decode(b"\x93hi\x94", None, Some("cp1252")).unwrap(), "\u{201C}hi\u{201D}");
        assert_eq!(decode(b"\xFF\xFEa\x00", None, Some("utf-16le")).unwrap(), "a");
        assert_eq!(decode(b"abc", None, Some("  ")).unwrap(), "abc");
        assert!(matches!(
            decode(b"abc", None, Some("klingon")),
            Err(SubtitleError::Encoding(_))
        ));
    }

    #[test]
    fn lines_are_split_and_trimmed() {
        assert_eq!(split_lines("\u{FEFF}a\r\nb\n\r\nc"), vec!["a", "b", "", "c"]);
        assert_eq!(split_lines(""), vec![""]);
    }
}
