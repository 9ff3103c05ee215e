//! Subtitle format codecs.
//!
//! Every codec turns raw text lines into a [`TimedTextObject`] and writes one
//! back out as lines. Parsing is best effort: records that cannot be read are
//! skipped and reported through [`TimedTextObject::warnings`].

mod ass;
mod srt;
mod vtt;

pub use ass::AssFormat;
pub use srt::SrtFormat;
pub use vtt::VttFormat;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::caption::Caption;
use crate::error::{Result, SubtitleError};
use crate::task::CancelHandle;
use crate::time::{Time, TimeFormat};
use crate::timed_text::TimedTextObject;

static ASS_OVERRIDE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\\[^}]*\}").expect("valid override block pattern"));

static HTML_TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[A-Za-z][^<>]*>").expect("valid markup tag pattern"));

/// Parse/write contract implemented by each codec.
pub trait SubtitleFormat {
    /// Parses `lines`, checking `cancel` after every record.
    ///
    /// Returns [`SubtitleError::Cancelled`] if the handle was triggered; the
    /// partially built object is dropped.
    fn parse_cancellable(
        &self,
        file_name: &str,
        lines: &[&str],
        cancel: &CancelHandle,
    ) -> Result<TimedTextObject>;

    fn parse(&self, file_name: &str, lines: &[&str]) -> TimedTextObject {
        // A fresh handle is never cancelled.
        self.parse_cancellable(file_name, lines, &CancelHandle::new())
            .unwrap_or_else(|_| TimedTextObject::new(file_name))
    }

    fn to_file(&self, tto: &TimedTextObject) -> Vec<String>;
}

/// Which flavour of the ASS family is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssDialect {
    /// Advanced SubStation Alpha, `v4.00+`.
    #[default]
    Ass,
    /// Legacy SubStation Alpha, `v4.00`.
    Ssa,
}

impl FromStr for AssDialect {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ass" => Ok(AssDialect::Ass),
            "ssa" => Ok(AssDialect::Ssa),
            _ => Err(SubtitleError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// The supported formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Srt,
    /// ASS and SSA share one codec.
    Ass,
    Vtt,
}

impl Format {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "srt" => Some(Format::Srt),
            "ass" | "ssa" => Some(Format::Ass),
            "vtt" => Some(Format::Vtt),
            _ => None,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Srt => "srt",
            Format::Ass => "ass",
            Format::Vtt => "vtt",
        }
    }

    pub fn parse(self, file_name: &str, lines: &[&str]) -> TimedTextObject {
        match self {
            Format::Srt => SrtFormat.parse(file_name, lines),
            Format::Ass => AssFormat.parse(file_name, lines),
            Format::Vtt => VttFormat.parse(file_name, lines),
        }
    }

    pub fn parse_cancellable(
        self,
        file_name: &str,
        lines: &[&str],
        cancel: &CancelHandle,
    ) -> Result<TimedTextObject> {
        match self {
            Format::Srt => SrtFormat.parse_cancellable(file_name, lines, cancel),
            Format::Ass => AssFormat.parse_cancellable(file_name, lines, cancel),
            Format::Vtt => VttFormat.parse_cancellable(file_name, lines, cancel),
        }
    }

    pub fn to_file(self, tto: &TimedTextObject) -> Vec<String> {
        match self {
            Format::Srt => SrtFormat.to_file(tto),
            Format::Ass => AssFormat.to_file(tto),
            Format::Vtt => VttFormat.to_file(tto),
        }
    }
}

impl FromStr for Format {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self> {
        Format::from_extension(s).ok_or_else(|| SubtitleError::UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Formats `time` for output: shifted by the object's offset, clamped at zero.
pub(crate) fn timecode(tto: &TimedTextObject, time: Time, format: TimeFormat) -> String {
    tto.shifted(time).max(Time::ZERO).format(format)
}

/// Caption lines as SRT and VTT write them. Override blocks are dropped
/// only from captions read out of ASS/SSA; blank lines would end the block.
pub(crate) fn cue_lines(tto: &TimedTextObject, caption: &Caption) -> Vec<String> {
    let from_ass = tto.source_format == Some(Format::Ass);
    caption
        .lines()
        .map(|line| {
            if from_ass {
                strip_ass_overrides(line)
            } else {
                line.to_string()
            }
        })
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Removes ASS override blocks such as `{\i1}` or `{\an8}`.
pub(crate) fn strip_ass_overrides(text: &str) -> String {
    ASS_OVERRIDE_REGEX.replace_all(text, "").into_owned()
}

/// Removes HTML-like tags such as `<i>` or `<font color="red">`.
pub(crate) fn strip_html_tags(text: &str) -> String {
    HTML_TAG_REGEX.replace_all(text, "").into_owned()
}
