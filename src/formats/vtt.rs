use super::srt::blocks;
use super::{cue_lines, timecode, Format, SubtitleFormat};

use crate::caption::Caption;
use crate::error::Result;
use crate::parser::cue_timing;
use crate::task::CancelHandle;
use crate::time::TimeFormat;
use crate::timed_text::TimedTextObject;

const HEADER: &str = "WEBVTT";

/// Blocks that carry no cue and are skipped silently.
const NON_CUE_BLOCKS: &[&str] = &["NOTE", "STYLE", "REGION"];

/// WebVTT: a `WEBVTT` header, then cues with optional identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct VttFormat;

impl SubtitleFormat for VttFormat {
    fn parse_cancellable(
        &self,
        file_name: &str,
        lines: &[&str],
        cancel: &CancelHandle,
    ) -> Result<TimedTextObject> {
        let mut tto = TimedTextObject::new(file_name);
        let mut blocks = blocks(lines).into_iter();
        let mut first_cue = None;

        match blocks.next() {
            Some((first_line, header)) if header[0].starts_with(HEADER) => {
                let title = header[0][HEADER.len()..].trim_start_matches([' ', '\t', '-']);
                tto.title = title.trim().to_string();
                // A cue glued to the header without a blank line.
                if let Some(at) = timing_position(&header) {
                    parse_cue(&mut tto, first_line + at, &header[at..]);
                }
            }
            Some(block) => {
                tto.warn(format!("Missing {} header at line {}", HEADER, block.0));
                first_cue = Some(block);
            }
            None => {}
        }

        for (first_line, block) in first_cue.into_iter().chain(blocks) {
            if NON_CUE_BLOCKS.iter().any(|kind| block[0].starts_with(kind)) {
                continue;
            }
            match timing_position(&block) {
                Some(at) if at <= 1 => parse_cue(&mut tto, first_line + at, &block[at..]),
                _ => tto.warn(format!(
                    "Unrecognised block at line {} skipped: '{}'",
                    first_line, block[0]
                )),
            }
            cancel.check()?;
        }

        tto.source_format = Some(Format::Vtt);
        tto.finish();
        Ok(tto)
    }

    fn to_file(&self, tto: &TimedTextObject) -> Vec<String> {
        let mut file = Vec::with_capacity(tto.captions.len() * 4 + 2);
        if tto.title.is_empty() {
            file.push(HEADER.to_string());
        } else {
            file.push(format!("{} - {}", HEADER, tto.title));
        }
        file.push(String::new());

        for (index, caption) in tto.captions.values().enumerate() {
            file.push((index + 1).to_string());
            file.push(format!(
                "{} --> {}",
                timecode(tto, caption.start, TimeFormat::Vtt),
                timecode(tto, caption.end, TimeFormat::Vtt)
            ));
            file.extend(cue_lines(tto, caption));
            file.push(String::new());
        }
        file
    }
}

/// Index of the first line holding a `-->` timing.
fn timing_position(block: &[&str]) -> Option<usize> {
    block.iter().position(|line| line.contains("-->"))
}

/// `block` starts at its timing line, `line` is that line's number.
fn parse_cue(tto: &mut TimedTextObject, line: usize, block: &[&str]) {
    match cue_timing(block[0]) {
        Some((start, end, _settings)) => {
            if end < start {
                tto.warn(format!("Cue at line {} ends before it starts", line));
            }
            let text = block[1..].join("\n");
            tto.insert_caption(Caption::new(start, end, text));
        }
        None => tto.warn(format!(
            "Incorrect time format at line {}, cue skipped",
            line
        )),
    }
}
