use super::{cue_lines, timecode, Format, SubtitleFormat};

use crate::caption::Caption;
use crate::error::Result;
use crate::parser::{cue_timing, sequence_number, strip_bom};
use crate::task::CancelHandle;
use crate::time::TimeFormat;
use crate::timed_text::TimedTextObject;

/// SubRip: numbered blocks of timecode and text separated by blank lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct SrtFormat;

impl SubtitleFormat for SrtFormat {
    fn parse_cancellable(
        &self,
        file_name: &str,
        lines: &[&str],
        cancel: &CancelHandle,
    ) -> Result<TimedTextObject> {
        let mut tto = TimedTextObject::new(file_name);

        for (first_line, block) in blocks(lines) {
            parse_block(&mut tto, first_line, &block);
            cancel.check()?;
        }

        tto.source_format = Some(Format::Srt);
        tto.finish();
        Ok(tto)
    }

    fn to_file(&self, tto: &TimedTextObject) -> Vec<String> {
        let mut file = Vec::with_capacity(tto.captions.len() * 4);
        for (index, caption) in tto.captions.values().enumerate() {
            file.push((index + 1).to_string());
            file.push(format!(
                "{} --> {}",
                timecode(tto, caption.start, TimeFormat::Srt),
                timecode(tto, caption.end, TimeFormat::Srt)
            ));
            file.extend(cue_lines(tto, caption));
            file.push(String::new());
        }
        file
    }
}

/// Groups non-blank lines into blocks, with the 1-based number of each
/// block's first line.
pub(super) fn blocks<'a>(lines: &[&'a str]) -> Vec<(usize, Vec<&'a str>)> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut first_line = 0;

    for (index, &line) in lines.iter().enumerate() {
        let line = if index == 0 { strip_bom(line) } else { line };
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push((first_line, std::mem::take(&mut current)));
            }
        } else {
            if current.is_empty() {
                first_line = index + 1;
            }
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push((first_line, current));
    }
    blocks
}

fn parse_block(tto: &mut TimedTextObject, first_line: usize, block: &[&str]) {
    let (timing_offset, timing) = if sequence_number(block[0]).is_some() {
        (1, block.get(1).copied())
    } else if cue_timing(block[0]).is_some() {
        tto.warn(format!(
            "Caption number expected at line {}, reading the block without it",
            first_line
        ));
        (0, Some(block[0]))
    } else {
        tto.warn(format!(
            "Unrecognised block at line {} skipped: '{}'",
            first_line, block[0]
        ));
        return;
    };

    let timing_line = first_line + timing_offset;
    let (start, end) = match timing.and_then(cue_timing) {
        Some((start, end, _)) => (start, end),
        None => {
            tto.warn(format!(
                "Incorrect time format at line {}, block skipped",
                timing_line
            ));
            return;
        }
    };
    if end < start {
        tto.warn(format!(
            "Caption at line {} ends before it starts",
            timing_line
        ));
    }

    let text = block[timing_offset + 1..].join("\n");
    tto.insert_caption(Caption::new(start, end, text));
}
