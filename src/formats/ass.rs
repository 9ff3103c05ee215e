use std::sync::Arc;

use super::{strip_html_tags, timecode, AssDialect, Format, SubtitleFormat};

use crate::caption::Caption;
use crate::error::Result;
use crate::parser::{clock_time, strip_bom};
use crate::style::{normalize_color, Color, ColorFormat, Style};
use crate::task::CancelHandle;
use crate::time::{Time, TimeFormat};
use crate::timed_text::TimedTextObject;

const ASS_STYLE_FORMAT: &[&str] = &[
    "Name", "Fontname", "Fontsize", "PrimaryColour", "SecondaryColour", "OutlineColour",
    "BackColour", "Bold", "Italic", "Underline", "StrikeOut", "ScaleX", "ScaleY", "Spacing",
    "Angle", "BorderStyle", "Outline", "Shadow", "Alignment", "MarginL", "MarginR", "MarginV",
    "Encoding",
];

const SSA_STYLE_FORMAT: &[&str] = &[
    "Name", "Fontname", "Fontsize", "PrimaryColour", "SecondaryColour", "TertiaryColour",
    "BackColour", "Bold", "Italic", "BorderStyle", "Outline", "Shadow", "Alignment", "MarginL",
    "MarginR", "MarginV", "AlphaLevel", "Encoding",
];

const ASS_EVENT_FORMAT: &[&str] = &[
    "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

const SSA_EVENT_FORMAT: &[&str] = &[
    "Marked", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

/// Canonical alignment tokens in ASS numpad order, `1` to `9`.
const ALIGNMENTS: [&str; 9] = [
    "bottom-left",
    "bottom-center",
    "bottom-right",
    "mid-left",
    "mid-center",
    "mid-right",
    "top-left",
    "top-center",
    "top-right",
];

const DEFAULT_STYLE: &str = "Default";

/// Advanced SubStation Alpha and its legacy SubStation Alpha dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    ScriptInfo,
    Styles,
    Events,
    Other,
}

struct AssParser {
    tto: TimedTextObject,
    section: Section,
    dialect: AssDialect,
    timer: f64,
    style_format: Vec<String>,
    event_format: Vec<String>,
    fallback_style: Option<Arc<Style>>,
}

impl SubtitleFormat for AssFormat {
    fn parse_cancellable(
        &self,
        file_name: &str,
        lines: &[&str],
        cancel: &CancelHandle,
    ) -> Result<TimedTextObject> {
        let mut parser = AssParser::new(file_name);
        for (index, &line) in lines.iter().enumerate() {
            let line = if index == 0 { strip_bom(line) } else { line };
            parser.line(index + 1, line.trim());
            cancel.check()?;
        }
        Ok(parser.finish())
    }

    fn to_file(&self, tto: &TimedTextObject) -> Vec<String> {
        let dialect = tto.dialect;
        let mut file = vec![
            "[Script Info]".to_string(),
            "; Script generated by subdex".to_string(),
        ];
        let title = if tto.title.is_empty() {
            &tto.file_name
        } else {
            &tto.title
        };
        file.push(format!("Title: {}", title));
        if !tto.author.is_empty() {
            file.push(format!("Original Script: {}", tto.author));
        }
        file.push(format!(
            "ScriptType: {}",
            match dialect {
                AssDialect::Ass => "v4.00+",
                AssDialect::Ssa => "v4.00",
            }
        ));
        file.push("Collisions: Normal".to_string());
        file.push("Timer: 100.0000".to_string());
        file.push(String::new());

        let (styles_header, style_format, event_format) = match dialect {
            AssDialect::Ass => ("[V4+ Styles]", ASS_STYLE_FORMAT, ASS_EVENT_FORMAT),
            AssDialect::Ssa => ("[V4 Styles]", SSA_STYLE_FORMAT, SSA_EVENT_FORMAT),
        };
        file.push(styles_header.to_string());
        file.push(format!("Format: {}", style_format.join(", ")));

        let default_style = Style::new(DEFAULT_STYLE);
        let mut styles: Vec<&Style> = tto.styling.values().map(|s| s.as_ref()).collect();
        styles.sort_by(|a, b| a.id.cmp(&b.id));
        let unstyled = tto.captions.values().any(|c| c.style.is_none());
        if (unstyled || styles.is_empty()) && !tto.styling.contains_key(DEFAULT_STYLE) {
            styles.insert(0, &default_style);
        }
        file.extend(styles.iter().map(|style| style_line(style, dialect)));
        file.push(String::new());

        file.push("[Events]".to_string());
        file.push(format!("Format: {}", event_format.join(", ")));
        for caption in tto.captions.values() {
            file.push(dialogue_line(tto, caption, dialect));
        }
        file
    }
}

impl AssParser {
    fn new(file_name: &str) -> Self {
        AssParser {
            tto: TimedTextObject::new(file_name),
            section: Section::Preamble,
            dialect: AssDialect::Ass,
            timer: 100.0,
            style_format: Vec::new(),
            event_format: Vec::new(),
            fallback_style: None,
        }
    }

    fn finish(mut self) -> TimedTextObject {
        self.tto.dialect = self.dialect;
        self.tto.source_format = Some(Format::Ass);
        self.tto.finish();
        self.tto
    }

    fn line(&mut self, number: usize, line: &str) {
        if line.is_empty() || line.starts_with(';') || line.starts_with("!:") {
            return;
        }
        if line.starts_with('[') && line.ends_with(']') {
            self.section = match line.to_ascii_lowercase().as_str() {
                "[script info]" => Section::ScriptInfo,
                "[v4 styles]" => {
                    self.dialect = AssDialect::Ssa;
                    Section::Styles
                }
                "[v4+ styles]" => {
                    self.dialect = AssDialect::Ass;
                    Section::Styles
                }
                "[events]" => Section::Events,
                _ => Section::Other,
            };
            return;
        }

        let (key, value) = match line.split_once(':') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => ("", line),
        };
        match (self.section, key) {
            (Section::ScriptInfo, _) => self.script_info(number, key, value),
            (Section::Styles, "Format") => self.style_format = format_fields(value),
            (Section::Styles, "Style") => self.style(number, value),
            (Section::Events, "Format") => self.event_format = format_fields(value),
            (Section::Events, "Dialogue") => self.dialogue(number, value),
            (Section::Events, "Comment" | "Picture" | "Sound" | "Movie" | "Command") => {}
            (Section::Other, _) => {}
            (Section::Preamble, _) => self
                .tto
                .warn(format!("Line {} is outside of any section: '{}'", number, line)),
            _ => self
                .tto
                .warn(format!("Unrecognised line {} skipped: '{}'", number, line)),
        }
    }

    fn script_info(&mut self, number: usize, key: &str, value: &str) {
        match key {
            "Title" => self.tto.title = value.to_string(),
            "Original Script" => self.tto.author = value.to_string(),
            "ScriptType" => {
                self.dialect = if value.eq_ignore_ascii_case("v4.00+") {
                    AssDialect::Ass
                } else if value.eq_ignore_ascii_case("v4.00") {
                    AssDialect::Ssa
                } else {
                    self.tto
                        .warn(format!("Unknown script type '{}' at line {}", value, number));
                    self.dialect
                }
            }
            "Timer" => match value.replace(',', ".").parse::<f64>() {
                Ok(timer) if timer > 0.0 => self.timer = timer,
                _ => self
                    .tto
                    .warn(format!("Timer value '{}' at line {} ignored", value, number)),
            },
            _ => {}
        }
    }

    fn style(&mut self, number: usize, value: &str) {
        if self.style_format.is_empty() {
            self.style_format = format_fields(&match self.dialect {
                AssDialect::Ass => ASS_STYLE_FORMAT.join(","),
                AssDialect::Ssa => SSA_STYLE_FORMAT.join(","),
            });
        }
        let fields: Vec<&str> = value.splitn(self.style_format.len(), ',').collect();
        if fields.len() != self.style_format.len() {
            self.tto.warn(format!(
                "Style at line {} has {} fields, expected {}",
                number,
                fields.len(),
                self.style_format.len()
            ));
            return;
        }

        let mut style = Style::new("");
        for (name, field) in self.style_format.clone().iter().zip(fields) {
            let field = field.trim();
            match name.as_str() {
                "name" => style.id = field.to_string(),
                "fontname" => style.font = field.to_string(),
                "fontsize" => style.font_size = field.to_string(),
                "primarycolour" => style.color = self.color(number, field),
                "backcolour" => style.background_color = self.color(number, field),
                "bold" => style.bold = flag(field),
                "italic" => style.italic = flag(field),
                "underline" => style.underline = flag(field),
                "alignment" => match alignment_token(field, self.dialect) {
                    Some(token) => style.text_align = token.to_string(),
                    None => self.tto.warn(format!(
                        "Unknown alignment '{}' at line {}",
                        field, number
                    )),
                },
                _ => {}
            }
        }
        if style.id.is_empty() {
            style.id = self.tto.next_default_style_id();
        }
        self.tto.add_style(style);
    }

    fn color(&mut self, number: usize, value: &str) -> Option<Color> {
        let hex = value
            .get(..2)
            .map_or(false, |marker| marker.eq_ignore_ascii_case("&h"));
        let format = match (hex, self.dialect) {
            (true, AssDialect::Ass) => ColorFormat::HexAbgr,
            (true, AssDialect::Ssa) => ColorFormat::HexBgr,
            (false, AssDialect::Ass) => ColorFormat::DecimalAbgr,
            (false, AssDialect::Ssa) => ColorFormat::DecimalBgr,
        };
        let parsed = normalize_color(format, value);
        if parsed.is_fallback() {
            self.tto
                .warn(format!("Malformed color '{}' at line {}", value, number));
        }
        parsed.color()
    }

    fn dialogue(&mut self, number: usize, value: &str) {
        if self.event_format.is_empty() {
            self.event_format = format_fields(&match self.dialect {
                AssDialect::Ass => ASS_EVENT_FORMAT.join(","),
                AssDialect::Ssa => SSA_EVENT_FORMAT.join(","),
            });
        }
        let fields: Vec<&str> = value.splitn(self.event_format.len(), ',').collect();
        if fields.len() != self.event_format.len() {
            self.tto.warn(format!(
                "Dialogue at line {} has {} fields, expected {}",
                number,
                fields.len(),
                self.event_format.len()
            ));
            return;
        }

        let mut start = None;
        let mut end = None;
        let mut style_name = "";
        let mut text = String::new();
        for (name, field) in self.event_format.iter().zip(fields) {
            match name.as_str() {
                "start" => start = Some(field),
                "end" => end = Some(field),
                "style" => style_name = field.trim().trim_start_matches('*'),
                "text" => text = field.replace("\\N", "\n").replace("\\n", "\n"),
                _ => {}
            }
        }

        let (start, end) = match (start.and_then(clock_time), end.and_then(clock_time)) {
            (Some(start), Some(end)) => (self.scaled(start), self.scaled(end)),
            _ => {
                self.tto.warn(format!(
                    "Incorrect time format in dialogue at line {}, skipped",
                    number
                ));
                return;
            }
        };
        if end < start {
            self.tto
                .warn(format!("Dialogue at line {} ends before it starts", number));
        }

        let style = match self.tto.style(style_name) {
            Some(style) => style,
            None => {
                if !style_name.is_empty() {
                    self.tto.warn(format!(
                        "Undefined style '{}' at line {}, using a default style",
                        style_name, number
                    ));
                }
                self.fallback_style()
            }
        };
        self.tto
            .insert_caption(Caption::new(start, end, text).with_style(style));
    }

    fn fallback_style(&mut self) -> Arc<Style> {
        if let Some(style) = &self.fallback_style {
            return Arc::clone(style);
        }
        let style = self.tto.add_default_style();
        self.fallback_style = Some(Arc::clone(&style));
        style
    }

    /// Applies the script's `Timer` speed to a parsed time.
    fn scaled(&self, time: Time) -> Time {
        if (self.timer - 100.0).abs() < f64::EPSILON {
            time
        } else {
            Time::from_millis((time.millis() as f64 * 100.0 / self.timer).round() as i64)
        }
    }
}

fn format_fields(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|field| field.trim().to_ascii_lowercase())
        .collect()
}

fn flag(value: &str) -> bool {
    matches!(value.parse::<i64>(), Ok(n) if n != 0)
}

fn alignment_token(value: &str, dialect: AssDialect) -> Option<&'static str> {
    let code: usize = value.parse().ok()?;
    let numpad = match dialect {
        AssDialect::Ass => code,
        AssDialect::Ssa => match code {
            1..=3 => code,
            5..=7 => code + 2,
            9..=11 => code - 5,
            _ => return None,
        },
    };
    ALIGNMENTS.get(numpad.checked_sub(1)?).copied()
}

fn alignment_code(token: &str, dialect: AssDialect) -> usize {
    let numpad = ALIGNMENTS
        .iter()
        .position(|t| *t == token)
        .map_or(2, |i| i + 1);
    match dialect {
        AssDialect::Ass => numpad,
        AssDialect::Ssa => match numpad {
            1..=3 => numpad,
            4..=6 => numpad + 5,
            _ => numpad - 2,
        },
    }
}

fn color_field(color: Option<&Color>, default: &str, dialect: AssDialect) -> String {
    match (color, dialect) {
        (Some(color), AssDialect::Ass) => color.to_ass_hex(),
        (Some(color), AssDialect::Ssa) => color.to_ssa_decimal(),
        (None, _) => default.to_string(),
    }
}

fn style_line(style: &Style, dialect: AssDialect) -> String {
    let font = if style.font.is_empty() { "Arial" } else { &style.font };
    let size = if style.font_size.is_empty() {
        "20"
    } else {
        &style.font_size
    };
    let bold = if style.bold { "-1" } else { "0" };
    let italic = if style.italic { "-1" } else { "0" };
    let alignment = alignment_code(&style.text_align, dialect);
    match dialect {
        AssDialect::Ass => {
            let primary = color_field(style.color.as_ref(), "&H00FFFFFF", dialect);
            let back = color_field(style.background_color.as_ref(), "&H00000000", dialect);
            let underline = if style.underline { "-1" } else { "0" };
            format!(
                "Style: {},{},{},{},{},{},{},{},{},{},0,100,100,0,0,1,2,0,{},10,10,10,0",
                style.id, font, size, primary, primary, back, back, bold, italic, underline, alignment
            )
        }
        AssDialect::Ssa => {
            let primary = color_field(style.color.as_ref(), "16777215", dialect);
            let back = color_field(style.background_color.as_ref(), "0", dialect);
            format!(
                "Style: {},{},{},{},{},{},{},{},{},1,2,0,{},10,10,10,0,0",
                style.id, font, size, primary, primary, back, back, bold, italic, alignment
            )
        }
    }
}

fn dialogue_line(tto: &TimedTextObject, caption: &Caption, dialect: AssDialect) -> String {
    let style = caption.style_id().unwrap_or(DEFAULT_STYLE);
    let text = strip_html_tags(&caption.content).replace('\n', "\\N");
    let marker = match dialect {
        AssDialect::Ass => "0",
        AssDialect::Ssa => "Marked=0",
    };
    format!(
        "Dialogue: {},{},{},{},,0,0,0,,{}",
        marker,
        timecode(tto, caption.start, TimeFormat::Ass),
        timecode(tto, caption.end, TimeFormat::Ass),
        style,
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASS_SAMPLE: &str = "[Script Info]
Title: Sample
Original Script: Someone
ScriptType: v4.00+

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H80000000,0,0,0,0,100,100,0,0,1,2,0,2,10,10,10,1
Style: Top,Verdana,24,&H0000FFFF,&H000000FF,&H00000000,&H00000000,-1,1,0,0,100,100,0,0,1,2,0,8,10,10,10,1
Style: Unused,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,0,2,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Comment: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,ignored
Dialogue: 0,0:00:01.00,0:00:02.50,Default,,0,0,0,,Hello, world\\Nsecond line
Dialogue: 0,0:00:03.00,0:00:04.00,Top,,0,0,0,,{\\i1}Up here{\\i0}
Dialogue: 0,0:00:05.00,0:00:06.00,Missing,,0,0,0,,Who?
";

    const SSA_SAMPLE: &str = "[Script Info]
ScriptType: v4.00

[V4 Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, TertiaryColour, BackColour, Bold, Italic, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, AlphaLevel, Encoding
Style: Default,Tahoma,18,16777215,65535,0,255,-1,0,1,2,0,6,10,10,10,0,0

[Events]
Format: Marked, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: Marked=0,0:00:01.00,0:00:02.00,*Default,,0000,0000,0000,,Legacy
";

    fn lines(input: &str) -> Vec<&str> {
        input.split('\n').collect()
    }

    #[test]
    fn parses_script_info_styles_and_events() {
        let tto = AssFormat.parse("sample.ass", &lines(ASS_SAMPLE));
        assert_eq!(tto.title, "Sample");
        assert_eq!(tto.author, "Someone");
        assert_eq!(tto.dialect, AssDialect::Ass);
        assert_eq!(tto.captions.len(), 3);

        let first = &tto.captions[&1000];
        assert_eq!(first.end.millis(), 2500);
        assert_eq!(first.content, "Hello, world\nsecond line");
        assert_eq!(first.style_id(), Some("Default"));

        let top = tto.captions[&3000].style.as_ref().unwrap();
        assert_eq!(top.font, "Verdana");
        assert_eq!(top.font_size, "24");
        assert_eq!(top.color.as_ref().unwrap().as_str(), "ffff0000");
        assert!(top.bold && top.italic && !top.underline);
        assert_eq!(top.text_align, "top-center");
        assert_eq!(tto.captions[&3000].content, "{\\i1}Up here{\\i0}");

        let default = tto.style("Default").unwrap();
        assert_eq!(default.background_color.as_ref().unwrap().as_str(), "00000080");
    }

    #[test]
    fn undefined_style_falls_back_and_unused_styles_are_pruned() {
        let tto = AssFormat.parse("sample.ass", &lines(ASS_SAMPLE));
        assert_eq!(tto.warnings().len(), 1);
        assert!(tto.warnings()[0].contains("Missing"));
        assert_eq!(tto.captions[&5000].style_id(), Some("default0"));

        let mut ids: Vec<&str> = tto.styling.keys().map(String::as_str).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["Default", "Top", "default0"]);
    }

    #[test]
    fn parses_legacy_ssa() {
        let tto = AssFormat.parse("legacy.ssa", &lines(SSA_SAMPLE));
        assert!(tto.warnings().is_empty(), "{:?}", tto.warnings());
        assert_eq!(tto.dialect, AssDialect::Ssa);
        let caption = &tto.captions[&1000];
        assert_eq!(caption.content, "Legacy");
        let style = caption.style.as_ref().unwrap();
        assert_eq!(style.color.as_ref().unwrap().as_str(), "ffffffff");
        assert_eq!(style.background_color.as_ref().unwrap().as_str(), "ff0000ff");
        assert_eq!(style.text_align, "top-center");
        assert!(style.bold);
    }

    #[test]
    fn timer_scales_times() {
        let input = "[Script Info]\nTimer: 200.0000\n\n[Events]\nDialogue: 0,0:00:02.00,0:00:04.00,,,0,0,0,,Fast\n";
        let tto = AssFormat.parse("fast.ass", &lines(input));
        let caption = &tto.captions[&1000];
        assert_eq!(caption.end.millis(), 2000);
        assert_eq!(caption.style_id(), Some("default0"));
    }

    #[test]
    fn malformed_records_are_skipped() {
        let input = "[V4+ Styles]
Style: Broken,Arial
[Events]
Dialogue: 0,0:00:xx.00,0:00:02.00,Default,,0,0,0,,Bad time
Dialogue: not enough
Gibberish here
";
        let tto = AssFormat.parse("bad.ass", &lines(input));
        assert!(tto.captions.is_empty());
        assert!(tto.built);
        assert_eq!(tto.warnings().len(), 4);
    }

    #[test]
    fn malformed_color_falls_back_with_warning() {
        let input = "[V4+ Styles]
Style: Odd,Arial,20,bogus,0,0,0,0,0,0,0,100,100,0,0,1,2,0,2,10,10,10,1
[Events]
Dialogue: 0,0:00:01.00,0:00:02.00,Odd,,0,0,0,,Hi
";
        let tto = AssFormat.parse("odd.ass", &lines(input));
        assert_eq!(tto.warnings().len(), 1);
        let style = tto.style("Odd").unwrap();
        assert_eq!(style.color.as_ref().unwrap().as_str(), "ff000000");
    }

    #[test]
    fn writes_ass_with_inverse_colors() {
        let mut tto = AssFormat.parse("sample.ass", &lines(ASS_SAMPLE));
        tto.offset = 1000;
        let written = AssFormat.to_file(&tto);

        assert_eq!(written[0], "[Script Info]");
        assert!(written.contains(&"ScriptType: v4.00+".to_string()));
        assert!(written.contains(&"[V4+ Styles]".to_string()));
        assert!(written.contains(
            &"Style: Top,Verdana,24,&H0000FFFF,&H0000FFFF,&H00000000,&H00000000,-1,-1,0,0,100,100,0,0,1,2,0,8,10,10,10,0"
                .to_string()
        ));
        assert!(written.contains(
            &"Dialogue: 0,0:00:02.00,0:00:03.50,Default,,0,0,0,,Hello, world\\Nsecond line".to_string()
        ));
        assert!(written.contains(
            &"Dialogue: 0,0:00:04.00,0:00:05.00,Top,,0,0,0,,{\\i1}Up here{\\i0}".to_string()
        ));
    }

    #[test]
    fn writes_ssa_dialect() {
        let mut tto = AssFormat.parse("legacy.ssa", &lines(SSA_SAMPLE));
        tto.dialect = AssDialect::Ssa;
        let written = AssFormat.to_file(&tto);
        assert!(written.contains(&"[V4 Styles]".to_string()));
        assert!(written.contains(
            &"Style: Default,Tahoma,18,16777215,16777215,255,255,-1,0,1,2,0,6,10,10,10,0,0".to_string()
        ));
        assert!(written.contains(
            &"Dialogue: Marked=0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Legacy".to_string()
        ));
    }

    #[test]
    fn ssa_colors_written_as_ass_keep_decoded_alpha() {
        let mut tto = AssFormat.parse("legacy.ssa", &lines(SSA_SAMPLE));
        tto.dialect = AssDialect::Ass;
        let written = AssFormat.to_file(&tto);
        // Decimal colors decode with alpha ff, which ASS reads as transparent.
        assert!(written.contains(
            &"Style: Default,Tahoma,18,&HFFFFFFFF,&HFFFFFFFF,&HFF0000FF,&HFF0000FF,-1,0,0,0,100,100,0,0,1,2,0,8,10,10,10,0"
                .to_string()
        ));
        assert!(written.contains(
            &"Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Legacy".to_string()
        ));
    }

    #[test]
    fn unstyled_captions_get_default_style() {
        let mut tto = TimedTextObject::new("plain");
        tto.insert_caption(Caption::new(
            Time::from_millis(0),
            Time::from_millis(1000),
            "<i>one</i>\ntwo",
        ));
        let written = AssFormat.to_file(&tto);
        assert!(written.contains(
            &"Style: Default,Arial,20,&H00FFFFFF,&H00FFFFFF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,0,2,10,10,10,0"
                .to_string()
        ));
        assert_eq!(
            written.last().unwrap(),
            "Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,one\\Ntwo"
        );
    }

    #[test]
    fn alignment_codes_round_trip() {
        for code in 1..=9 {
            let token = alignment_token(&code.to_string(), AssDialect::Ass).unwrap();
            assert_eq!(alignment_code(token, AssDialect::Ass), code);
        }
        for code in [1, 2, 3, 5, 6, 7, 9, 10, 11] {
            let token = alignment_token(&code.to_string(), AssDialect::Ssa).unwrap();
            assert_eq!(alignment_code(token, AssDialect::Ssa), code);
        }
        assert_eq!(alignment_token("4", AssDialect::Ssa), None);
        assert_eq!(alignment_token("0", AssDialect::Ass), None);
    }
}
