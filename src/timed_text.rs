use std::collections::{BTreeMap, HashMap};
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::Arc;

use log::{debug, warn};

use crate::caption::Caption;
use crate::formats::{AssDialect, Format};
use crate::style::{Style, StyleIdGenerator};
use crate::time::Time;

/// How far from the anchor caption `get_caption` looks for concurrent cues.
///
/// Cues that start further away than this from the anchor are not reported
/// even if they are still on screen.
pub const CONCURRENT_CUE_WINDOW_MS: i64 = 20_000;

const WARNINGS_HEADER: &str = "List of non fatal errors produced during parsing:";

/// Selects which caption map a lookup runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeline {
    Original,
    /// The delayed captions built by [`TimedTextObject::create_delayed_captions`].
    Smart,
}

impl Timeline {
    pub fn select(smart: bool) -> Self {
        if smart {
            Timeline::Smart
        } else {
            Timeline::Original
        }
    }
}

/// Captions found by a lookup, with the time window they cover.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionsData<'a> {
    pub captions: Vec<&'a Caption>,
    pub min_start: i64,
    pub max_end: i64,
}

/// A parsed subtitle file: metadata, styles and captions indexed by start time.
#[derive(Debug, Clone)]
pub struct TimedTextObject {
    pub title: String,
    pub description: String,
    pub copyright: String,
    pub author: String,
    pub file_name: String,
    pub language: String,

    pub styling: HashMap<String, Arc<Style>>,
    /// Keyed by start millisecond. Colliding starts are moved to the next free key.
    pub captions: BTreeMap<i64, Caption>,
    pub smart_captions: BTreeMap<i64, Caption>,

    /// Codec the captions were read with, if any.
    pub source_format: Option<Format>,
    /// Dialect used when writing ASS/SSA.
    pub dialect: AssDialect,
    /// Added to every timestamp when writing.
    pub offset: i64,
    pub built: bool,

    warnings: Vec<String>,
    style_ids: StyleIdGenerator,
}

impl Default for TimedTextObject {
    fn default() -> Self {
        Self::new("")
    }
}

impl TimedTextObject {
    pub fn new<S: Into<String>>(file_name: S) -> Self {
        TimedTextObject {
            title: String::new(),
            description: String::new(),
            copyright: String::new(),
            author: String::new(),
            file_name: file_name.into(),
            language: String::new(),
            styling: HashMap::new(),
            captions: BTreeMap::new(),
            smart_captions: BTreeMap::new(),
            source_format: None,
            dialect: AssDialect::default(),
            offset: 0,
            built: false,
            warnings: Vec::new(),
            style_ids: StyleIdGenerator::new(),
        }
    }

    /// Inserts the caption at its start millisecond, probing forward past
    /// occupied keys. Returns the key the caption ended up under.
    pub fn insert_caption(&mut self, caption: Caption) -> i64 {
        insert_displaced(&mut self.captions, caption)
    }

    /// Adds a style to the table, replacing any style with the same id.
    pub fn add_style(&mut self, style: Style) -> Arc<Style> {
        let style = Arc::new(style);
        self.styling.insert(style.id.clone(), Arc::clone(&style));
        style
    }

    pub fn style(&self, id: &str) -> Option<Arc<Style>> {
        self.styling.get(id).cloned()
    }

    /// Creates and registers an empty style under a fresh `defaultN` id.
    pub fn add_default_style(&mut self) -> Arc<Style> {
        let id = self.style_ids.default_id();
        self.add_style(Style::new(id))
    }

    pub fn next_default_style_id(&mut self) -> String {
        self.style_ids.default_id()
    }

    /// Records a non fatal problem found while parsing.
    pub fn warn<S: Into<String>>(&mut self, message: S) {
        let message = message.into();
        warn!("{}: {}", self.file_name, message);
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// All warnings as one human readable block.
    pub fn warnings_report(&self) -> String {
        let mut report = format!("{}\n\n", WARNINGS_HEADER);
        for warning in &self.warnings {
            report.push_str(warning);
            report.push('\n');
        }
        report
    }

    /// Prunes unused styles and marks the object as built.
    pub fn finish(&mut self) {
        self.clean_unused_styles();
        self.built = true;
        debug!(
            "Built '{}': {} captions, {} styles, {} warnings",
            self.file_name,
            self.captions.len(),
            self.styling.len(),
            self.warnings.len()
        );
    }

    /// Keeps only the styles referenced by at least one caption.
    pub fn clean_unused_styles(&mut self) {
        let mut used = HashMap::new();
        for caption in self.captions.values() {
            if let Some(style) = &caption.style {
                used.entry(style.id.clone())
                    .or_insert_with(|| Arc::clone(style));
            }
        }
        self.styling = used;
    }

    /// Rebuilds the smart timeline: every caption echoed right after its own
    /// end, with the same duration.
    pub fn create_delayed_captions(&mut self) {
        self.smart_captions.clear();
        for caption in self.captions.values() {
            let duration = caption.end - caption.start;
            let delayed = Caption {
                start: caption.end,
                end: caption.end + duration,
                style: caption.style.clone(),
                content: caption.content.clone(),
            };
            insert_displaced(&mut self.smart_captions, delayed);
        }
    }

    pub fn timeline(&self, timeline: Timeline) -> &BTreeMap<i64, Caption> {
        match timeline {
            Timeline::Original => &self.captions,
            Timeline::Smart => &self.smart_captions,
        }
    }

    /// Captions on screen at `time`, including overlapping cues that start
    /// within [`CONCURRENT_CUE_WINDOW_MS`] of the anchor caption.
    pub fn get_caption(&self, time: i64, timeline: Timeline) -> Option<CaptionsData<'_>> {
        let captions = self.timeline(timeline);
        let at = Time::from_millis(time);
        let (&anchor_key, anchor) = captions.range(..=time).next_back()?;

        let mut found: Vec<&Caption> = captions
            .range(..anchor_key)
            .rev()
            .take_while(|&(&key, _)| within_window(anchor_key, key))
            .map(|(_, caption)| caption)
            .filter(|caption| caption.is_appropriate_for(at))
            .collect();
        found.reverse();

        if anchor.is_appropriate_for(at) {
            found.push(anchor);
        }

        found.extend(
            captions
                .range((Excluded(anchor_key), Unbounded))
                .take_while(|&(&key, _)| within_window(anchor_key, key))
                .map(|(_, caption)| caption)
                .filter(|caption| caption.is_appropriate_for(at)),
        );

        let min_start = found.iter().map(|c| c.start.millis()).min()?;
        let max_end = found.iter().map(|c| c.end.millis()).max()?;
        Some(CaptionsData {
            captions: found,
            min_start,
            max_end,
        })
    }

    /// The first caption whose key is strictly after `time`.
    ///
    /// The window starts at the key rather than the caption's own start, so
    /// captions displaced by a start-time collision can still be stepped through.
    pub fn get_next_caption(&self, time: i64, timeline: Timeline) -> Option<CaptionsData<'_>> {
        self.timeline(timeline)
            .range((Excluded(time), Unbounded))
            .next()
            .map(single)
    }

    /// The last caption whose key is strictly before `time`.
    pub fn get_previous_caption(&self, time: i64, timeline: Timeline) -> Option<CaptionsData<'_>> {
        self.timeline(timeline)
            .range(..time)
            .next_back()
            .map(single)
    }

    /// `time` shifted by the configured offset.
    pub fn shifted(&self, time: Time) -> Time {
        time + self.offset
    }

    pub fn to_srt(&self) -> Vec<String> {
        Format::Srt.to_file(self)
    }

    pub fn to_ass(&self) -> Vec<String> {
        Format::Ass.to_file(self)
    }

    pub fn to_vtt(&self) -> Vec<String> {
        Format::Vtt.to_file(self)
    }
}

fn within_window(anchor_key: i64, key: i64) -> bool {
    anchor_key.abs_diff(key) <= CONCURRENT_CUE_WINDOW_MS.unsigned_abs()
}

fn single<'a>((key, caption): (&i64, &'a Caption)) -> CaptionsData<'a> {
    CaptionsData {
        captions: vec![caption],
        min_start: *key,
        max_end: caption.end.millis(),
    }
}

// TODO: collisions shift the key away from the caption's real start; an
// ordered multimap keyed by (start, sequence) would keep both exact.
fn insert_displaced(map: &mut BTreeMap<i64, Caption>, caption: Caption) -> i64 {
    let start = caption.start.millis();
    // Past the end of the key range the search continues below the start.
    let key = (start..=i64::MAX)
        .find(|key| !map.contains_key(key))
        .or_else(|| (i64::MIN..start).rev().find(|key| !map.contains_key(key)))
        .unwrap_or(start);
    map.insert(key, caption);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caption(start: i64, end: i64, text: &str) -> Caption {
        Caption::new(Time::from_millis(start), Time::from_millis(end), text)
    }

    fn timeline_of(spans: &[(i64, i64, &str)]) -> TimedTextObject {
        let mut tto = TimedTextObject::new("test.srt");
        for &(start, end, text) in spans {
            tto.insert_caption(caption(start, end, text));
        }
        tto.finish();
        tto
    }

    fn texts(data: &CaptionsData) -> Vec<String> {
        data.captions.iter().map(|c| c.content.clone()).collect()
    }

    #[test]
    fn colliding_starts_are_displaced() {
        let mut tto = TimedTextObject::new("a.srt");
        assert_eq!(tto.insert_caption(caption(5000, 6000, "first")), 5000);
        let second = tto.insert_caption(caption(5000, 6500, "second"));
        assert!(second >= 5001);
        assert_eq!(tto.captions[&5000].content, "first");
        assert_eq!(tto.captions[&second].content, "second");
        assert_eq!(tto.captions[&second].start.millis(), 5000);
    }

    #[test]
    fn get_caption_reports_concurrent_cues() {
        let tto = timeline_of(&[(1000, 2000, "a"), (1500, 2500, "b"), (30000, 31000, "c")]);

        let data = tto.get_caption(1800, Timeline::Original).unwrap();
        assert_eq!(texts(&data), vec!["a", "b"]);
        assert_eq!((data.min_start, data.max_end), (1000, 2500));

        let data = tto.get_caption(30500, Timeline::Original).unwrap();
        assert_eq!(texts(&data), vec!["c"]);
        assert_eq!((data.min_start, data.max_end), (30000, 31000));

        assert!(tto.get_caption(10000, Timeline::Original).is_none());
    }

    #[test]
    fn get_caption_before_first_cue_is_empty() {
        let tto = timeline_of(&[(1000, 2000, "a")]);
        assert!(tto.get_caption(999, Timeline::Original).is_none());
        assert!(tto.get_caption(1000, Timeline::Original).is_some());
    }

    #[test]
    fn get_caption_walks_forward_to_displaced_duplicate() {
        let tto = timeline_of(&[(1000, 5000, "long"), (1000, 3000, "short")]);
        let data = tto.get_caption(1000, Timeline::Original).unwrap();
        assert_eq!(texts(&data), vec!["long", "short"]);
        assert_eq!((data.min_start, data.max_end), (1000, 5000));
        let data = tto.get_caption(3500, Timeline::Original).unwrap();
        assert_eq!(texts(&data), vec!["long"]);
    }

    #[test]
    fn get_caption_misses_long_cues_outside_window() {
        let tto = timeline_of(&[(0, 60_000, "long"), (25_000, 26_000, "late")]);
        let data = tto.get_caption(25_500, Timeline::Original).unwrap();
        assert_eq!(texts(&data), vec!["late"]);
    }

    #[test]
    fn get_caption_window_bound_is_inclusive_backward() {
        let tto = timeline_of(&[(0, 60_000, "long"), (20_000, 21_000, "late")]);
        let data = tto.get_caption(20_500, Timeline::Original).unwrap();
        assert_eq!(texts(&data), vec!["long", "late"]);

        let tto = timeline_of(&[(0, 60_000, "long"), (20_001, 21_000, "late")]);
        let data = tto.get_caption(20_500, Timeline::Original).unwrap();
        assert_eq!(texts(&data), vec!["late"]);
    }

    #[test]
    fn get_caption_window_bound_is_inclusive_forward() {
        // Only displaced keys can lie after the query time and still be on screen.
        let mut tto = TimedTextObject::new("test.srt");
        tto.captions.insert(0, caption(0, 1000, "anchor"));
        tto.captions.insert(20_000, caption(0, 1000, "edge"));
        tto.captions.insert(20_001, caption(0, 1000, "beyond"));
        let data = tto.get_caption(0, Timeline::Original).unwrap();
        assert_eq!(texts(&data), vec!["anchor", "edge"]);
    }

    #[test]
    fn extreme_keys_do_not_overflow() {
        let tto = timeline_of(&[(i64::MIN, i64::MAX, "forever"), (10, 20, "short")]);
        let data = tto.get_caption(15, Timeline::Original).unwrap();
        assert_eq!(texts(&data), vec!["short"]);
        let data = tto.get_caption(i64::MIN, Timeline::Original).unwrap();
        assert_eq!(texts(&data), vec!["forever"]);
        assert_eq!((data.min_start, data.max_end), (i64::MIN, i64::MAX));

        let mut tto = TimedTextObject::new("edge.srt");
        assert_eq!(tto.insert_caption(caption(i64::MAX, i64::MAX, "a")), i64::MAX);
        assert_eq!(tto.insert_caption(caption(i64::MAX, i64::MAX, "b")), i64::MAX - 1);
    }

    #[test]
    fn writes_every_format() {
        let mut tto = timeline_of(&[(1000, 2000, "Hello")]);
        assert_eq!(tto.to_srt()[..2], ["1", "00:00:01,000 --> 00:00:02,000"]);
        assert_eq!(tto.to_vtt()[0], "WEBVTT");
        assert!(tto
            .to_ass()
            .contains(&"Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello".to_string()));

        tto.offset = 500;
        assert_eq!(tto.to_srt()[1], "00:00:01,500 --> 00:00:02,500");
    }

    #[test]
    fn next_and_previous_step_through_displaced_keys() {
        let tto = timeline_of(&[(1000, 2000, "a"), (1000, 2000, "b"), (4000, 5000, "c")]);

        let next = tto.get_next_caption(999, Timeline::Original).unwrap();
        assert_eq!((texts(&next), next.min_start), (vec!["a".to_string()], 1000));

        let next = tto.get_next_caption(next.min_start, Timeline::Original).unwrap();
        assert_eq!((texts(&next), next.min_start), (vec!["b".to_string()], 1001));
        assert_eq!(next.max_end, 2000);

        let next = tto.get_next_caption(next.min_start, Timeline::Original).unwrap();
        assert_eq!(texts(&next), vec!["c"]);
        assert!(tto.get_next_caption(4000, Timeline::Original).is_none());

        let prev = tto.get_previous_caption(4000, Timeline::Original).unwrap();
        assert_eq!((texts(&prev), prev.min_start), (vec!["b".to_string()], 1001));
        assert!(tto.get_previous_caption(1000, Timeline::Original).is_none());
    }

    #[test]
    fn delayed_captions_echo_each_cue() {
        let mut tto = timeline_of(&[(1000, 2000, "a"), (1500, 2000, "b")]);
        tto.create_delayed_captions();

        let a = &tto.smart_captions[&2000];
        assert_eq!((a.start.millis(), a.end.millis()), (2000, 3000));
        let b = &tto.smart_captions[&2001];
        assert_eq!((b.start.millis(), b.end.millis()), (2000, 2500));
        assert_eq!(tto.captions.len(), 2);

        tto.create_delayed_captions();
        assert_eq!(tto.smart_captions.len(), 2);

        let data = tto.get_caption(2600, Timeline::Smart).unwrap();
        assert_eq!(texts(&data), vec!["a"]);
    }

    #[test]
    fn clean_unused_styles_keeps_referenced_only() {
        let mut tto = TimedTextObject::new("a.ass");
        let a = tto.add_style(Style::new("A"));
        tto.add_style(Style::new("B"));
        tto.add_style(Style::new("C"));
        tto.insert_caption(caption(0, 10, "x").with_style(Arc::clone(&a)));
        tto.insert_caption(caption(20, 30, "y").with_style(a));
        tto.insert_caption(caption(40, 50, "z"));

        tto.clean_unused_styles();
        let ids: Vec<&String> = tto.styling.keys().collect();
        assert_eq!(ids, vec!["A"]);
        assert_eq!(tto.captions.len(), 3);
    }

    #[test]
    fn default_styles_get_fresh_ids() {
        let mut tto = TimedTextObject::new("a.srt");
        assert_eq!(tto.add_default_style().id, "default0");
        assert_eq!(tto.add_default_style().id, "default1");
        assert_eq!(tto.styling.len(), 2);
    }

    #[test]
    fn warnings_are_accumulated() {
        let mut tto = TimedTextObject::new("a.srt");
        tto.warn("line 3: bad timecode");
        tto.warn("line 9: bad timecode");
        assert_eq!(tto.warnings().len(), 2);
        let report = tto.warnings_report();
        assert!(report.starts_with(WARNINGS_HEADER));
        assert!(report.ends_with("line 9: bad timecode\n"));
    }
}
