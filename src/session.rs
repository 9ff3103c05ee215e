//! Several subtitle tracks shown together against one playback clock.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::SubtitleError;
use crate::loader::load_file;
use crate::task::CancelHandle;
use crate::timed_text::{CaptionsData, Timeline, TimedTextObject};

/// Captions from different tracks closer than this to the best match are
/// shown together when stepping.
pub const ACCEPTABLE_DELAY_MS: i64 = 500;

/// Outcome of loading one subtitle path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseInfo {
    pub path: PathBuf,
    pub successful: bool,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct SubtitleSession {
    parsed: BTreeMap<PathBuf, TimedTextObject>,
    subtitle_delay: i64,
    last_min_caption_time: i64,
    last_max_caption_time: i64,
}

impl SubtitleSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Playback time minus this delay is used for lookups.
    pub fn set_subtitle_delay(&mut self, delay: i64) {
        self.subtitle_delay = delay;
    }

    pub fn len(&self) -> usize {
        self.parsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<&TimedTextObject> {
        self.parsed.get(path)
    }

    /// Makes `paths` the selected tracks: drops tracks no longer selected and
    /// parses the new ones. Already loaded tracks are kept as they are.
    pub fn load<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        language: Option<&str>,
        encoding: Option<&str>,
    ) -> Vec<ParseInfo> {
        let selected: Vec<&Path> = paths.iter().map(AsRef::as_ref).collect();
        self.parsed.retain(|path, _| selected.contains(&path.as_path()));

        let cancel = CancelHandle::new();
        let mut infos = Vec::new();
        for path in selected {
            if self.parsed.contains_key(path) {
                continue;
            }
            let info = match load_file(path, language, encoding, &cancel) {
                Ok(tto) => self.insert(path, tto),
                Err(error) => {
                    warn!("{}", error);
                    failure(path, &error)
                }
            };
            infos.push(info);
        }
        infos
    }

    /// Adds an already parsed track, as delivered by a
    /// [`ParseTask`](crate::task::ParseTask).
    pub fn insert<P: AsRef<Path>>(&mut self, path: P, mut tto: TimedTextObject) -> ParseInfo {
        let path = path.as_ref();
        if tto.captions.is_empty() {
            return ParseInfo {
                path: path.to_path_buf(),
                successful: false,
                error: format!("No subtitles could be read from '{}'", file_name(path)),
            };
        }
        tto.create_delayed_captions();
        info!("Subtitle track '{}' ready", path.display());
        self.parsed.insert(path.to_path_buf(), tto);
        ParseInfo {
            path: path.to_path_buf(),
            successful: true,
            error: String::new(),
        }
    }

    /// Captions on screen at playback time `now` across all tracks.
    pub fn captions_at(&mut self, smart: bool, now: i64) -> Vec<CaptionsData<'_>> {
        let time = now.saturating_sub(self.subtitle_delay);
        let timeline = Timeline::select(smart);
        let found: Vec<CaptionsData> = self
            .parsed
            .values()
            .filter_map(|tto| tto.get_caption(time, timeline))
            .collect();

        self.last_max_caption_time = found.iter().map(|d| d.max_end).max().unwrap_or(time);
        self.last_min_caption_time = found.iter().map(|d| d.min_start).min().unwrap_or(time);
        found
    }

    /// Steps forward from the last shown window to the earliest upcoming
    /// caption, together with captions of other tracks starting close to it.
    pub fn next_captions(&mut self, smart: bool) -> Vec<CaptionsData<'_>> {
        let timeline = Timeline::select(smart);
        let after = self.last_max_caption_time;
        let found: Vec<CaptionsData> = self
            .parsed
            .values()
            .filter_map(|tto| tto.get_next_caption(after, timeline))
            .collect();

        let best = match found.iter().map(|d| d.min_start).min() {
            Some(best) => best,
            None => return Vec::new(),
        };
        let close: Vec<CaptionsData> = found
            .into_iter()
            .filter(|d| d.min_start.abs_diff(best) <= ACCEPTABLE_DELAY_MS.unsigned_abs())
            .collect();
        self.last_min_caption_time = best;
        self.last_max_caption_time = close.iter().map(|d| d.min_start).max().unwrap_or(best);
        close
    }

    /// Steps backward from the last shown window to the latest earlier
    /// caption, together with captions of other tracks starting close to it.
    pub fn previous_captions(&mut self, smart: bool) -> Vec<CaptionsData<'_>> {
        let timeline = Timeline::select(smart);
        let before = self.last_min_caption_time;
        let found: Vec<CaptionsData> = self
            .parsed
            .values()
            .filter_map(|tto| tto.get_previous_caption(before, timeline))
            .collect();

        let best = match found.iter().map(|d| d.min_start).max() {
            Some(best) => best,
            None => return Vec::new(),
        };
        let close: Vec<CaptionsData> = found
            .into_iter()
            .filter(|d| d.min_start.abs_diff(best) <= ACCEPTABLE_DELAY_MS.unsigned_abs())
            .collect();
        self.last_max_caption_time = best;
        self.last_min_caption_time = close.iter().map(|d| d.min_start).min().unwrap_or(best);
        close
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn failure(path: &Path, error: &SubtitleError) -> ParseInfo {
    let error = match error {
        SubtitleError::Io { .. } => format!("Subtitle file '{}' not found", file_name(path)),
        other => format!("Could not parse '{}': {}", file_name(path), other),
    };
    ParseInfo {
        path: path.to_path_buf(),
        successful: false,
        error,
    }
}
