//! Subtitle timing and format conversion.
//!
//! Subtitle files in SubRip, WebVTT and ASS/SSA are parsed into a
//! [`TimedTextObject`], which can be queried for the captions on screen at a
//! given time and written back out in any of the formats.

pub mod caption;
pub mod config;
pub mod encoding;
pub mod error;
pub mod formats;
pub mod loader;
pub mod parser;
pub mod serialiser;
pub mod session;
pub mod style;
pub mod task;
pub mod time;
pub mod timed_text;

pub use caption::Caption;
pub use config::Config;
pub use error::{Result, SubtitleError};
pub use formats::{AssDialect, Format, SubtitleFormat};
pub use loader::load_file;
pub use session::{ParseInfo, SubtitleSession};
pub use style::{normalize_color, Color, ColorFormat, ColorParse, Style};
pub use task::{CancelHandle, ParseTask, TaskEvent};
pub use time::{Time, TimeFormat};
pub use timed_text::{CaptionsData, Timeline, TimedTextObject};
