use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::encoding::Encoding;
use crate::error::{Result, SubtitleError};
use crate::formats::AssDialect;

/// Settings read from a JSON file. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Added to every timestamp when writing.
    pub offset_ms: i64,

    /// Dialect written when the output format falls back to an ASS/SSA
    /// input. An output name ending in `.ass` or `.ssa` decides it otherwise.
    pub ass_dialect: AssDialect,

    /// Manual input encoding, see [`Encoding::from_name`].
    pub encoding: Option<String>,

    /// Language of the input, used as a decoding hint.
    pub language: Option<String>,

    /// Subtracted from playback time before looking captions up.
    pub subtitle_delay_ms: i64,

    /// Query the delayed echo timeline instead of the original one.
    pub smart_subtitles: bool,

    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| SubtitleError::io(path, e))?;
        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| SubtitleError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would only fail later, mid-conversion.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = self.encoding.as_deref().filter(|n| !n.trim().is_empty()) {
            Encoding::from_name(name)
                .map_err(|_| SubtitleError::Config(format!("unknown encoding '{}'", name)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.ass_dialect, AssDialect::Ass);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subdex.json");
        fs::write(
            &path,
            r#"{"offset_ms": -250, "ass_dialect": "ssa", "encoding": "cp1252",
                "subtitle_delay_ms": 100, "smart_subtitles": true, "log_level": "debug"}"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.offset_ms, -250);
        assert_eq!(config.ass_dialect, AssDialect::Ssa);
        assert_eq!(config.encoding.as_deref(), Some("cp1252"));
        assert_eq!(config.subtitle_delay_ms, 100);
        assert!(config.smart_subtitles);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn invalid_files_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");

        fs::write(&path, r#"{"offset_ms": "soon"}"#).unwrap();
        assert!(matches!(Config::from_file(&path), Err(SubtitleError::Config(_))));

        fs::write(&path, r#"{"encoding": "ebcdic"}"#).unwrap();
        assert!(matches!(Config::from_file(&path), Err(SubtitleError::Config(_))));

        assert!(matches!(
            Config::from_file(dir.path().join("absent.json")),
            Err(SubtitleError::Io { .. })
        ));
    }
}
