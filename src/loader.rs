use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::encoding::{decode, split_lines};
use crate::error::{Result, SubtitleError};
use crate::formats::Format;
use crate::task::CancelHandle;
use crate::timed_text::TimedTextObject;

/// Reads, decodes and parses one subtitle file, picking the codec from its
/// extension.
///
/// Files with an unknown extension give an empty, unbuilt object.
pub fn load_file<P: AsRef<Path>>(
    path: P,
    language: Option<&str>,
    encoding: Option<&str>,
    cancel: &CancelHandle,
) -> Result<TimedTextObject> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let format = match Format::from_path(path) {
        Some(format) => format,
        None => {
            debug!("No codec for '{}'", path.display());
            return Ok(TimedTextObject::new(file_name));
        }
    };

    let bytes = fs::read(path).map_err(|e| SubtitleError::io(path, e))?;
    let text = decode(&bytes, language, encoding)?;
    let mut tto = format.parse_cancellable(&file_name, &split_lines(&text), cancel)?;
    if let Some(language) = language {
        tto.language = language.to_string();
    }
    info!(
        "Loaded '{}' as {}: {} captions",
        path.display(),
        format,
        tto.captions.len()
    );
    Ok(tto)
}
