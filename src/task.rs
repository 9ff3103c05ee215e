//! Parsing subtitle files off the caller's thread.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info};

use crate::error::{Result, SubtitleError};
use crate::loader::load_file;
use crate::timed_text::TimedTextObject;

/// Shared flag that asks a running parse to stop.
///
/// Codecs check it after every record; once set, the parse returns
/// [`SubtitleError::Cancelled`] and its partial result is dropped.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(SubtitleError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Progress reported by a [`ParseTask`].
#[derive(Debug)]
pub enum TaskEvent {
    Parsed { path: PathBuf, tto: TimedTextObject },
    Failed { path: PathBuf, error: SubtitleError },
    /// Every path was processed.
    Finished,
    /// The task stopped early; no further events follow.
    Cancelled,
}

/// A batch of subtitle files parsed on a worker thread.
pub struct ParseTask {
    cancel: CancelHandle,
    events: Receiver<TaskEvent>,
    worker: Option<JoinHandle<()>>,
}

impl ParseTask {
    pub fn spawn(paths: Vec<PathBuf>, language: Option<String>, encoding: Option<String>) -> Self {
        let cancel = CancelHandle::new();
        let (sender, events) = mpsc::channel();
        let worker_cancel = cancel.clone();
        let worker = thread::spawn(move || {
            run(
                &paths,
                language.as_deref(),
                encoding.as_deref(),
                &worker_cancel,
                &sender,
            )
        });
        ParseTask {
            cancel,
            events,
            worker: Some(worker),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn events(&self) -> &Receiver<TaskEvent> {
        &self.events
    }

    /// Blocks until the worker is done and returns every event it sent.
    pub fn wait(mut self) -> Vec<TaskEvent> {
        if let Some(worker) = self.worker.take() {
            // A panicking worker drops its sender; the events sent so far
            // are still returned.
            let _ = worker.join();
        }
        self.events.try_iter().collect()
    }
}

fn run(
    paths: &[PathBuf],
    language: Option<&str>,
    encoding: Option<&str>,
    cancel: &CancelHandle,
    sender: &Sender<TaskEvent>,
) {
    for path in paths {
        if cancel.is_cancelled() {
            break;
        }
        let event = match load_file(path, language, encoding, cancel) {
            Ok(tto) => TaskEvent::Parsed {
                path: path.clone(),
                tto,
            },
            Err(SubtitleError::Cancelled) => break,
            Err(error) => TaskEvent::Failed {
                path: path.clone(),
                error,
            },
        };
        if sender.send(event).is_err() {
            debug!("Parse task receiver dropped, stopping");
            return;
        }
    }

    let last = if cancel.is_cancelled() {
        info!("Parse task cancelled");
        TaskEvent::Cancelled
    } else {
        info!("Parse task finished {} files", paths.len());
        TaskEvent::Finished
    };
    let _ = sender.send(last);
}
