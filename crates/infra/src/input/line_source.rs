//! Line-oriented action source
//!
//! Reads console commands on a dedicated thread and forwards the parsed
//! actions to the controller's channel.

use std::io::{self, BufRead, BufReader, Read};
use std::thread;

use crossbeam_channel::Sender;
use tracing::{debug, warn};
use volsync_core::domain::action::Action;
use volsync_core::domain::source::{ActionSource, SourceError};

use super::command::{parse_command, Command};

pub struct LineSource<R> {
    reader: Option<R>,
}

impl<R: Read + Send + 'static> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl LineSource<io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(io::stdin())
    }
}

/// Forward parsed lines until EOF, `quit`, or a closed channel
fn pump<R: BufRead>(reader: R, sink: &Sender<Action>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to read input");
                break;
            }
        };

        match parse_command(&line) {
            Ok(Some(Command::Dispatch(action))) => {
                if sink.send(action).is_err() {
                    debug!("Controller gone, stopping input");
                    break;
                }
            }
            Ok(Some(Command::Quit)) => break,
            Ok(None) => {}
            Err(e) => warn!("{}", e),
        }
    }
}

impl<R: Read + Send + 'static> ActionSource for LineSource<R> {
    fn start(&mut self, sink: Sender<Action>) -> Result<(), SourceError> {
        let reader = self
            .reader
            .take()
            .ok_or_else(|| SourceError::StartFailed("Line source already started".to_string()))?;

        thread::Builder::new()
            .name("volsync-input".to_string())
            .spawn(move || pump(BufReader::new(reader), &sink))
            .map_err(|e| SourceError::StartFailed(e.to_string()))?;

        Ok(())
    }
}
