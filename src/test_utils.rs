//! Shared test doubles for the collaborator traits.
//!
//! [`crate::editor::TextBuffer`] already records cursor moves and opened
//! paths, so it stands in for the editor; the launcher, title source and
//! clipboard are faked here.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use url::Url;

use crate::dispatch::ProcessLauncher;
use crate::error::LinkError;
use crate::follower::Clipboard;
use crate::title::TitleSource;

/// Remembers every launch instead of starting anything.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    launched: Mutex<Vec<(String, Vec<String>)>>,
    opened: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    pub fn launched(&self) -> Vec<(String, Vec<String>)> {
        self.launched.lock().unwrap().clone()
    }

    /// Targets handed to the OS default handler, in order.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn launch(&self, command: &str, args: &[String]) -> Result<(), LinkError> {
        self.launched
            .lock()
            .unwrap()
            .push((command.to_string(), args.to_vec()));
        Ok(())
    }

    fn open_default(&self, target: &str) -> Result<(), LinkError> {
        self.opened.lock().unwrap().push(target.to_string());
        Ok(())
    }
}

/// Titles keyed by normalised URL. Unknown URLs fail like an HTTP 404.
#[derive(Debug, Default)]
pub struct CannedTitles {
    titles: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl CannedTitles {
    pub fn with(mut self, url: &str, title: &str) -> CannedTitles {
        self.titles.insert(url.to_string(), title.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl TitleSource for CannedTitles {
    fn fetch_title(&self, url: &Url, _timeout: Duration) -> Result<String, LinkError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.titles
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| LinkError::FetchFailed {
                url: url.to_string(),
                reason: "status 404".to_string(),
            })
    }
}

pub struct FixedClipboard(Option<String>);

impl FixedClipboard {
    pub fn new(text: &str) -> FixedClipboard {
        FixedClipboard(Some(text.to_string()))
    }

    pub fn unavailable() -> FixedClipboard {
        FixedClipboard(None)
    }
}

impl Clipboard for FixedClipboard {
    fn text(&mut self) -> Result<String, LinkError> {
        self.0.clone().ok_or_else(|| LinkError::Clipboard {
            reason: "no clipboard in tests".to_string(),
        })
    }
}
