//! The command surface offered to a host editor.
//!
//! A [`LinkFollower`] is built once from [`Settings`] and lives until
//! [`LinkFollower::shutdown`]. Everything but the title fetch runs on the
//! caller's thread; fetches go to a small tokio runtime and report back
//! through a completion callback.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tracing::{info, warn};

use crate::config::Settings;
use crate::dispatch::{Action, Dispatcher, EditorBuffer, Outcome, ProcessLauncher};
use crate::error::LinkError;
use crate::launcher::SystemLauncher;
use crate::parser::navigation::{find_next_link, find_previous_link};
use crate::parser::url::is_url;
use crate::parser::{resolve_at_cursor, CursorPosition, Resolved};
use crate::security::validate_web_target;
use crate::target::{parse_file_target, Target};
use crate::title::{markdown_link, HttpTitleSource, TitleSource};

/// Source of text for paste-markdown-link.
pub trait Clipboard {
    fn text(&mut self) -> Result<String, LinkError>;
}

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub struct LinkFollower {
    settings: Arc<Settings>,
    launcher: Arc<dyn ProcessLauncher>,
    titles: Arc<dyn TitleSource>,
    /// `None` in blocking fallback mode
    runtime: Option<Runtime>,
}

impl LinkFollower {
    /// Follower talking to the real OS and network.
    pub fn initialize(settings: Arc<Settings>) -> LinkFollower {
        let titles = Arc::new(HttpTitleSource::new(&settings));
        LinkFollower::with_collaborators(settings, Arc::new(SystemLauncher), titles)
    }

    pub fn with_collaborators(
        settings: Arc<Settings>,
        launcher: Arc<dyn ProcessLauncher>,
        titles: Arc<dyn TitleSource>,
    ) -> LinkFollower {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("linkfollow-worker")
            .enable_all()
            .build()
            .map_err(|err| warn!("no background runtime, fetching titles inline: {err}"))
            .ok();

        LinkFollower {
            settings,
            launcher,
            titles,
            runtime,
        }
    }

    /// Follower that never leaves the caller's thread.
    pub fn blocking(
        settings: Arc<Settings>,
        launcher: Arc<dyn ProcessLauncher>,
        titles: Arc<dyn TitleSource>,
    ) -> LinkFollower {
        LinkFollower {
            settings,
            launcher,
            titles,
            runtime: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_blocking(&self) -> bool {
        self.runtime.is_none()
    }

    /// Waits a bounded time for in-flight fetches.
    pub fn shutdown(self) {
        if let Some(runtime) = self.runtime {
            runtime.shutdown_timeout(SHUTDOWN_GRACE);
        }
        info!("link follower shut down");
    }

    pub fn resolve_at_cursor(&self, editor: &dyn EditorBuffer) -> Option<Resolved> {
        resolve_at_cursor(&editor.lines(), editor.cursor())
    }

    /// Follow the link under the cursor. The result has already been
    /// reported through `tracing` when this returns.
    pub fn handle_uri_at_cursor(
        &self,
        editor: &mut dyn EditorBuffer,
    ) -> Result<Outcome, LinkError> {
        let resolved = self.resolve_at_cursor(editor);
        let action = Action::select(resolved.as_ref().map(|resolved| resolved.target.as_str()));

        report(self.dispatcher().dispatch(action, editor))
    }

    /// Open `path[:line][#anchor]` in the editor, relative to the current
    /// document. A bare `#anchor` jumps within the current document.
    pub fn edit_file_with_anchor(
        &self,
        argument: &str,
        editor: &mut dyn EditorBuffer,
    ) -> Result<Outcome, LinkError> {
        let argument = argument.trim();
        let action = if argument.is_empty() {
            Action::NoOp
        } else {
            Action::File(parse_file_target(argument))
        };

        report(self.dispatcher().dispatch(action, editor))
    }

    /// Move the cursor to the start of the next link, wrapping at the end.
    pub fn find_next_link(&self, editor: &mut dyn EditorBuffer) -> Option<CursorPosition> {
        let next = find_next_link(&editor.lines(), editor.cursor());
        move_to(editor, next)
    }

    pub fn find_previous_link(&self, editor: &mut dyn EditorBuffer) -> Option<CursorPosition> {
        let previous = find_previous_link(&editor.lines(), editor.cursor());
        move_to(editor, previous)
    }

    /// Fetch the page title of `url`. The URL is validated before this
    /// returns; a rejected URL invokes `on_done` immediately.
    pub fn get_title_for_url<F>(&self, url: &str, on_done: F)
    where
        F: FnOnce(Result<String, LinkError>) + Send + 'static,
    {
        let url = match validate_web_target(url, &self.settings.security) {
            Ok(url) => url,
            Err(err) => return on_done(Err(err)),
        };

        let titles = Arc::clone(&self.titles);
        let timeout = Duration::from_millis(self.settings.timeout);
        let fetch = move || on_done(titles.fetch_title(&url, timeout));

        match &self.runtime {
            Some(runtime) => drop(runtime.spawn_blocking(fetch)),
            None => fetch(),
        }
    }

    /// Build `[title](url)` from the URL on the clipboard. When the title
    /// cannot be fetched the URL doubles as the link text.
    pub fn paste_markdown_link<F>(&self, clipboard: &mut dyn Clipboard, on_done: F)
    where
        F: FnOnce(Result<String, LinkError>) + Send + 'static,
    {
        let url = match clipboard.text() {
            Ok(text) => text.trim().to_string(),
            Err(err) => return on_done(Err(err)),
        };

        if !is_url(&url) {
            return on_done(Err(LinkError::InvalidUrl {
                url,
                reason: "clipboard does not hold a url".to_string(),
            }));
        }

        let link_url = url.clone();
        self.get_title_for_url(&url, move |title| {
            let title = match title {
                Ok(title) => title,
                Err(err @ (LinkError::BlockedHost { .. } | LinkError::InvalidUrl { .. })) => {
                    return on_done(Err(err))
                }
                Err(err) => {
                    warn!("{err}; using the url as link text");
                    link_url.clone()
                }
            };
            on_done(Ok(markdown_link(&title, &link_url)))
        });
    }

    /// Classification of the link under the cursor, for hosts that want to
    /// decide themselves.
    pub fn classify_at_cursor(&self, editor: &dyn EditorBuffer) -> Option<Target> {
        self.resolve_at_cursor(editor)
            .map(|resolved| crate::target::classify(&resolved.target))
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.settings, self.launcher.as_ref())
    }
}

fn move_to(
    editor: &mut dyn EditorBuffer,
    position: Option<CursorPosition>,
) -> Option<CursorPosition> {
    match position {
        Some(position) => {
            editor.set_cursor(position.row, position.col);
            Some(position)
        }
        None => {
            info!("no links in document");
            None
        }
    }
}

/// Log a dispatch result: informational results at info, failures as warnings.
pub fn report(result: Result<Outcome, LinkError>) -> Result<Outcome, LinkError> {
    match &result {
        Ok(outcome) => info!(%outcome, "link followed"),
        Err(err) if err.is_informational() => info!("{err}"),
        Err(err) => warn!("{err}"),
    }
    result
}
