//! Acting on a classified link.
//!
//! The dispatcher owns no I/O of its own beyond creating parent directories
//! for a file about to be opened; the editor and the OS are reached through
//! the [`EditorBuffer`] and [`ProcessLauncher`] collaborators.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Settings;
use crate::error::LinkError;
use crate::parser::anchor::find_anchor_line;
use crate::parser::CursorPosition;
use crate::security::validate_web_target;
use crate::target::{classify, FileTarget, Target};

/// The host editor, as far as link following needs it.
pub trait EditorBuffer {
    /// Lines of the current document.
    fn lines(&self) -> Vec<String>;
    fn cursor(&self) -> CursorPosition;
    fn set_cursor(&mut self, row: usize, col: usize);
    /// Make `path` the current document. The file may not exist yet.
    fn open_in_new_view(&mut self, path: &Path) -> Result<(), LinkError>;
    /// On-disk location of the current document, if it has one.
    fn current_path(&self) -> Option<PathBuf>;
}

/// Starts external programs without waiting for them.
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, command: &str, args: &[String]) -> Result<(), LinkError>;
    /// Hand `target` (path or URL) to the OS default application.
    fn open_default(&self, target: &str) -> Result<(), LinkError>;
}

/// What to do with the destination under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NoOp,
    Anchor(String),
    Web(String),
    File(FileTarget),
    Pelican(FileTarget),
}

impl Action {
    pub fn select(resolved: Option<&str>) -> Action {
        match resolved {
            Some(target) => classify(target).into(),
            None => Action::NoOp,
        }
    }
}

impl From<Target> for Action {
    fn from(target: Target) -> Self {
        match target {
            Target::Anchor(anchor) => Action::Anchor(anchor),
            Target::Web(url) => Action::Web(url),
            Target::Pelican(file) => Action::Pelican(file),
            Target::File(file) => Action::File(file),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Cursor moved within the current document
    MovedCursor(CursorPosition),
    OpenedInEditor { path: PathBuf, cursor: CursorPosition },
    OpenedExternally(PathBuf),
    OpenedInBrowser(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::MovedCursor(cursor) => write!(f, "{}:{}", cursor.row + 1, cursor.col + 1),
            Outcome::OpenedInEditor { path, cursor } => {
                write!(f, "{}:{}:{}", path.display(), cursor.row + 1, cursor.col + 1)
            }
            Outcome::OpenedExternally(path) => write!(f, "opened {}", path.display()),
            Outcome::OpenedInBrowser(url) => write!(f, "opened {url}"),
        }
    }
}

pub struct Dispatcher<'a> {
    settings: &'a Settings,
    launcher: &'a dyn ProcessLauncher,
}

impl<'a> Dispatcher<'a> {
    pub fn new(settings: &'a Settings, launcher: &'a dyn ProcessLauncher) -> Dispatcher<'a> {
        Dispatcher { settings, launcher }
    }

    pub fn dispatch(
        &self,
        action: Action,
        editor: &mut dyn EditorBuffer,
    ) -> Result<Outcome, LinkError> {
        match action {
            Action::NoOp => Err(LinkError::NoLinkAtCursor),
            Action::Anchor(anchor) => jump_to_anchor(editor, &anchor),
            Action::Web(url) => self.open_web(&url),
            Action::File(file) => self.open_file(&file, false, editor),
            Action::Pelican(file) => self.open_file(&file, true, editor),
        }
    }

    fn open_web(&self, raw: &str) -> Result<Outcome, LinkError> {
        let url = validate_web_target(raw, &self.settings.security)?;

        match self.settings.browser_cmd.as_deref().map(str::trim) {
            Some(command_line) if !command_line.is_empty() => {
                let mut parts = command_line.split_whitespace();
                let command = parts.next().unwrap_or(command_line);
                let args: Vec<String> = parts
                    .map(String::from)
                    .chain(std::iter::once(url.to_string()))
                    .collect();
                self.launcher.launch(command, &args)?;
            }
            _ => self.launcher.open_default(url.as_str())?,
        }

        info!(%url, "opened in browser");
        Ok(Outcome::OpenedInBrowser(url.to_string()))
    }

    fn open_file(
        &self,
        file: &FileTarget,
        pelican: bool,
        editor: &mut dyn EditorBuffer,
    ) -> Result<Outcome, LinkError> {
        // `#anchor` with no path, e.g. from edit-file-with-anchor
        if file.path.is_empty() {
            return match &file.anchor {
                Some(anchor) => jump_to_anchor(editor, anchor),
                None => Err(LinkError::NoLinkAtCursor),
            };
        }

        let base_dir = editor
            .current_path()
            .and_then(|current| current.parent().map(Path::to_path_buf));
        let path = self.resolve_path(&file.path, base_dir.as_deref(), pelican);

        if !self.settings.opens_in_editor(&path) {
            self.launcher.open_default(&path.to_string_lossy())?;
            info!(path = %path.display(), "opened with system handler");
            return Ok(Outcome::OpenedExternally(path));
        }

        open_in_editor(editor, path, file)
    }

    /// Expand `~` and `$VARS`, then anchor relative paths at the current
    /// document's directory. Pelican paths starting with `/` are relative to
    /// the configured content directory when there is one.
    pub fn resolve_path(&self, raw: &str, base_dir: Option<&Path>, pelican: bool) -> PathBuf {
        let expanded = shellexpand::full(raw)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| raw.to_string());

        if pelican {
            if let Some(site_relative) = expanded.strip_prefix('/') {
                let root = self
                    .settings
                    .pelican_content_dir
                    .as_deref()
                    .map(|dir| PathBuf::from(shellexpand::tilde(dir).as_ref()))
                    .or_else(|| base_dir.map(Path::to_path_buf));
                return match root {
                    Some(root) => root.join(site_relative),
                    None => PathBuf::from(site_relative),
                };
            }
        }

        let path = PathBuf::from(expanded);
        match base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

fn jump_to_anchor(editor: &mut dyn EditorBuffer, anchor: &str) -> Result<Outcome, LinkError> {
    let lines = editor.lines();
    let row = find_anchor_line(anchor, &lines).ok_or_else(|| LinkError::AnchorNotFound {
        anchor: anchor.trim_start_matches('#').to_string(),
    })?;

    editor.set_cursor(row, 0);
    info!(anchor, row, "jumped to anchor");
    Ok(Outcome::MovedCursor(CursorPosition::new(row, 0)))
}

fn open_in_editor(
    editor: &mut dyn EditorBuffer,
    path: PathBuf,
    file: &FileTarget,
) -> Result<Outcome, LinkError> {
    if !path.exists() {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LinkError::FileNotReadable {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    editor.open_in_new_view(&path)?;
    info!(path = %path.display(), "opened in editor");

    if let Some(line) = file.line {
        editor.set_cursor(line - 1, 0);
    }

    if let Some(anchor) = &file.anchor {
        jump_to_anchor(editor, anchor)?;
    }

    Ok(Outcome::OpenedInEditor {
        path,
        cursor: editor.cursor(),
    })
}
