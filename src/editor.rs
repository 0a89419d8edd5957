//! An in-memory document with a cursor, used by the command line front end
//! in place of a real editor view.

use std::fs;
use std::path::{Path, PathBuf};

use ropey::Rope;

use crate::dispatch::EditorBuffer;
use crate::error::LinkError;
use crate::parser::CursorPosition;

#[derive(Debug)]
pub struct TextBuffer {
    rope: Rope,
    path: Option<PathBuf>,
    cursor: CursorPosition,
}

impl Default for TextBuffer {
    fn default() -> Self {
        TextBuffer {
            rope: Rope::new(),
            path: None,
            cursor: CursorPosition::default(),
        }
    }
}

impl TextBuffer {
    /// Load `path`. A file that does not exist yet is an empty document.
    pub fn open(path: impl Into<PathBuf>) -> Result<TextBuffer, LinkError> {
        let path = path.into();
        let rope = read_rope(&path)?;
        Ok(TextBuffer {
            rope,
            path: Some(path),
            cursor: CursorPosition::default(),
        })
    }

    /// Unsaved document with the given lines.
    pub fn with_lines<S: AsRef<str>>(lines: &[S]) -> TextBuffer {
        TextBuffer {
            rope: Rope::from_str(&join_lines(lines)),
            ..TextBuffer::default()
        }
    }

    /// Document at `path` whose contents are `lines`, not read from disk.
    pub fn at_path<S: AsRef<str>>(path: impl Into<PathBuf>, lines: &[S]) -> TextBuffer {
        TextBuffer {
            path: Some(path.into()),
            ..TextBuffer::with_lines(lines)
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Insert `text` at the cursor and move the cursor past it.
    pub fn insert_at_cursor(&mut self, text: &str) {
        let line_idx = self.cursor.row.min(self.rope.len_lines().saturating_sub(1));
        let line_start = self.rope.line_to_byte(line_idx);
        let line_len = self.rope.line(line_idx).len_bytes();
        let byte_idx = line_start + self.cursor.col.min(line_len);

        let char_idx = self.rope.byte_to_char(byte_idx);
        self.rope.insert(char_idx, text);

        let end_char = char_idx + text.chars().count();
        let row = self.rope.char_to_line(end_char);
        let col = self.rope.char_to_byte(end_char) - self.rope.line_to_byte(row);
        self.cursor = CursorPosition::new(row, col);
    }
}

impl EditorBuffer for TextBuffer {
    fn lines(&self) -> Vec<String> {
        self.text().lines().map(String::from).collect()
    }

    fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    /// Rows past the end land on the last line.
    fn set_cursor(&mut self, row: usize, col: usize) {
        let last_row = self.lines().len().saturating_sub(1);
        self.cursor = CursorPosition::new(row.min(last_row), col);
    }

    fn open_in_new_view(&mut self, path: &Path) -> Result<(), LinkError> {
        self.rope = read_rope(path)?;
        self.path = Some(path.to_path_buf());
        self.cursor = CursorPosition::default();
        Ok(())
    }

    fn current_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }
}

fn read_rope(path: &Path) -> Result<Rope, LinkError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Rope::from_str(&text)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Rope::new()),
        Err(source) => Err(LinkError::FileNotReadable {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n")
}
