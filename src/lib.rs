//! linkfollow: follow the Markdown link under the cursor
//!
//! Given the lines of a document and a cursor, linkfollow works out which
//! link the cursor is on and what to do with it: jump to a heading, open a
//! file in the editor at a line or anchor, hand a file to the OS, or open a
//! URL in the browser after checking it is safe to contact.
//!
//! # Architecture
//!
//! - [`parser`]: pure link-at-cursor resolution (inline, reference, URL,
//!   definition line, bare path), anchors and link navigation
//! - [`target`]: classification of a destination into anchor/web/pelican/file
//! - [`dispatch`]: one handler per classified target, talking to the host
//!   through the [`dispatch::EditorBuffer`] and [`dispatch::ProcessLauncher`] traits
//! - [`security`] and [`title`]: URL validation and page title fetching
//! - [`follower`]: the command surface with its initialize/shutdown lifecycle
//! - [`config`]: Configuration management and settings
//!
//! ```ignore
//! use std::sync::Arc;
//! use linkfollow::config::Settings;
//! use linkfollow::editor::TextBuffer;
//! use linkfollow::follower::LinkFollower;
//!
//! let follower = LinkFollower::initialize(Arc::new(Settings::default()));
//! let mut buffer = TextBuffer::open("README.md")?;
//! follower.handle_uri_at_cursor(&mut buffer)?;
//! follower.shutdown();
//! ```

// Parsing core
pub mod parser;
pub mod target;

// Acting on links
pub mod dispatch;
pub mod editor;
pub mod follower;
pub mod launcher;
pub mod security;
pub mod title;

// Configuration and plumbing
pub mod config;
pub mod error;
pub mod logging;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
