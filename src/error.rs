//! Error kinds surfaced by the dispatch layer.
//!
//! Parsing never fails: a cursor that is not on a link produces `None`, which
//! the command layer turns into [`LinkError::NoLinkAtCursor`] purely so it can
//! be reported. Everything else here is recovered at the dispatch boundary and
//! shown to the user as a warning.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("refusing to contact local network host `{host}`")]
    BlockedHost { host: String },

    #[error("fetching `{url}` failed: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("no <title> found at `{url}`")]
    NoTitleFound { url: String },

    #[error("anchor `#{anchor}` not found")]
    AnchorNotFound { anchor: String },

    #[error("cannot read {}: {source}", path.display())]
    FileNotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no link at cursor")]
    NoLinkAtCursor,

    #[error("failed to launch `{command}`: {reason}")]
    LaunchFailed { command: String, reason: String },

    #[error("clipboard unavailable: {reason}")]
    Clipboard { reason: String },
}

impl LinkError {
    /// `true` for outcomes that are not failures and should be reported at
    /// info level rather than as a warning.
    pub fn is_informational(&self) -> bool {
        matches!(self, LinkError::NoLinkAtCursor)
    }
}
