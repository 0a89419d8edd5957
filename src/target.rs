//! Classifying a resolved link destination.
//!
//! | Destination | Variant |
//! |-------------|---------|
//! | `#intro` | [`Target::Anchor`] (`intro`) |
//! | `https://example.com` | [`Target::Web`] |
//! | `{filename}/posts/a.md` | [`Target::Pelican`] |
//! | `notes.md:42#intro` | [`Target::File`] |

use std::borrow::Cow;

use serde::Serialize;

use crate::parser::url::is_url;

/// Pelican's intra-site link prefixes.
const PELICAN_PREFIXES: [&str; 6] = [
    "{filename}",
    "|filename|",
    "{static}",
    "|static|",
    "{attach}",
    "|attach|",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Target {
    /// Heading slug or custom id in the current document, without the `#`
    Anchor(String),
    Web(String),
    /// A file path written with a Pelican prefix, prefix removed
    Pelican(FileTarget),
    File(FileTarget),
}

/// `path[:line][#anchor]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileTarget {
    pub path: String,
    /// 1-based, never 0
    pub line: Option<usize>,
    pub anchor: Option<String>,
}

impl Target {
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Anchor(_) => "anchor",
            Target::Web(_) => "web",
            Target::Pelican(_) => "pelican",
            Target::File(_) => "file",
        }
    }
}

/// Classify a destination. Anchors beat URLs, URLs beat Pelican prefixes,
/// and everything else is a file.
pub fn classify(target: &str) -> Target {
    let target = target.trim();

    if let Some(anchor) = target.strip_prefix('#') {
        return Target::Anchor(anchor.to_string());
    }

    if is_url(target) {
        return Target::Web(target.to_string());
    }

    if let Some(rest) = PELICAN_PREFIXES
        .iter()
        .find_map(|prefix| target.strip_prefix(prefix))
    {
        return Target::Pelican(parse_file_target(rest));
    }

    Target::File(parse_file_target(target))
}

/// Split `path[:line][#anchor]`.
///
/// A `file://` prefix is dropped and the path is percent-decoded. The line
/// suffix may sit on either side of the anchor (`a.md:3#x`, `a.md#x:3`);
/// `:0` is stripped but yields no line.
pub fn parse_file_target(target: &str) -> FileTarget {
    let target = target.strip_prefix("file://").unwrap_or(target);

    let (rest, mut line) = split_line_suffix(target);

    let (rest, anchor) = match rest.rsplit_once('#') {
        Some((path, anchor)) => (path, Some(anchor).filter(|a| !a.is_empty())),
        None => (rest, None),
    };

    let rest = match line {
        Some(_) => rest,
        None => {
            let (rest, found) = split_line_suffix(rest);
            line = found;
            rest
        }
    };

    let path = urlencoding::decode(rest)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| rest.to_string());

    FileTarget {
        path,
        line,
        anchor: anchor.map(String::from),
    }
}

fn split_line_suffix(s: &str) -> (&str, Option<usize>) {
    match s.rsplit_once(':') {
        Some((head, digits))
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            (head, digits.parse::<usize>().ok().filter(|line| *line > 0))
        }
        _ => (s, None),
    }
}
