//! Integration tests for the linkfollow public API.
//!
//! Documents live in temp directories; the OS launcher and the network are
//! replaced by local fakes so nothing is actually opened or fetched.

use std::fs;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use url::Url;

use linkfollow::config::{SecurityPolicy, Settings};
use linkfollow::dispatch::{EditorBuffer, Outcome, ProcessLauncher};
use linkfollow::editor::TextBuffer;
use linkfollow::error::LinkError;
use linkfollow::follower::LinkFollower;
use linkfollow::parser::anchor::find_anchor_line;
use linkfollow::parser::{parse_line_at_cursor, CursorPosition};
use linkfollow::target::{classify, Target};
use linkfollow::title::TitleSource;

#[derive(Default)]
struct Launches(Mutex<Vec<String>>);

impl ProcessLauncher for Launches {
    fn launch(&self, command: &str, args: &[String]) -> Result<(), LinkError> {
        self.0.lock().unwrap().push(format!("{command} {}", args.join(" ")));
        Ok(())
    }

    fn open_default(&self, target: &str) -> Result<(), LinkError> {
        self.0.lock().unwrap().push(target.to_string());
        Ok(())
    }
}

struct NoNetwork;

impl TitleSource for NoNetwork {
    fn fetch_title(&self, url: &Url, _timeout: Duration) -> Result<String, LinkError> {
        Err(LinkError::FetchFailed {
            url: url.to_string(),
            reason: "offline".to_string(),
        })
    }
}

/// Helper: a follower with fake collaborators.
fn follower(settings: Settings) -> (LinkFollower, Arc<Launches>) {
    let launches = Arc::new(Launches::default());
    let follower =
        LinkFollower::with_collaborators(Arc::new(settings), launches.clone(), Arc::new(NoNetwork));
    (follower, launches)
}

/// Helper: a directory of Markdown files, returned with its temp handle.
fn notes_dir(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let notes = temp_dir.path().join("notes");
    fs::create_dir(&notes).expect("Failed to create notes directory");
    for (name, content) in files {
        let path = notes.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    (temp_dir, notes)
}

// ============================================================================
// End-to-end resolution
// ============================================================================

#[test]
fn test_anchor_link_resolves_to_heading_line() {
    let document = ["# Intro", "[Link](#intro)"];

    let target = parse_line_at_cursor(&document, CursorPosition::new(1, 2)).unwrap();
    assert_eq!(target, "#intro");

    let Target::Anchor(anchor) = classify(&target) else {
        panic!("expected an anchor target");
    };
    assert_eq!(anchor, "intro");
    assert_eq!(find_anchor_line(&anchor, &document), Some(0));
}

#[test]
fn test_second_url_on_line_is_selected() {
    let document = ["Visit https://a.com and https://b.com"];
    let col = document[0].find("b.com").unwrap();

    assert_eq!(
        parse_line_at_cursor(&document, CursorPosition::new(0, col)).as_deref(),
        Some("https://b.com")
    );
}

#[test]
fn test_private_address_is_web_but_blocked() {
    assert_eq!(classify("http://10.0.0.5"), Target::Web("http://10.0.0.5".into()));

    let (follower, launches) = follower(Settings::default());
    let mut buffer = TextBuffer::with_lines(&["router at http://10.0.0.5 today"]);
    buffer.set_cursor(0, 14);

    let err = follower.handle_uri_at_cursor(&mut buffer).unwrap_err();

    assert!(matches!(err, LinkError::BlockedHost { ref host } if host == "10.0.0.5"));
    assert!(launches.0.lock().unwrap().is_empty(), "nothing should be opened");
}

#[test]
fn test_private_address_allowed_when_blocking_disabled() {
    let settings = Settings {
        security: SecurityPolicy {
            block_local_networks: false,
            ..SecurityPolicy::default()
        },
        ..Settings::default()
    };
    let (follower, launches) = follower(settings);
    let mut buffer = TextBuffer::with_lines(&["http://10.0.0.5"]);

    let outcome = follower.handle_uri_at_cursor(&mut buffer).unwrap();

    assert_eq!(outcome, Outcome::OpenedInBrowser("http://10.0.0.5/".into()));
    assert_eq!(*launches.0.lock().unwrap(), vec!["http://10.0.0.5/".to_string()]);
}

// ============================================================================
// Following links between files
// ============================================================================

#[test]
fn test_reference_link_opens_file_at_anchor() {
    let (_temp_dir, notes) = notes_dir(&[
        (
            "index.md",
            "See the [setup guide][setup] first.\n\n[setup]: guides/setup.md#install\n",
        ),
        ("guides/setup.md", "# Setup\n\nIntro text.\n\n## Install\n\nRun it.\n"),
    ]);
    let (follower, _) = follower(Settings::default());
    let mut buffer = TextBuffer::open(notes.join("index.md")).unwrap();
    buffer.set_cursor(0, 12);

    let outcome = follower.handle_uri_at_cursor(&mut buffer).unwrap();

    assert_eq!(
        outcome,
        Outcome::OpenedInEditor {
            path: notes.join("guides/setup.md"),
            cursor: CursorPosition::new(4, 0),
        }
    );
    assert_eq!(buffer.lines()[4], "## Install");
}

#[test]
fn test_bare_path_with_line_number() {
    let (_temp_dir, notes) = notes_dir(&[
        ("index.md", "todo: check todo.txt:3 later\n"),
        ("todo.txt", "a\nb\nc\nd\n"),
    ]);
    let (follower, _) = follower(Settings::default());
    let mut buffer = TextBuffer::open(notes.join("index.md")).unwrap();
    buffer.set_cursor(0, 15);

    let outcome = follower.handle_uri_at_cursor(&mut buffer).unwrap();

    assert_eq!(
        outcome,
        Outcome::OpenedInEditor {
            path: notes.join("todo.txt"),
            cursor: CursorPosition::new(2, 0),
        }
    );
}

#[test]
fn test_non_text_file_goes_to_the_os() {
    let (_temp_dir, notes) = notes_dir(&[("index.md", "![diagram](img/flow.svg)\n")]);
    let (follower, launches) = follower(Settings::default());
    let mut buffer = TextBuffer::open(notes.join("index.md")).unwrap();
    buffer.set_cursor(0, 3);

    let outcome = follower.handle_uri_at_cursor(&mut buffer).unwrap();

    let expected = notes.join("img/flow.svg");
    assert_eq!(outcome, Outcome::OpenedExternally(expected.clone()));
    assert_eq!(
        *launches.0.lock().unwrap(),
        vec![expected.to_string_lossy().into_owned()]
    );
}

#[test]
fn test_pelican_link_uses_content_dir() {
    let (temp_dir, notes) = notes_dir(&[("posts/new.md", "[About]({filename}/pages/about.md)\n")]);
    fs::create_dir_all(temp_dir.path().join("content/pages")).unwrap();
    fs::write(temp_dir.path().join("content/pages/about.md"), "# About\n").unwrap();
    let settings = Settings {
        pelican_content_dir: Some(temp_dir.path().join("content").to_string_lossy().into_owned()),
        ..Settings::default()
    };
    let (follower, _) = follower(settings);
    let mut buffer = TextBuffer::open(notes.join("posts/new.md")).unwrap();
    buffer.set_cursor(0, 1);

    let outcome = follower.handle_uri_at_cursor(&mut buffer).unwrap();

    assert_eq!(
        outcome,
        Outcome::OpenedInEditor {
            path: temp_dir.path().join("content/pages/about.md"),
            cursor: CursorPosition::new(0, 0),
        }
    );
}

#[test]
fn test_edit_file_with_anchor_creates_missing_file() {
    let (_temp_dir, notes) = notes_dir(&[("index.md", "# Index\n")]);
    let (follower, _) = follower(Settings::default());
    let mut buffer = TextBuffer::open(notes.join("index.md")).unwrap();

    let outcome = follower
        .edit_file_with_anchor("journal/2024/today.md", &mut buffer)
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::OpenedInEditor {
            path: notes.join("journal/2024/today.md"),
            cursor: CursorPosition::new(0, 0),
        }
    );
    assert!(notes.join("journal/2024").is_dir());
}

#[test]
fn test_settings_file_in_project_root() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".linkfollow.toml"),
        "extensions = [\".md\"]\n\n[security]\nallowed_schemes = [\"https\"]\n",
    )
    .unwrap();

    let settings = Settings::new(temp_dir.path()).unwrap();

    assert_eq!(settings.extensions, vec![".md"]);
    assert_eq!(settings.security.allowed_schemes, vec!["https"]);
    assert!(settings.security.block_local_networks);

    let (follower, _) = follower(settings);
    let (tx, rx) = mpsc::channel();
    follower.get_title_for_url("http://example.com", move |result| tx.send(result).unwrap());
    let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(result, Err(LinkError::InvalidUrl { .. })));
    follower.shutdown();
}
