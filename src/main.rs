use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{mpsc, Arc};

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use serde_json::json;

use linkfollow::config::Settings;
use linkfollow::dispatch::{EditorBuffer, Outcome};
use linkfollow::editor::TextBuffer;
use linkfollow::error::LinkError;
use linkfollow::follower::{Clipboard, LinkFollower};
use linkfollow::logging;
use linkfollow::parser::CursorPosition;
use linkfollow::target::classify;

#[derive(Parser)]
#[command(name = "linkfollow", version, about = "Follow the Markdown link under the cursor")]
struct Cli {
    /// Overrides the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// A file and a 1-based cursor position in it.
#[derive(Args)]
struct At {
    file: PathBuf,
    /// 1-based line
    row: usize,
    /// 1-based byte column
    col: usize,
}

impl At {
    fn buffer(&self) -> anyhow::Result<TextBuffer> {
        let mut buffer = TextBuffer::open(&self.file)?;
        buffer.set_cursor(self.row.saturating_sub(1), self.col.saturating_sub(1));
        Ok(buffer)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the link target under the cursor and how it classifies
    Resolve {
        #[command(flatten)]
        at: At,
        #[arg(long)]
        json: bool,
    },
    /// Follow the link under the cursor
    Follow {
        #[command(flatten)]
        at: At,
    },
    /// Fetch the title of a web page
    Title { url: String },
    /// Turn the URL on the clipboard into `[title](url)`
    PasteLink,
    /// Print the position of the next link
    NextLink {
        #[command(flatten)]
        at: At,
    },
    /// Print the position of the previous link
    PrevLink {
        #[command(flatten)]
        at: At,
    },
    /// Open `path[:line][#anchor]`
    Edit {
        target: String,
        /// Document the target is relative to
        #[arg(long)]
        from: Option<PathBuf>,
    },
}

struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn text(&mut self) -> Result<String, LinkError> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.get_text())
            .map_err(|err| LinkError::Clipboard {
                reason: err.to_string(),
            })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match std::env::current_dir()
        .context("no current directory")
        .and_then(|root| Settings::new(&root))
    {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(cli.log_level.as_deref().unwrap_or(&settings.log_level));

    let follower = LinkFollower::initialize(Arc::new(settings));
    let code = match run(&follower, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    };
    follower.shutdown();

    code
}

fn run(follower: &LinkFollower, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Resolve { at, json } => {
            let buffer = at.buffer()?;
            let Some(resolved) = follower.resolve_at_cursor(&buffer) else {
                return no_link(json);
            };
            let target = classify(&resolved.target);
            if json {
                let value = json!({
                    "target": resolved.target,
                    "strategy": resolved.strategy,
                    "classified": target,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}\t{}", target.kind(), resolved.target);
            }
            Ok(())
        }
        Commands::Follow { at } => {
            let mut buffer = at.buffer()?;
            print_outcome(follower.handle_uri_at_cursor(&mut buffer))
        }
        Commands::Title { url } => {
            let (tx, rx) = mpsc::channel();
            follower.get_title_for_url(&url, move |result| {
                let _ = tx.send(result);
            });
            let title = rx.recv().map_err(|_| anyhow!("title fetch was dropped"))??;
            println!("{title}");
            Ok(())
        }
        Commands::PasteLink => {
            let (tx, rx) = mpsc::channel();
            follower.paste_markdown_link(&mut SystemClipboard, move |result| {
                let _ = tx.send(result);
            });
            let link = rx.recv().map_err(|_| anyhow!("title fetch was dropped"))??;
            println!("{link}");
            Ok(())
        }
        Commands::NextLink { at } => {
            let mut buffer = at.buffer()?;
            print_position(follower.find_next_link(&mut buffer))
        }
        Commands::PrevLink { at } => {
            let mut buffer = at.buffer()?;
            print_position(follower.find_previous_link(&mut buffer))
        }
        Commands::Edit { target, from } => {
            let mut buffer = match from {
                Some(path) => TextBuffer::open(path)?,
                None => TextBuffer::default(),
            };
            print_outcome(follower.edit_file_with_anchor(&target, &mut buffer))
        }
    }
}

fn no_link(json: bool) -> anyhow::Result<()> {
    if json {
        println!("null");
    }
    Ok(())
}

/// Dispatch results are already logged; informational ones are not failures.
fn print_outcome(result: Result<Outcome, LinkError>) -> anyhow::Result<()> {
    match result {
        Ok(outcome) => {
            println!("{outcome}");
            Ok(())
        }
        Err(err) if err.is_informational() => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn print_position(position: Option<CursorPosition>) -> anyhow::Result<()> {
    if let Some(position) = position {
        println!("{}:{}", position.row + 1, position.col + 1);
    }
    Ok(())
}
