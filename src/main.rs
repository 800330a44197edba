//! gossip - inline git blame and commit-anchored comments
//!
//! # Usage
//! ```bash
//! gossip blame src/lib.rs                    # Per-line attribution
//! gossip permalink src/lib.rs -L 10:20       # HEAD-anchored permalink
//! gossip comment add src/lib.rs -L 10 -m ".."# Attach a comment
//! gossip comment list src/lib.rs             # Comments still anchored
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_gossip::git::format_relative_time;
use git_gossip::{gossip, BlameCache, CommentStore, GitRepository, LineRange, RepositoryGateway};

/// Inline git blame and durable review comments, without a server
#[derive(Parser)]
#[command(name = "gossip")]
#[command(about = "Inline git blame and commit-anchored gossip comments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-line commit attribution for a file's current content
    Blame {
        file: PathBuf,

        /// Emit records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print a permalink for a file at HEAD
    Permalink {
        file: PathBuf,

        /// Line or range, e.g. 10 or 10:20
        #[arg(short = 'L', long = "lines", value_parser = parse_range)]
        lines: Option<LineRange>,
    },
    /// Manage gossip comments
    #[command(subcommand)]
    Comment(CommentCommands),
}

#[derive(Subcommand)]
enum CommentCommands {
    /// Attach a comment to a line range, anchored at the file's last commit
    Add {
        file: PathBuf,

        /// Line or range, e.g. 10 or 10:20
        #[arg(short = 'L', long = "lines", value_parser = parse_range)]
        lines: LineRange,

        /// Comment body; read from stdin when omitted
        #[arg(short, long)]
        message: Option<String>,
    },
    /// List comments still anchored to the file's commit history
    List {
        file: PathBuf,

        /// Emit comments as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_range(arg: &str) -> Result<LineRange, String> {
    let parse = |s: &str| {
        s.parse::<u32>()
            .map_err(|_| format!("not a line number: {s}"))
    };
    match arg.split_once(':') {
        Some((start, end)) => Ok(LineRange::new(parse(start)?, parse(end)?)),
        None => Ok(LineRange::single(parse(arg)?)),
    }
}

fn open_repo(file: &Path) -> anyhow::Result<GitRepository> {
    let start = file.parent().filter(|p| !p.as_os_str().is_empty());
    GitRepository::discover(start.unwrap_or_else(|| Path::new(".")))
        .with_context(|| format!("no git repository around {}", file.display()))
}

fn cmd_blame(file: &Path, json: bool) -> anyhow::Result<()> {
    let gateway = open_repo(file)?;
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;

    let mut cache = BlameCache::new();
    let records = cache.get(&gateway, 0, file, &text)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&*records)?);
        return Ok(());
    }
    for record in records.iter() {
        println!(
            "{:>4}  {:>10.10}  {:<24}  {:<14}  {}",
            record.line_number,
            record.commit_id,
            record.author_email,
            format_relative_time(record.timestamp.timestamp()),
            record.line_text,
        );
    }
    Ok(())
}

fn cmd_permalink(file: &Path, lines: Option<LineRange>) -> anyhow::Result<()> {
    let gateway = open_repo(file)?;
    let permalink = gossip::permalink_at_head(&gateway, file, lines)?;
    println!("{permalink}");
    Ok(())
}

fn cmd_comment_add(file: &Path, lines: LineRange, message: Option<String>) -> anyhow::Result<()> {
    let gateway = open_repo(file)?;
    let store = CommentStore::at(&gateway.repository_root()?);

    let body = match message {
        Some(body) => body,
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("reading comment body from stdin")?;
            body
        }
    };

    let (permalink, stored) = gossip::add_comment(&gateway, &store, file, lines, &body)?;
    println!("{permalink}");
    println!("stored at {}", stored.display());
    Ok(())
}

fn cmd_comment_list(file: &Path, json: bool) -> anyhow::Result<()> {
    let gateway = open_repo(file)?;
    let store = CommentStore::at(&gateway.repository_root()?);
    let comments = gossip::list_comments(&gateway, &store, file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comments)?);
        return Ok(());
    }
    if comments.is_empty() {
        println!("no comments for {}", file.display());
        return Ok(());
    }
    for comment in &comments {
        println!("{}", comment.permalink);
        for line in comment.body.lines() {
            println!("    {line}");
        }
        println!();
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Blame { file, json } => cmd_blame(&file, json),
        Commands::Permalink { file, lines } => cmd_permalink(&file, lines),
        Commands::Comment(CommentCommands::Add {
            file,
            lines,
            message,
        }) => cmd_comment_add(&file, lines, message),
        Commands::Comment(CommentCommands::List { file, json }) => cmd_comment_list(&file, json),
    }
}
