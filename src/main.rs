//! CLI entry point for batchq.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use batchq_core::{
    CandidateItem, Collaborators, Database, DownloadQueue, ExtensionFilter, ItemKind, Outcome,
    PresetSelector, Prefs, QueueEngine, SelectionState, SqlitePrefs, TracingNotifier,
    parse_candidates,
};
use clap::Parser;
use serde_json::json;
use tracing::{debug, info, warn};

mod cli;
mod config;

use cli::{Args, CandidateArgs, Command, SelectionArgs, SingleArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    let file_config = config::load(args.config.as_deref());

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config file > info
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => file_config
                .as_ref()
                .ok()
                .and_then(|cfg| cfg.verbosity)
                .map_or("info", |verbosity| verbosity.filter()),
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let file_config = file_config?;
    debug!(?args, ?file_config, "configuration loaded");

    let db_path = args
        .db
        .clone()
        .or_else(|| file_config.database.clone())
        .unwrap_or_else(config::default_database_path);
    let db = open_database(db_path).await?;

    let prefs = Prefs::with_defaults(
        Arc::new(SqlitePrefs::new(db.clone())),
        file_config.pref_defaults(),
    );
    let stack_limit = file_config
        .stack_limit
        .unwrap_or(batchq_core::DEFAULT_STACK_LIMIT);
    let selection = SelectionState::recent(&prefs, stack_limit);
    let queue = DownloadQueue::new(db.clone());

    let result = run(args.command, prefs, selection, &queue).await;
    db.close().await;
    result
}

async fn open_database(path: PathBuf) -> Result<Database> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    info!(path = %path.display(), "opening queue database");
    Database::new(&path)
        .await
        .with_context(|| format!("Failed to open database '{}'", path.display()))
}

fn engine(
    prefs: Prefs,
    selection: SelectionState,
    queue: &DownloadQueue,
    selector: PresetSelector,
) -> QueueEngine {
    QueueEngine::new(
        prefs,
        selection,
        Collaborators {
            filter: Arc::new(ExtensionFilter::default()),
            selector: Arc::new(selector),
            manager: Arc::new(queue.clone()),
            notifier: Arc::new(TracingNotifier),
            window: None,
        },
    )
}

async fn run(
    command: Command,
    prefs: Prefs,
    selection: SelectionState,
    queue: &DownloadQueue,
) -> Result<()> {
    match command {
        Command::Turbo {
            candidates,
            selection: flags,
        } => {
            let (links, media) = read_candidates(&candidates)?;
            let engine = engine(prefs, selection, queue, preset(&flags));
            report(&engine.turbo(links, media).await?);
        }
        Command::Regular {
            candidates,
            selection: flags,
        } => {
            let (links, media) = read_candidates(&candidates)?;
            let engine = engine(prefs, selection, queue, preset(&flags));
            report(&engine.regular(links, media).await?);
        }
        Command::Single(single) => run_single(single, prefs, selection, queue).await?,
        Command::Batch { batch } => list_batch(queue, batch).await?,
        Command::Prefs => show_prefs(&prefs, &selection).await?,
    }
    Ok(())
}

fn preset(flags: &SelectionArgs) -> PresetSelector {
    PresetSelector::new(flags.options())
}

async fn run_single(
    single: SingleArgs,
    prefs: Prefs,
    selection: SelectionState,
    queue: &DownloadQueue,
) -> Result<()> {
    let item = single.url.as_deref().map(|url| {
        let item = if single.as_media {
            CandidateItem::media(url)
        } else {
            CandidateItem::link(url)
        };
        match &single.referrer {
            Some(referrer) => item.with_referrer(referrer.clone()),
            None => item,
        }
    });

    let mut selector = preset(&single.selection);
    if let Some(blank) = &single.blank {
        selector = selector.with_blank_url(blank.clone());
    }
    let engine = engine(prefs, selection, queue, selector);

    let outcome = match (item, single.edit) {
        (item, true) => engine.single_regular(item).await?,
        (Some(item), false) => engine.single_turbo(item).await?,
        (None, false) => bail!("A URL is required unless --edit is given"),
    };
    report(&outcome);
    Ok(())
}

/// Links and media from the arguments, or links from stdin when none were given.
fn read_candidates(args: &CandidateArgs) -> Result<(Vec<CandidateItem>, Vec<CandidateItem>)> {
    let link_text = if !args.inputs.is_empty() || !args.media.is_empty() {
        args.inputs.join("\n")
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        buffer
    } else {
        String::new()
    };

    let links = parse(&link_text, ItemKind::Link, args.referrer.as_deref());
    let media = parse(&args.media.join("\n"), ItemKind::Media, args.referrer.as_deref());
    info!(links = links.len(), media = media.len(), "candidates read");
    Ok((links, media))
}

fn parse(text: &str, kind: ItemKind, referrer: Option<&str>) -> Vec<CandidateItem> {
    let parsed = parse_candidates(text, kind);
    for line in &parsed.skipped {
        warn!(line = %line, "no URL found");
    }
    for error in &parsed.invalid {
        warn!(%error, "skipping invalid URL");
    }
    parsed
        .items
        .into_iter()
        .map(|item| match referrer {
            Some(referrer) => item.with_referrer(referrer),
            None => item,
        })
        .collect()
}

fn report(outcome: &Outcome) {
    match outcome.summary() {
        None => println!("nothing queued: no links or media found"),
        Some(summary) => match summary.batch {
            Some(batch) => println!(
                "queued {} download(s) in batch {batch} (mask {}, subfolder '{}')",
                summary.count, summary.resolved.mask, summary.resolved.subfolder
            ),
            None => println!("nothing queued: selection was empty"),
        },
    }
}

async fn list_batch(queue: &DownloadQueue, batch: Option<u32>) -> Result<()> {
    let batch = match batch {
        Some(batch) => batch,
        None => match queue.latest_batch().await? {
            Some(batch) => batch,
            None => {
                println!("no downloads queued yet");
                return Ok(());
            }
        },
    };
    let rows = queue.list_batch(batch).await?;
    println!("batch {batch}: {} download(s)", rows.len());
    for row in rows {
        let state = if row.paused { "paused" } else { "queued" };
        println!("{:>4}  {state:<6}  {}  {}", row.idx, row.url, row.mask);
    }
    Ok(())
}

async fn show_prefs(prefs: &Prefs, selection: &SelectionState) -> Result<()> {
    let mut current = serde_json::Map::new();
    for (name, stack) in [
        ("mask", selection.mask()),
        ("subfolder", selection.subfolder()),
        ("server", selection.server()),
        ("fastfilter", selection.fast_filter()),
    ] {
        stack.init().await?;
        current.insert(name.to_string(), json!(stack.current().await?));
    }
    let shown = json!({
        "currentBatch": prefs.current_batch().await?,
        "lastType": prefs.last_type().await?,
        "addPaused": prefs.add_paused().await?,
        "queueNotification": prefs.queue_notification().await?,
        "openManagerOnQueue": prefs.open_manager_on_queue().await?,
        "current": current,
    });
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}
