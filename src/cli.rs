//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use batchq_core::{QueueOptions, SelectionOptions};
use clap::{Parser, Subcommand};

/// Queue batches of downloads.
///
/// Candidates are links and media URLs given as arguments or piped on stdin.
/// Each queuing call gets a fresh batch number and the options resolved from
/// flags and the remembered selections.
#[derive(Parser, Debug)]
#[command(name = "batchq")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/batchq/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Database file (overrides the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Queue candidates of the remembered type without asking
    Turbo {
        #[command(flatten)]
        candidates: CandidateArgs,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Queue every candidate with the given options
    Regular {
        #[command(flatten)]
        candidates: CandidateArgs,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Queue one URL
    Single(SingleArgs),
    /// List the downloads of a batch (default: the latest)
    Batch {
        batch: Option<u32>,
    },
    /// Show effective preferences and current selections
    Prefs,
}

/// Candidate sets for the multi-item commands.
#[derive(clap::Args, Debug, Default)]
pub struct CandidateArgs {
    /// Link URLs or text containing them; read from stdin when none are given
    pub inputs: Vec<String>,

    /// Media URL (repeatable)
    #[arg(short, long = "media", value_name = "URL")]
    pub media: Vec<String>,

    /// Referrer recorded with every candidate
    #[arg(long)]
    pub referrer: Option<String>,
}

/// Options the non-interactive selector answers with.
#[derive(clap::Args, Debug, Default)]
pub struct SelectionArgs {
    /// Renaming mask
    #[arg(long)]
    pub mask: Option<String>,

    /// Subfolder below the download directory
    #[arg(long)]
    pub subfolder: Option<String>,

    /// Server id
    #[arg(long)]
    pub server: Option<String>,

    /// Fast filter expression
    #[arg(long)]
    pub fast: Option<String>,

    /// Use the options for this call only, without remembering them
    #[arg(long)]
    pub once: bool,

    /// Add downloads paused
    #[arg(long)]
    pub paused: bool,

    /// Send cookies with the downloads
    #[arg(long)]
    pub cookies: bool,

    /// Candidate set to remember for turbo
    #[arg(long = "type", value_parser = ["links", "media"])]
    pub item_type: Option<String>,
}

impl SelectionArgs {
    pub fn options(&self) -> SelectionOptions {
        SelectionOptions {
            queue: QueueOptions {
                mask: self.mask.clone(),
                subfolder: self.subfolder.clone(),
                server: self.server.clone(),
                paused: Some(self.paused),
                cookies: Some(self.cookies),
            },
            mask_once: self.once,
            subfolder_once: self.once,
            server_once: self.once,
            fast_once: self.once,
            fast: self.fast.clone().map(serde_json::Value::String),
            item_type: self.item_type.clone(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct SingleArgs {
    /// URL to queue
    pub url: Option<String>,

    /// Go through selection instead of queuing directly
    #[arg(long)]
    pub edit: bool,

    /// URL for a new blank item when no URL is given
    #[arg(long, requires = "edit", value_name = "URL")]
    pub blank: Option<String>,

    /// Treat the URL as media
    #[arg(long)]
    pub as_media: bool,

    /// Referrer recorded with the item
    #[arg(long)]
    pub referrer: Option<String>,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_turbo_with_links_and_media() {
        let args = Args::try_parse_from([
            "batchq",
            "turbo",
            "https://example.com/a.zip",
            "-m",
            "https://example.com/b.png",
            "--media",
            "https://example.com/c.png",
        ])
        .unwrap();
        let Command::Turbo { candidates, .. } = args.command else {
            panic!("expected turbo");
        };
        assert_eq!(candidates.inputs, vec!["https://example.com/a.zip"]);
        assert_eq!(candidates.media.len(), 2);
    }

    #[test]
    fn test_cli_verbose_flag_is_global() {
        let args = Args::try_parse_from(["batchq", "prefs", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
        let args = Args::try_parse_from(["batchq", "-q", "prefs"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_subcommand_required() {
        assert!(Args::try_parse_from(["batchq"]).is_err());
        assert!(Args::try_parse_from(["batchq", "-v"]).is_err());
    }

    #[test]
    fn test_cli_type_only_accepts_known_sets() {
        assert!(Args::try_parse_from(["batchq", "regular", "--type", "media"]).is_ok());
        let err = Args::try_parse_from(["batchq", "regular", "--type", "videos"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_cli_blank_requires_edit() {
        let result = Args::try_parse_from(["batchq", "single", "--blank", "https://e.com/x"]);
        assert!(result.is_err());
        assert!(
            Args::try_parse_from(["batchq", "single", "--edit", "--blank", "https://e.com/x"])
                .is_ok()
        );
    }

    #[test]
    fn test_selection_args_once_suppresses_every_stack() {
        let args = SelectionArgs {
            mask: Some("*name*.*ext*".to_string()),
            fast: Some("*.zip".to_string()),
            once: true,
            ..SelectionArgs::default()
        };
        let options = args.options();
        assert!(options.mask_once && options.subfolder_once && options.server_once);
        assert!(options.fast_once);
        assert_eq!(options.fast_text(), Some("*.zip"));
        assert_eq!(options.queue.paused, Some(false));
    }
}
