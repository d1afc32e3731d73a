//! bundle-channel: set the channel of charms in deployment bundles.
#![allow(clippy::multiple_crate_versions)]

use bundle_channel::bundle::{self, WriteMode};
use bundle_channel::stale::{self, ReleaseQuery, SystemRunner};
use bundle_channel::{charms, config, input, Channel, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "bundle-channel", version)]
#[command(about = "Set the charmhub channel of charms in deployment bundles", long_about = None)]
struct Cli {
    /// Log debug information, including rewritten bundles
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Change or add the juju channel to the bundles for the charm
    Set(SetArgs),
    /// Print charms whose branch has commits newer than the released revision
    Stale(StaleArgs),
}

#[derive(Args)]
struct SetArgs {
    /// Charm checkout whose bundles are edited
    charm: String,

    /// Channel to set: stable, candidate, beta or edge
    channel: Channel,

    /// File listing the charms to set the channel for
    #[arg(long, value_name = "FILE")]
    charms_file: Option<PathBuf>,

    /// Directory containing charm checkouts
    #[arg(long, value_name = "DIR")]
    charms_root: Option<PathBuf>,

    /// Bundle file suffixes to match
    #[arg(long, short = 'e', value_name = "SUFFIX")]
    ext: Vec<String>,

    /// Report the edits without writing any bundle
    #[arg(long)]
    dry_run: bool,

    /// Print the edit plan as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct StaleArgs {
    /// Charm name (e.g., ceph-mon)
    #[arg(long)]
    charm_name: Option<String>,

    /// Directory containing multiple charm repositories
    #[arg(long, value_name = "DIR")]
    charm_dir: Option<PathBuf>,

    /// Track (e.g., squid)
    #[arg(long)]
    track: String,

    /// Base channel (e.g., 22.04)
    #[arg(long)]
    base_channel: String,

    /// Architecture (e.g., amd64)
    #[arg(long)]
    architecture: String,

    /// Channel (e.g., squid/candidate)
    #[arg(long)]
    channel: String,

    /// Branch (e.g., stable/squid-jammy)
    #[arg(long)]
    branch: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Command::Set(args) => run_set(args),
        Command::Stale(args) => run_stale(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(hint) = e.usage_hint() {
                eprintln!("{hint}\n");
            }
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_set(args: SetArgs) -> Result<()> {
    let mut cfg = config::Config::load()?;

    // Override config with command line args
    if !args.ext.is_empty() {
        cfg.file_extensions = args.ext;
    }
    let charms_root = args
        .charms_root
        .unwrap_or_else(|| PathBuf::from(&cfg.charms_root));
    let charms_file = args
        .charms_file
        .unwrap_or_else(|| PathBuf::from(&cfg.charms_file));

    let charm_dir = input::charm_dir(&charms_root, &args.charm)?;
    info!(
        "Charm: {}, adding/changing channel to {}",
        args.charm.to_lowercase(),
        args.channel
    );

    let dirs = input::find_bundle_dirs(&charm_dir, &cfg.bundle_dirs);
    let bundles = input::find_bundles_in_dirs(&dirs, &cfg.file_extensions)?;
    if bundles.is_empty() {
        warn!("No bundles found under {}", charm_dir.display());
    }
    let triggers = charms::load_charm_list(&charms_file)?;

    let mode = if args.dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Write
    };
    let plan = bundle::update_bundles(&bundles, &triggers, args.channel.as_str(), mode)?;

    if args.json || args.dry_run {
        println!("{}", plan.to_json()?);
    }
    info!(
        "done: {} edits in {} bundles",
        plan.edits.len(),
        plan.files().len()
    );
    Ok(())
}

fn run_stale(args: StaleArgs) -> Result<()> {
    let paths = stale::charm_paths(args.charm_name.as_deref(), args.charm_dir.as_deref())?;
    let query = ReleaseQuery {
        track: args.track,
        base_channel: args.base_channel,
        architecture: args.architecture,
        channel: args.channel,
    };

    for charm in stale::find_stale(&SystemRunner, &paths, &query, &args.branch) {
        println!("{charm}");
    }
    Ok(())
}
