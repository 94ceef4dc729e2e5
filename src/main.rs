//! Binary entry point: read config and flags, start file logging, seed the
//! session from the command line, and drive the Ratatui event loop until the
//! user exits.
use std::path::PathBuf;

use anyhow::Context;
use photo_batch_renamer::config;
use photo_batch_renamer::logging::init_tracing;
use photo_batch_renamer::{run_app, App, Controller, DownloadFolder, Exporter, PreviewRegistry};
use tracing::info;

const HELP: &str = "\
Rename up to a fixed number of photos as {base}1, {base}2, ... and save them as one ZIP.

USAGE:
  photo-batch-renamer [OPTIONS] [PATH ...]

ARGS:
  PATH             Image files or folders to load at start

OPTIONS:
  --base NAME      Base name for the renamed files
  --out DIR        Folder the archive is saved to (default: Downloads)
  --max N          Maximum number of photos (default: 15)
  -h, --help       Print this help
";

struct Args {
    base: Option<String>,
    out: Option<PathBuf>,
    max: Option<usize>,
    paths: Vec<PathBuf>,
}

/// `None` when help was printed and there is nothing else to do.
fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(None);
    }

    let parsed = Args {
        base: args.opt_value_from_str("--base").context("invalid --base")?,
        out: args.opt_value_from_str("--out").context("invalid --out")?,
        max: args.opt_value_from_str("--max").context("--max expects a number")?,
        paths: args.finish().into_iter().map(PathBuf::from).collect(),
    };
    Ok(Some(parsed))
}

/// Startup failures (an unreadable path on the command line, no home
/// directory) are reported before the terminal is taken over.
fn main() -> anyhow::Result<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    let mut settings = config::load()?;
    if let Some(max) = args.max {
        settings.max_files = max.max(1);
    }
    if args.out.is_some() {
        settings.download_dir = args.out;
    }

    let _log_guard = init_tracing(&config::log_dir()?, &settings.log_level)?;
    info!(?settings, "starting session");

    let controller = Controller::new(PreviewRegistry::new(), settings.max_files);
    let exporter = Exporter::new(DownloadFolder::resolve(settings.download_dir.clone()));
    let mut app = App::new(controller, exporter);

    if !args.paths.is_empty() {
        app.intake_paths(&args.paths)?;
    }
    if let Some(base) = args.base {
        app.set_base_name(base);
    }

    run_app(&mut app)
}
