//! rhed - an ed-style command palette for text files and the clipboard.
//!
//! # Usage
//!
//! ```bash
//! rhed notes.txt
//! rhed --source editable page.html
//! rhed            # edit the clipboard
//! ```

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;

use rhed::app::{App, SessionEnd, Target};
use rhed::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use rhed::palette::SourceMode;

/// An ed-style command palette for text files and the clipboard
#[derive(Parser, Debug)]
#[command(name = "rhed", version, about, long_about = None)]
struct Cli {
    /// File to edit; the clipboard is used when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Start with terse `?` errors instead of verbose ones
    #[arg(long)]
    terse: bool,

    /// Start without the `*` command prompt
    #[arg(long)]
    no_prompt: bool,

    /// Print each result as a JSON object
    #[arg(long)]
    json: bool,

    /// How the file contents are interpreted
    #[arg(long, value_enum)]
    source: Option<SourceMode>,

    /// Write log output to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_ref())?;

    let target = Target::resolve(cli.file.as_deref(), effective.source)?;
    let mut app = App::new(target)
        .with_config(effective.ed_config())
        .with_json(effective.json);
    if let Some(source) = effective.source {
        app = app.with_source(source);
    }

    match app.run().context("Session error")? {
        SessionEnd::EndOfInput => tracing::info!("session ended without writing"),
        SessionEnd::Written | SessionEnd::Highlighted => {}
    }
    Ok(())
}
