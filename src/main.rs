use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sweatshares::replay::{self, ReplayScript};
use sweatshares::{init_logging_with, EditorSettings, LogFormat, BUILD_DATE, VERSION};

/// Signature field placement editor for the SweatShares document vault.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a recorded session and print the resulting signature request
    Replay {
        /// Session script (JSON)
        script: PathBuf,

        /// Editor settings file (.toml or .json); defaults to the user config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the final page with its field outline to a PNG
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let format = if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_logging_with(format)?;
    tracing::debug!(version = VERSION, build_date = BUILD_DATE, "starting");

    match args.command {
        Command::Replay {
            script,
            config,
            snapshot,
        } => {
            let settings = match config {
                Some(path) => EditorSettings::load_from_file(&path)?,
                None => EditorSettings::load_or_default(&EditorSettings::default_path()?)?,
            };
            let script = ReplayScript::load(&script)?;

            let editor = replay::replay_session(&script, settings).await?;
            if let Some(path) = snapshot {
                match replay::snapshot(&editor) {
                    Some(bitmap) => {
                        bitmap.save(&path)?;
                        tracing::info!(path = %path.display(), "snapshot written");
                    }
                    None => tracing::warn!("no rendered page to snapshot"),
                }
            }

            let request = editor.build_request(&script.request)?;
            println!("{}", request.to_json()?);
        }
    }

    Ok(())
}
