use std::path::PathBuf;

use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use trackport::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize the resolution service with your account
    Auth,

    /// Show credentials and authorization status of the resolution service
    Status,

    /// List your playlists
    Playlists,

    /// List the tracks of a playlist
    Tracks(TracksOptions),

    #[clap(about = "Download every track of a playlist")]
    Export(ExportOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct TracksOptions {
    /// Playlist URL
    pub url: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ExportOptions {
    /// Playlist URL
    pub url: String,

    /// Directory the tracks are saved to
    #[clap(long)]
    pub dest: Option<PathBuf>,

    /// Acquisition endpoint to try, in order; can be repeated
    #[clap(long = "strategy", action = ArgAction::Append, num_args = 1)]
    pub strategies: Vec<String>,

    /// Expose progress and cancellation over HTTP while exporting
    #[clap(long)]
    pub serve: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Status => cli::status().await,
        Command::Playlists => cli::playlists().await,
        Command::Tracks(opt) => cli::tracks(opt.url).await,
        Command::Export(opt) => {
            cli::export(opt.url, opt.dest, opt.strategies, opt.serve).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
