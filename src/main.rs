use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use transcript_sync::cli::{Cli, Command, DurationArgs, EpisodeArgs, TickerArgs};
use transcript_sync::config::EngineConfig;
use transcript_sync::ticker::{TickerFrame, TickerWindow};
use transcript_sync::timecode::parse_duration;
use transcript_sync::types::{Episode, EpisodeRecord};
use transcript_sync::ui::launch_ui;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::View(args) => {
            let (episode, config) = load_episode(&args.episode)?;
            launch_ui(episode, config).context("Viewer exited with an error")?;
        }
        Command::Ticker(args) => print_ticker(&args)?,
        Command::Duration(args) => print_duration(&args),
    }
    Ok(())
}

fn load_episode(args: &EpisodeArgs) -> Result<(Episode, EngineConfig)> {
    let config = EngineConfig::load(args.config.as_deref())
        .context("Failed to load engine configuration")?;
    let record = EpisodeRecord::load(&args.episode)?;
    record.validate().context("Episode validation failed")?;
    let episode = record.to_episode(config.window_width, config.default_duration_secs)?;
    tracing::info!(
        title = %episode.title,
        segments = episode.segments.len(),
        duration_secs = episode.duration_secs,
        "episode loaded"
    );
    Ok((episode, config))
}

fn print_ticker(args: &TickerArgs) -> Result<()> {
    args.validate()
        .context("Failed to validate command-line arguments")?;
    let (episode, config) = load_episode(&args.episode)?;
    let time_code = args.scroll * f64::from(episode.duration_secs);
    let window = TickerWindow::new(&config);
    match window.frame(time_code, Some(&episode.ticker), args.height) {
        TickerFrame::Render(chart) => {
            let json = serde_json::to_string_pretty(&chart).context("Failed to encode chart")?;
            println!("{}", json);
        }
        TickerFrame::NoUpdate => println!("no update"),
    }
    Ok(())
}

fn print_duration(args: &DurationArgs) {
    let config = EngineConfig::default();
    println!("{}", parse_duration(&args.text, config.default_duration_secs));
}
