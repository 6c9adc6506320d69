use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "transcript-sync",
    version,
    about = "Transcript viewer with scroll-synchronized playback and a term ticker"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the interactive transcript viewer.
    View(ViewArgs),
    /// Print the ticker chart for one scroll position as JSON.
    Ticker(TickerArgs),
    /// Parse an episode duration string and print it in seconds.
    Duration(DurationArgs),
}

#[derive(Args, Debug, Clone)]
pub struct EpisodeArgs {
    /// Path to the episode JSON file.
    #[arg(value_name = "EPISODE")]
    pub episode: PathBuf,
    /// Optional engine configuration (JSON) overriding the defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub episode: EpisodeArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TickerArgs {
    #[command(flatten)]
    pub episode: EpisodeArgs,
    /// Scroll position of the transcript as a fraction in [0, 1].
    #[arg(long, default_value_t = 0.0)]
    pub scroll: f64,
    /// Transcript viewport height; the configured fallback is used if omitted.
    #[arg(long)]
    pub height: Option<f64>,
}

impl TickerArgs {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.scroll),
            "Scroll fraction must lie in [0, 1], got {}",
            self.scroll
        );
        if let Some(height) = self.height {
            ensure!(height > 0.0, "Viewport height must be positive, got {}", height);
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct DurationArgs {
    /// Duration in H:M:S, M:S or S form.
    #[arg(value_name = "TEXT", allow_hyphen_values = true)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_ticker_command() {
        let cli = Cli::try_parse_from([
            "transcript-sync",
            "ticker",
            "episode.json",
            "--scroll",
            "0.25",
            "--height",
            "480",
        ])
        .unwrap();
        let Command::Ticker(args) = cli.command else {
            panic!("expected ticker command");
        };
        assert_eq!(args.scroll, 0.25);
        assert_eq!(args.height, Some(480.0));
        assert!(args.episode.config.is_none());
        args.validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range_scroll() {
        let cli =
            Cli::try_parse_from(["transcript-sync", "ticker", "e.json", "--scroll", "1.5"]).unwrap();
        let Command::Ticker(args) = cli.command else {
            panic!("expected ticker command");
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn view_accepts_config_override() {
        let cli = Cli::try_parse_from([
            "transcript-sync",
            "view",
            "episode.json",
            "--config",
            "engine.json",
        ])
        .unwrap();
        let Command::View(args) = cli.command else {
            panic!("expected view command");
        };
        assert_eq!(args.episode.config.unwrap().to_str(), Some("engine.json"));
    }
}
