use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::{Result, StoryError};
use crate::renderer::media_deck::DEFAULT_OPEN_STREAMS;
use crate::renderer::story_player::DEFAULT_TICK_PERIOD;

pub const ENV_CONTENT: &str = "STORYREEL_CONTENT";
pub const ENV_TICK_MS: &str = "STORYREEL_TICK_MS";
pub const ENV_HEIGHT: &str = "STORYREEL_HEIGHT";
pub const ENV_OPEN_STREAMS: &str = "STORYREEL_OPEN_STREAMS";

#[derive(Debug, Parser)]
#[command(name = "storyreel")]
#[command(about = "Full-screen story carousel for hero slider content")]
#[command(version)]
pub struct Cli {
    /// Saved content document to show at start-up
    pub content: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Saved content document to show at start-up.
    pub content_path: Option<PathBuf>,
    pub tick_period: Duration,
    /// Rows videos are decoded at; width follows each source's aspect.
    pub video_height: u32,
    /// How many video pipelines stay open at once.
    pub open_streams: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            content_path: None,
            tick_period: DEFAULT_TICK_PERIOD,
            video_height: 1280,
            open_streams: DEFAULT_OPEN_STREAMS,
        }
    }
}

fn parse_positive<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let parsed: T = value
        .trim()
        .parse()
        .map_err(|e| StoryError::Config(format!("{name} must be a positive integer: {e}")))?;
    if parsed <= T::default() {
        return Err(StoryError::Config(format!("{name} must be greater than zero")));
    }
    Ok(parsed)
}

impl AppConfig {
    /// Reads the configuration from the process environment. A content path
    /// given on the command line overrides the environment.
    pub fn from_env(cli: Cli) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), cli.content)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        cli_content: Option<PathBuf>,
    ) -> Result<Self> {
        let mut config = Self::default();

        config.content_path = cli_content
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(|| {
                lookup(ENV_CONTENT)
                    .filter(|path| !path.trim().is_empty())
                    .map(PathBuf::from)
            });

        if let Some(value) = lookup(ENV_TICK_MS) {
            config.tick_period = Duration::from_millis(parse_positive(ENV_TICK_MS, &value)?);
        }
        if let Some(value) = lookup(ENV_HEIGHT) {
            config.video_height = parse_positive(ENV_HEIGHT, &value)?;
        }
        if let Some(value) = lookup(ENV_OPEN_STREAMS) {
            config.open_streams = parse_positive(ENV_OPEN_STREAMS, &value)?;
        }
        Ok(config)
    }
}
