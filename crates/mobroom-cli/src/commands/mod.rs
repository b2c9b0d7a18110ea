pub mod config;
pub mod plan;
pub mod run;

use std::path::Path;

use clap::Args;
use mobroom_core::{Config, CoreError, SessionConfig};

/// Load the config from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, CoreError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

pub fn save_config(config: &Config, path: Option<&Path>) -> Result<(), CoreError> {
    match path {
        Some(path) => config.save_to(path),
        None => config.save(),
    }
}

/// Roster and timing overrides shared by `run` and `plan`.
#[derive(Args, Debug, Default)]
pub struct SessionArgs {
    /// Roster member, in rotation order (repeatable). Defaults to roster.members
    #[arg(short, long = "member", value_name = "NAME")]
    pub members: Vec<String>,
    /// Turn length in minutes
    #[arg(long)]
    pub timer_minutes: Option<u64>,
    /// Break length in minutes
    #[arg(long)]
    pub break_minutes: Option<u64>,
    /// Turns between two breaks
    #[arg(long)]
    pub rotations_per_break: Option<u32>,
    /// Countdown refresh interval in milliseconds (0 = none)
    #[arg(long)]
    pub tick_ms: Option<u64>,
}

/// Session inputs after merging flags over the config file.
#[derive(Debug)]
pub struct ResolvedSession {
    pub members: Vec<String>,
    pub config: SessionConfig,
    pub tick_ms: u64,
}

impl SessionArgs {
    pub fn resolve(&self, config: &Config) -> Result<ResolvedSession, CoreError> {
        let members = if self.members.is_empty() {
            config.roster.members.clone()
        } else {
            self.members.clone()
        };
        let session = SessionConfig::from_minutes(
            self.timer_minutes.unwrap_or(config.session.timer_minutes),
            self.break_minutes.unwrap_or(config.session.break_minutes),
            self.rotations_per_break
                .unwrap_or(config.session.rotations_per_break),
        )?;
        Ok(ResolvedSession {
            members,
            config: session,
            tick_ms: self.tick_ms.unwrap_or(config.session.tick_ms),
        })
    }
}
