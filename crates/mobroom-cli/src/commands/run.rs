//! Interactive session loop.
//!
//! One task owns the store and `select!`s over stdin commands, expired
//! timer tokens and Ctrl-C, so every transition runs to completion before
//! the next input is looked at. Events are printed to stdout as JSON lines.

use std::path::Path;

use clap::Args;
use mobroom_core::storage::WindowSettings;
use mobroom_core::view::{format_remaining, rotation_progress, OptionsView};
use mobroom_core::{
    apply_profile, Action, Event, Roster, SessionStore, Snapshot, TimerFacility, TokioTimer,
    TracingWindowBridge, WindowProfile,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::{load_config, ResolvedSession, SessionArgs};

const MINUTE_MS: i64 = mobroom_core::timer::MINUTE_MS as i64;

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub session: SessionArgs,
    /// Start the first turn immediately
    #[arg(long)]
    pub start: bool,
    /// Also print countdown events
    #[arg(long)]
    pub countdown: bool,
}

/// A parsed stdin line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Dispatch(Action),
    Status,
    Help,
    Quit,
}

/// Snapshot plus the derived values a front end would render.
#[derive(Serialize)]
struct StatusView<'a> {
    snapshot: &'a Snapshot,
    options: OptionsView,
    progress: Vec<bool>,
    remaining: Option<String>,
}

const HELP: &str = "commands: add <name> | remove <id|name> | timer +N|-N | break +N|-N | \
rotations +N|-N | start | status | quit";

pub fn run(args: RunArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let resolved = args.session.resolve(&config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_session(resolved, &args, &config.window))
}

async fn run_session(
    resolved: ResolvedSession,
    args: &RunArgs,
    window: &WindowSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let (timer, mut expired) = TokioTimer::new();
    let mut store = SessionStore::new(resolved.config, timer).with_tick_ms(resolved.tick_ms);
    let mut updates = store.subscribe();
    let mut bridge = TracingWindowBridge;
    apply_profile(&mut bridge, WindowProfile::editor());

    for name in resolved.members {
        store.dispatch(Action::AddMember { name })?;
    }
    if args.start {
        store.dispatch(Action::StartSession)?;
    }
    print_status(&store)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            Some(token) = expired.recv() => {
                store.on_timer(token);
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    None => {
                        stdin_open = false;
                        if store.phase().is_idle() {
                            break;
                        }
                        info!("stdin closed; session keeps running until Ctrl-C");
                    }
                    Some(line) => match parse_command(&line, store.roster()) {
                        Ok(Command::Quit) => break,
                        Ok(Command::Status) => print_status(&store)?,
                        Ok(Command::Help) => eprintln!("{HELP}"),
                        Ok(Command::Dispatch(action)) => {
                            if let Err(e) = store.dispatch(action) {
                                eprintln!("error: {e}");
                            }
                        }
                        Err(msg) => eprintln!("error: {msg}\n{HELP}"),
                    },
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }

        while let Ok(update) = updates.try_recv() {
            if update.event.is_phase_change() {
                let profile = WindowProfile::for_phase(update.snapshot.phase, window.overlay_opacity);
                apply_profile(&mut bridge, profile);
            }
            if matches!(update.event, Event::Countdown { .. }) && !args.countdown {
                continue;
            }
            println!("{}", serde_json::to_string(&update)?);
        }

        if !stdin_open && store.phase().is_idle() {
            break;
        }
    }

    store.shutdown();
    Ok(())
}

fn print_status<T: TimerFacility>(store: &SessionStore<T>) -> Result<(), serde_json::Error> {
    let snapshot = store.snapshot();
    let view = StatusView {
        options: OptionsView::from_config(&snapshot.config),
        progress: rotation_progress(&snapshot),
        remaining: snapshot.phase.remaining_ms().map(format_remaining),
        snapshot: &snapshot,
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn parse_command(line: &str, roster: &Roster) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "add" => Command::Dispatch(Action::AddMember {
            name: rest.to_string(),
        }),
        "remove" | "rm" => {
            if rest.is_empty() {
                return Err("remove needs a member id or name".into());
            }
            let id = match roster.position_of(rest) {
                Some(_) => rest.to_string(),
                None => match roster.find_by_name(rest) {
                    Some(member) => member.id.clone(),
                    None => {
                        warn!(member = rest, "no member with that id or name");
                        rest.to_string()
                    }
                },
            };
            Command::Dispatch(Action::RemoveMember { id })
        }
        "timer" => Command::Dispatch(Action::AdjustTimerLength {
            delta_ms: parse_delta(rest)?.saturating_mul(MINUTE_MS),
        }),
        "break" => Command::Dispatch(Action::AdjustBreakLength {
            delta_ms: parse_delta(rest)?.saturating_mul(MINUTE_MS),
        }),
        "rotations" => Command::Dispatch(Action::AdjustRotationsPerBreak {
            delta: parse_delta(rest)?,
        }),
        "start" => Command::Dispatch(Action::StartSession),
        "status" | "" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(command)
}

/// `+2`, `-1` or `3` (plain numbers count as increments).
fn parse_delta(text: &str) -> Result<i64, String> {
    let text = text.trim();
    let digits = text.strip_prefix('+').unwrap_or(text);
    digits
        .parse::<i64>()
        .map_err(|_| format!("expected a signed number like +1 or -1, got '{text}'"))
}
