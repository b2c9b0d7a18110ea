use std::path::Path;

use clap::Args;
use mobroom_core::view::{format_remaining, whole_minutes};
use mobroom_core::{plan_session, PlannedKind, PlannedPhase};

use super::{load_config, SessionArgs};

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub session: SessionArgs,
    /// Number of phases to list
    #[arg(long, default_value_t = 8)]
    pub phases: usize,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: PlanArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let resolved = args.session.resolve(&config)?;
    let plan = plan_session(&resolved.members, resolved.config, args.phases)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        for phase in &plan {
            println!("{}", describe(phase));
        }
    }
    Ok(())
}

fn describe(phase: &PlannedPhase) -> String {
    // Offsets can run past an hour, so print minutes rather than mm:ss.
    let start = format!("+{}m", whole_minutes(phase.starts_at_ms));
    let length = format_remaining(phase.duration_ms);
    match (phase.kind, &phase.roles) {
        (PlannedKind::Turn, Some(roles)) => format!(
            "{start:>6}  turn #{:<3} {length}  driver {}, navigator {}",
            phase.rotation_index, roles.driver.name, roles.navigator.name
        ),
        _ => format!("{start:>6}  break      {length}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobroom_core::SessionConfig;

    #[test]
    fn describe_turn_and_break() {
        let config = SessionConfig::from_minutes(5, 10, 1).unwrap();
        let plan = plan_session(&["Ada", "Grace"], config, 2).unwrap();
        assert_eq!(
            describe(&plan[0]),
            "   +0m  turn #0   05:00  driver Ada, navigator Grace"
        );
        assert_eq!(describe(&plan[1]), "   +5m  break      10:00");
    }
}
