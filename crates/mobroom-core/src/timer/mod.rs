mod facility;
mod machine;
mod settings;

pub use facility::{ManualTimer, TimerFacility, TimerToken, TokioTimer};
pub use machine::{PhaseMachine, PhaseState};
pub use settings::{SessionConfig, MINUTE_MS};
