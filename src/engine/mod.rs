mod resolution;
mod state;
mod triage;

pub use resolution::{
    AttentionReason, Resolution, StateChoice, UNASSIGNED_SENTINEL, needs_attention,
};
pub use state::{Outcome, Phase, Signal, Step, TriageMachine};
pub use triage::TriageEngine;
