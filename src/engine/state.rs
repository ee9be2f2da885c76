use std::fmt;

/// The phases a ticket moves through while being triaged.
///
/// Each ticket flows: NEW → EVALUATE → INTERACTIVE → APPLY, settling early
/// whenever a terminal signal arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    New,
    Evaluate,
    Interactive,
    Apply,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::New => write!(f, "NEW"),
            Phase::Evaluate => write!(f, "EVALUATE"),
            Phase::Interactive => write!(f, "INTERACTIVE"),
            Phase::Apply => write!(f, "APPLY"),
        }
    }
}

/// What the driver observed during the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// NEW: the ticket has a decision-memory record.
    Remembered,
    /// NEW: no record; the ticket must be evaluated.
    Fresh,
    /// EVALUATE: the attention predicate fired.
    Attention,
    /// EVALUATE: nothing to do for this ticket.
    Quiet,
    /// INTERACTIVE: the ticket is already in a closed state.
    Closed,
    /// INTERACTIVE: the operator picked a resolution.
    Chosen,
    /// INTERACTIVE: the operator explicitly skipped.
    OperatorSkip,
    /// INTERACTIVE: the countdown elapsed with no submission.
    TimedOut,
    /// INTERACTIVE/APPLY: the portal failed; the ticket is abandoned.
    Faulted,
    /// APPLY: the update went through.
    Updated,
}

/// How one ticket's triage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Replayed,
    SkippedSilent,
    SkippedClosed,
    SkippedByOperator,
    SkippedTimeout,
    Applied,
}

/// The result of evaluating a phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Advance to the next phase.
    Advance(Phase),
    /// Triage of this ticket is over.
    Settle(Outcome),
}

/// Drives a ticket through the triage phases.
pub struct TriageMachine;

impl TriageMachine {
    /// Compute the transition for the given phase and observed signal.
    ///
    /// - `New` settles into replay on a memory hit, otherwise advances.
    /// - `Evaluate` settles silently for quiet tickets, otherwise advances.
    /// - `Interactive` settles on closed/skip/timeout/fault, advances on a
    ///   choice.
    /// - `Apply` settles either applied or abandoned.
    ///
    /// A signal that does not belong to the current phase abandons the
    /// ticket; the driver never produces one.
    pub fn next(phase: Phase, signal: Signal) -> Step {
        match (phase, signal) {
            (Phase::New, Signal::Remembered) => Step::Settle(Outcome::Replayed),
            (Phase::New, Signal::Fresh) => Step::Advance(Phase::Evaluate),

            (Phase::Evaluate, Signal::Quiet) => Step::Settle(Outcome::SkippedSilent),
            (Phase::Evaluate, Signal::Attention) => Step::Advance(Phase::Interactive),

            (Phase::Interactive, Signal::Closed) => Step::Settle(Outcome::SkippedClosed),
            (Phase::Interactive, Signal::OperatorSkip) => {
                Step::Settle(Outcome::SkippedByOperator)
            }
            (Phase::Interactive, Signal::TimedOut) => Step::Settle(Outcome::SkippedTimeout),
            (Phase::Interactive, Signal::Chosen) => Step::Advance(Phase::Apply),
            (Phase::Interactive, Signal::Faulted) => Step::Settle(Outcome::SkippedByOperator),

            (Phase::Apply, Signal::Updated) => Step::Settle(Outcome::Applied),
            (Phase::Apply, Signal::Faulted) => Step::Settle(Outcome::SkippedByOperator),

            // Stray signal for the phase: abandon the ticket.
            (_, _) => Step::Settle(Outcome::SkippedByOperator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_hit_settles_into_replay() {
        assert_eq!(
            TriageMachine::next(Phase::New, Signal::Remembered),
            Step::Settle(Outcome::Replayed)
        );
    }

    #[test]
    fn fresh_ticket_advances_to_evaluate() {
        assert_eq!(
            TriageMachine::next(Phase::New, Signal::Fresh),
            Step::Advance(Phase::Evaluate)
        );
    }

    #[test]
    fn quiet_ticket_settles_silently() {
        assert_eq!(
            TriageMachine::next(Phase::Evaluate, Signal::Quiet),
            Step::Settle(Outcome::SkippedSilent)
        );
    }

    #[test]
    fn attention_advances_to_interactive() {
        assert_eq!(
            TriageMachine::next(Phase::Evaluate, Signal::Attention),
            Step::Advance(Phase::Interactive)
        );
    }

    #[test]
    fn interactive_terminal_signals() {
        assert_eq!(
            TriageMachine::next(Phase::Interactive, Signal::Closed),
            Step::Settle(Outcome::SkippedClosed)
        );
        assert_eq!(
            TriageMachine::next(Phase::Interactive, Signal::OperatorSkip),
            Step::Settle(Outcome::SkippedByOperator)
        );
        assert_eq!(
            TriageMachine::next(Phase::Interactive, Signal::TimedOut),
            Step::Settle(Outcome::SkippedTimeout)
        );
        assert_eq!(
            TriageMachine::next(Phase::Interactive, Signal::Faulted),
            Step::Settle(Outcome::SkippedByOperator)
        );
    }

    #[test]
    fn chosen_advances_to_apply() {
        assert_eq!(
            TriageMachine::next(Phase::Interactive, Signal::Chosen),
            Step::Advance(Phase::Apply)
        );
    }

    #[test]
    fn apply_settles_applied_or_abandoned() {
        assert_eq!(
            TriageMachine::next(Phase::Apply, Signal::Updated),
            Step::Settle(Outcome::Applied)
        );
        assert_eq!(
            TriageMachine::next(Phase::Apply, Signal::Faulted),
            Step::Settle(Outcome::SkippedByOperator)
        );
    }

    #[test]
    fn stray_signal_abandons() {
        assert_eq!(
            TriageMachine::next(Phase::Apply, Signal::Remembered),
            Step::Settle(Outcome::SkippedByOperator)
        );
        assert_eq!(
            TriageMachine::next(Phase::New, Signal::Updated),
            Step::Settle(Outcome::SkippedByOperator)
        );
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::New.to_string(), "NEW");
        assert_eq!(Phase::Evaluate.to_string(), "EVALUATE");
        assert_eq!(Phase::Interactive.to_string(), "INTERACTIVE");
        assert_eq!(Phase::Apply.to_string(), "APPLY");
    }
}
