use std::time::Duration;

use crate::livelog::LiveLog;
use crate::memory::DecisionMemory;
use crate::notify::Notifier;
use crate::portal::TicketPortal;
use crate::prompt::Prompt;
use crate::roster::ShiftRoster;
use crate::scraper::{NO_DESCRIPTION, TicketSnapshot};
use crate::ui;

use super::resolution::{AttentionReason, Resolution, StateChoice, needs_attention};
use super::state::{Outcome, Phase, Signal, Step, TriageMachine};

/// Drives one ticket through the triage phases.
///
/// The engine never touches the decision memory mutably: on `Applied` the
/// caller writes the record, and on replay the record is already present.
/// Every failure inside a ticket is narrated and settles the ticket; only
/// the supervisor deals with session loss, at cycle granularity.
pub struct TriageEngine<'a, P: TicketPortal, Q: Prompt> {
    pub portal: &'a P,
    pub prompt: &'a Q,
    pub memory: &'a DecisionMemory,
    pub roster: &'a ShiftRoster,
    pub notifier: &'a Notifier,
    pub log: &'a LiveLog,
    pub closed_states: &'a [String],
    pub prompt_timeout: Duration,
}

/// One menu round: a valid pick, an explicit skip, or the countdown ran out.
enum MenuPick<T> {
    Picked(T),
    Skip,
    Timeout,
}

impl<P: TicketPortal, Q: Prompt> TriageEngine<'_, P, Q> {
    pub async fn triage(&self, ticket: &TicketSnapshot) -> Resolution {
        // NEW: a memory hit replays without asking anyone.
        if let Some(record) = self.memory.lookup(&ticket.id) {
            let record = record.clone();
            self.log.add(&ui::divider());
            self.log.add(&format!(
                "    fast-processing {}: {}",
                ticket.id, ticket.short_description
            ));
            self.log.add(&format!(
                "    found in decision memory, auto-applying {}",
                record.state_name
            ));
            if let Err(e) = self
                .portal
                .apply(&ticket.id, &record.state_value, &record.state_name, None)
                .await
            {
                // Memory stays untouched; the next cycle replays again.
                self.log.add(&format!("    replay failed: {e}"));
            }
            self.log.add(&ui::divider());
            return self.settle(Phase::New, Signal::Remembered, None);
        }
        if !matches!(
            TriageMachine::next(Phase::New, Signal::Fresh),
            Step::Advance(Phase::Evaluate)
        ) {
            return self.abandon("unexpected transition out of NEW");
        }

        // EVALUATE: quiet tickets end here, with no interaction.
        let Some(reason) = needs_attention(ticket) else {
            return self.settle(Phase::Evaluate, Signal::Quiet, None);
        };
        if !matches!(
            TriageMachine::next(Phase::Evaluate, Signal::Attention),
            Step::Advance(Phase::Interactive)
        ) {
            return self.abandon("unexpected transition out of EVALUATE");
        }

        // INTERACTIVE: open the form and look at the live state.
        let view = match self.portal.inspect(&ticket.id).await {
            Ok(view) => view,
            Err(e) => {
                self.log.add(&format!("    error opening {}: {e}", ticket.id));
                return self.settle(Phase::Interactive, Signal::Faulted, None);
            }
        };

        let mut description = ticket.short_description.clone();
        if (description.is_empty() || description == NO_DESCRIPTION)
            && !view.short_description.trim().is_empty()
        {
            description = view.short_description.trim().to_string();
        }

        self.log.add("");
        self.log.add(&ui::heavy_divider());
        self.log.add(&format!("    ACTION REQUIRED: {}", ticket.id));
        self.log.add(&format!("    desc: {description}"));
        self.log.add(&format!("    reason: {reason}"));
        self.log.add(&ui::heavy_divider());

        if self.closed_states.contains(&view.state_value) {
            self.log.add("    ticket closed, skipping");
            return self.settle(Phase::Interactive, Signal::Closed, None);
        }

        self.notifier.ring(self.log).await;

        // Assignee menu, only when the list view showed no assignee.
        let mut assignee = None;
        if matches!(reason, AttentionReason::Unassigned) {
            match self.choose_assignee().await {
                MenuPick::Picked(name) => assignee = Some(name),
                MenuPick::Skip => {
                    self.log.add("    skipped assignment, skipping ticket");
                    return self.settle(Phase::Interactive, Signal::OperatorSkip, None);
                }
                MenuPick::Timeout => {
                    self.log.add("    timeout, skipping ticket");
                    return self.settle(Phase::Interactive, Signal::TimedOut, None);
                }
            }
        }

        let choice = match self.choose_state(&ticket.id).await {
            MenuPick::Picked(choice) => choice,
            MenuPick::Skip => {
                self.log.add("    skipped");
                return self.settle(Phase::Interactive, Signal::OperatorSkip, None);
            }
            MenuPick::Timeout => {
                self.log.add("    timeout, skipping ticket");
                return self.settle(Phase::Interactive, Signal::TimedOut, None);
            }
        };
        if !matches!(
            TriageMachine::next(Phase::Interactive, Signal::Chosen),
            Step::Advance(Phase::Apply)
        ) {
            return self.abandon("unexpected transition out of INTERACTIVE");
        }

        // APPLY
        match self
            .portal
            .apply(&ticket.id, choice.value(), choice.name(), assignee.as_deref())
            .await
        {
            Ok(()) => self.settle(Phase::Apply, Signal::Updated, Some((choice, assignee))),
            Err(e) => {
                self.log.add(&format!("    update failed: {e}"));
                self.settle(Phase::Apply, Signal::Faulted, None)
            }
        }
    }

    /// Numbered roster menu. Invalid entries re-prompt; only skip and the
    /// countdown end the round.
    async fn choose_assignee(&self) -> MenuPick<String> {
        println!("\n    need assignee:");
        for line in self.roster.menu_lines() {
            println!("    {line}");
        }
        println!("    [S] Skip");

        let label = format!("Select user (1-{}), or [S]kip:", self.roster.len());
        loop {
            let reply = self.prompt.timed_read(&label, self.prompt_timeout).await;
            let Some(text) = reply.submitted().map(str::to_string) else {
                return MenuPick::Timeout;
            };
            if text.eq_ignore_ascii_case("s") {
                return MenuPick::Skip;
            }
            if let Ok(entry) = text.parse::<usize>()
                && let Some(name) = self.roster.pick(entry)
            {
                return MenuPick::Picked(name.to_string());
            }
            // invalid entries re-prompt
        }
    }

    async fn choose_state(&self, ticket_id: &str) -> MenuPick<StateChoice> {
        println!("    select state for {ticket_id}:");
        for line in StateChoice::menu_lines() {
            println!("    {line}");
        }
        println!("    [S] Skip");

        loop {
            let reply = self.prompt.timed_read("Choice:", self.prompt_timeout).await;
            let Some(text) = reply.submitted().map(str::to_string) else {
                return MenuPick::Timeout;
            };
            if text.eq_ignore_ascii_case("s") {
                return MenuPick::Skip;
            }
            if let Some(choice) = StateChoice::from_menu(&text) {
                return MenuPick::Picked(choice);
            }
        }
    }

    /// Run the machine on a terminal signal and map the outcome.
    fn settle(
        &self,
        phase: Phase,
        signal: Signal,
        applied: Option<(StateChoice, Option<String>)>,
    ) -> Resolution {
        let outcome = match TriageMachine::next(phase, signal) {
            Step::Settle(outcome) => outcome,
            Step::Advance(next) => {
                self.log.add(&format!("    unexpected advance to {next}"));
                Outcome::SkippedByOperator
            }
        };
        match outcome {
            Outcome::Replayed => Resolution::Replayed,
            Outcome::SkippedSilent => Resolution::SkippedSilent,
            Outcome::SkippedClosed => Resolution::SkippedClosed,
            Outcome::SkippedByOperator => Resolution::SkippedByOperator,
            Outcome::SkippedTimeout => Resolution::SkippedTimeout,
            Outcome::Applied => match applied {
                Some((choice, assignee)) => Resolution::Applied { choice, assignee },
                None => Resolution::SkippedByOperator,
            },
        }
    }

    fn abandon(&self, why: &str) -> Resolution {
        self.log.add(&format!("    {why}, abandoning ticket"));
        Resolution::SkippedByOperator
    }
}
