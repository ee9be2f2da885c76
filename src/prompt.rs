//! Timeout-bound interactive read.
//!
//! The triage loop asks the operator for a single choice per menu, with a
//! visible countdown on the same line. The wait is a blocking read on the
//! terminal's input event stream raced against the deadline (redrawn once
//! per second), not a busy poll; when the deadline elapses before a line
//! terminator the read yields [`PromptReply::TimedOut`]. The read stalls
//! the whole poll loop: only one ticket is resolved at a time.

use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use crossterm::cursor;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType};

/// Result of one timed read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptReply {
    /// The operator submitted a line before the deadline.
    Submitted(String),
    /// The deadline elapsed with no line terminator.
    TimedOut,
}

impl PromptReply {
    /// The submitted text, trimmed; `None` on timeout.
    pub fn submitted(&self) -> Option<&str> {
        match self {
            PromptReply::Submitted(text) => Some(text.trim()),
            PromptReply::TimedOut => None,
        }
    }
}

/// Seam between the decision engine and the operator console, so tests can
/// script the operator's side.
pub trait Prompt {
    async fn timed_read(&self, label: &str, timeout: Duration) -> PromptReply;
}

/// The real countdown prompt. Raw-mode character input with backspace
/// correction; falls back to a line-buffered read raced against the
/// deadline when no terminal is attached.
pub struct CountdownPrompt;

impl Prompt for CountdownPrompt {
    async fn timed_read(&self, label: &str, timeout: Duration) -> PromptReply {
        let label = label.to_string();
        tokio::task::spawn_blocking(move || countdown_read(&label, timeout))
            .await
            .unwrap_or(PromptReply::TimedOut)
    }
}

fn countdown_read(label: &str, timeout: Duration) -> PromptReply {
    if terminal::enable_raw_mode().is_err() {
        return line_read_with_deadline(timeout);
    }
    let reply = raw_countdown(label, timeout);
    let _ = terminal::disable_raw_mode();
    println!();
    reply
}

fn raw_countdown(label: &str, timeout: Duration) -> PromptReply {
    let deadline = Instant::now() + timeout;
    let mut input = String::new();

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());

        let mut out = std::io::stdout();
        let _ = execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine));
        let _ = write!(out, "    [{:02}s] {label} {input}", remaining.as_secs());
        let _ = out.flush();

        if remaining.is_zero() {
            return PromptReply::TimedOut;
        }

        // Block on the input stream until a key arrives or the next
        // countdown tick is due.
        let tick = remaining.min(Duration::from_secs(1));
        match event::poll(tick) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => match key.code {
                    KeyCode::Enter => return PromptReply::Submitted(input),
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        // Raw mode eats the interrupt signal; map it to the
                        // skip token so the loop can exit at the boundary.
                        return PromptReply::Submitted("S".to_string());
                    }
                    KeyCode::Char(c) => input.push(c),
                    _ => {}
                },
                _ => {}
            },
            Ok(false) => {}
            Err(_) => return PromptReply::TimedOut,
        }
    }
}

/// Dedicated stdin line channel, started once. The reader thread lives for
/// the rest of the process and feeds every fallback read.
fn stdin_lines() -> &'static Mutex<Receiver<String>> {
    static CHANNEL: OnceLock<Mutex<Receiver<String>>> = OnceLock::new();
    CHANNEL.get_or_init(|| {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Mutex::new(rx)
    })
}

fn line_read_with_deadline(timeout: Duration) -> PromptReply {
    let receiver = stdin_lines().lock().unwrap_or_else(|p| p.into_inner());
    match receiver.recv_timeout(timeout) {
        Ok(line) => PromptReply::Submitted(line),
        Err(_) => PromptReply::TimedOut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submitted_text_is_trimmed() {
        let reply = PromptReply::Submitted("  2  ".into());
        assert_eq!(reply.submitted(), Some("2"));
    }

    #[test]
    fn timeout_has_no_text() {
        assert_eq!(PromptReply::TimedOut.submitted(), None);
    }
}
