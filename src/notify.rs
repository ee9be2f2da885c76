//! Operator notification: terminal bell plus an optional external player.
//!
//! Fire-and-forget: the player process is spawned detached and never
//! awaited; the caller joins via a fixed 3-second sleep so the sound has
//! time to play before the prompt starts counting down. Playback failure
//! is narrated, never fatal.

use std::io::Write;
use std::process::Command;
use std::time::Duration;

use crate::livelog::LiveLog;

const RING_SETTLE: Duration = Duration::from_secs(3);

pub struct Notifier {
    sound_command: Option<String>,
}

impl Notifier {
    pub fn new(sound_command: Option<String>) -> Self {
        Self { sound_command }
    }

    /// Ring the bell, kick off the configured player, wait the fixed settle.
    pub async fn ring(&self, log: &LiveLog) {
        print!("\x07");
        let _ = std::io::stdout().flush();

        if let Some(command) = &self.sound_command {
            match split_command(command) {
                Some((program, args)) => match Command::new(program).args(args).spawn() {
                    Ok(mut child) => {
                        // Reap the player off-thread so it never zombies.
                        std::thread::spawn(move || {
                            let _ = child.wait();
                        });
                    }
                    Err(e) => log.add(&format!("    sound playback error: {e}")),
                },
                None => log.add("    sound playback error: empty command"),
            }
        }

        tokio::time::sleep(RING_SETTLE).await;
    }
}

fn split_command(command: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(String::from);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_command_separates_program_and_args() {
        let (program, args) = split_command("paplay /tmp/chime.wav").unwrap();
        assert_eq!(program, "paplay");
        assert_eq!(args, vec!["/tmp/chime.wav"]);
    }

    #[test]
    fn split_command_rejects_empty() {
        assert!(split_command("   ").is_none());
    }
}
