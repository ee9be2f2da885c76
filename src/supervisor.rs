//! Poll/session supervisor: owns the automation session lifecycle.
//!
//! Effectively a two-state machine, NoSession → Session. Session creation
//! failures back off and retry; login element failures are fatal (so is a
//! missing credential pair, checked before anything else). Inside a
//! session, each cycle scrapes the list and triages every discovered
//! ticket sequentially; session loss tears the whole session down and
//! re-enters NoSession after a fixed backoff, any other cycle error backs
//! off in the same session. A user interrupt exits the loop cleanly with
//! best-effort teardown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::sleep;

use crate::config::SnowwatchConfig;
use crate::engine::{Resolution, TriageEngine};
use crate::error::SnowwatchError;
use crate::livelog::LiveLog;
use crate::memory::{DecisionMemory, MemoryRecord};
use crate::notify::Notifier;
use crate::portal::SnowPortal;
use crate::prompt::CountdownPrompt;
use crate::roster::ShiftRoster;
use crate::scraper;
use crate::ui;
use crate::webdriver::{DriverError, Session, WebDriverClient};

const POPUP_BUTTON: &str = "#btnSetPopup";
const CORPORATE_OPENER: &str = "#corporateOpener";
const USERNAME_INPUT: &str = "#UsernameInputTxtCorporate";
const PASSWORD_INPUT: &str = "#PasswordInputCorporate";
const LOGIN_BUTTON: &str = "#btnLoginCorporate";
const DASHBOARD_MARK: &str = "$pa_dashboard.do";

const LOGIN_WAIT: Duration = Duration::from_secs(20);
const POPUP_WAIT: Duration = Duration::from_secs(5);

/// Why a session's inner loop ended.
enum SessionEnd {
    Lost,
    Interrupted,
}

/// Cooperative shutdown flag, set by the Ctrl-C watcher and checked at
/// loop-iteration boundaries.
struct Shutdown {
    flag: AtomicBool,
    notify: Notify,
}

impl Shutdown {
    fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    fn requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Sleep that wakes early when shutdown is requested.
    async fn sleep(&self, duration: Duration) {
        if self.requested() {
            return;
        }
        tokio::select! {
            _ = sleep(duration) => {}
            _ = self.notify.notified() => {}
        }
    }
}

pub struct Supervisor {
    config: SnowwatchConfig,
    log: Arc<LiveLog>,
    memory: DecisionMemory,
    roster: ShiftRoster,
    notifier: Notifier,
    prompt: CountdownPrompt,
    shutdown: Arc<Shutdown>,
}

impl Supervisor {
    pub fn new(
        config: SnowwatchConfig,
        log: Arc<LiveLog>,
        memory: DecisionMemory,
        roster: ShiftRoster,
    ) -> Self {
        let notifier = Notifier::new(config.monitor.sound_command.clone());
        Self {
            config,
            log,
            memory,
            roster,
            notifier,
            prompt: CountdownPrompt,
            shutdown: Arc::new(Shutdown::new()),
        }
    }

    pub async fn run(&mut self) -> Result<(), SnowwatchError> {
        if !self.config.has_credentials() {
            return Err(SnowwatchError::Startup(
                "credentials missing in configuration".to_string(),
            ));
        }

        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.trigger();
            }
        });

        let client = WebDriverClient::with_base_url(self.config.portal.webdriver_url.clone());

        while !self.shutdown.requested() {
            // NoSession: a session that cannot even open retries forever;
            // a login page that stopped matching is fatal.
            let session = match client.new_session().await {
                Ok(session) => session,
                Err(e) => {
                    self.log
                        .add(&format!("could not open a browser session: {e}"));
                    self.shutdown.sleep(self.config.triage.backoff()).await;
                    continue;
                }
            };

            if let Err(e) = self.login(&session).await {
                self.log.add(&format!("login failed: {e}"));
                let _ = session.close().await;
                return Err(SnowwatchError::Startup(format!("login failed: {e}")));
            }

            // Session: cycle until lost or interrupted.
            let end = self.drive_session(&session).await;
            let _ = session.close().await;
            match end {
                SessionEnd::Lost => {
                    self.log.add("restarting session");
                    self.shutdown.sleep(self.config.triage.backoff()).await;
                }
                SessionEnd::Interrupted => break,
            }
        }

        self.log.add("stopped by user");
        Ok(())
    }

    async fn login(&self, session: &Session) -> Result<(), DriverError> {
        self.log
            .add(&format!("launching browser (headed mode), session {}", session.id()));
        self.log.add("logging in");
        let pulse = ui::PollPulse::start("waiting for login form");
        let result = self.login_steps(session).await;
        pulse.finish();
        result
    }

    async fn login_steps(&self, session: &Session) -> Result<(), DriverError> {
        session.navigate(&self.config.portal.login_url()).await?;

        // Config popup is not shown on every visit.
        if let Ok(popup) = session.wait_for(POPUP_BUTTON, POPUP_WAIT).await {
            let _ = session.click(&popup).await;
            sleep(Duration::from_secs(2)).await;
        }
        sleep(Duration::from_secs(2)).await;

        let opener = session.wait_for(CORPORATE_OPENER, LOGIN_WAIT).await?;
        session.click(&opener).await?;
        sleep(Duration::from_secs(2)).await;

        let username = session.wait_for(USERNAME_INPUT, LOGIN_WAIT).await?;
        session
            .send_keys(&username, &self.config.portal.username)
            .await?;
        sleep(Duration::from_secs(1)).await;

        let password = session.find(PASSWORD_INPUT).await?;
        session
            .send_keys(&password, &self.config.portal.password)
            .await?;
        sleep(Duration::from_secs(1)).await;

        let button = session.find(LOGIN_BUTTON).await?;
        session.click(&button).await?;
        sleep(Duration::from_secs(2)).await;

        session.wait_url_contains(DASHBOARD_MARK, LOGIN_WAIT).await?;
        self.log.add("logged in successfully");
        Ok(())
    }

    async fn drive_session(&mut self, session: &Session) -> SessionEnd {
        loop {
            if self.shutdown.requested() {
                return SessionEnd::Interrupted;
            }

            match self.run_cycle(session).await {
                Ok(()) => {}
                Err(SnowwatchError::SessionLost(e)) => {
                    self.log.add(&format!("browser connection lost: {e}"));
                    return SessionEnd::Lost;
                }
                Err(e) => {
                    self.log.add(&format!("unexpected cycle error: {e}"));
                    self.shutdown.sleep(self.config.triage.backoff()).await;
                }
            }

            if self.shutdown.requested() {
                return SessionEnd::Interrupted;
            }
            let pulse = ui::PollPulse::start("waiting for next cycle");
            self.shutdown.sleep(self.config.triage.poll_interval()).await;
            pulse.finish();
        }
    }

    async fn run_cycle(&mut self, session: &Session) -> Result<(), SnowwatchError> {
        let log = self.log.as_ref();
        ui::banner(log, "checking for new tickets (cycle)");

        let tickets = scraper::scrape(
            session,
            &self.config.portal.list_url,
            &self.config.triage.ticket_prefix,
            log,
        )
        .await
        .map_err(SnowwatchError::from_driver)?;

        let time_now = chrono::Local::now().format("%H:%M:%S");
        if tickets.is_empty() {
            log.add(&format!("    (no tickets found) - {time_now}"));
            return Ok(());
        }
        log.add(&format!(
            "    active tickets found: {} - {time_now}",
            tickets.len()
        ));

        let portal = SnowPortal::new(
            session,
            &self.config.portal,
            self.config.triage.settle(),
            log,
        );
        for ticket in &tickets {
            let resolution = {
                let engine = TriageEngine {
                    portal: &portal,
                    prompt: &self.prompt,
                    memory: &self.memory,
                    roster: &self.roster,
                    notifier: &self.notifier,
                    log,
                    closed_states: &self.config.triage.closed_states,
                    prompt_timeout: self.config.triage.prompt_timeout(),
                };
                engine.triage(ticket).await
            };

            if let Resolution::Applied { choice, assignee } = resolution {
                self.memory.put(
                    &ticket.id,
                    MemoryRecord {
                        state_value: choice.value().to_string(),
                        state_name: choice.name().to_string(),
                        assignee,
                    },
                    &ticket.short_description,
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credentials_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut supervisor = Supervisor::new(
            SnowwatchConfig::default(),
            Arc::new(LiveLog::console_only()),
            DecisionMemory::load(dir.path().join("decisions.log")),
            ShiftRoster::new(Vec::new()),
        );

        let err = supervisor.run().await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_wakes_a_sleep_early() {
        let shutdown = Arc::new(Shutdown::new());
        let sleeper = shutdown.clone();
        let handle = tokio::spawn(async move {
            sleeper.sleep(Duration::from_secs(3600)).await;
        });

        // Let the sleeper park itself, then trigger.
        tokio::task::yield_now().await;
        shutdown.trigger();
        handle.await.unwrap();
        assert!(shutdown.requested());
    }

    #[tokio::test]
    async fn sleep_returns_immediately_after_shutdown() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        shutdown.sleep(Duration::from_secs(3600)).await;
    }
}
