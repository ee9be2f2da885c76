//! Ticket portal: the seam between the decision engine and the incident
//! form. [`TicketPortal`] is the capability the engine needs (open a
//! ticket for inspection, apply a resolution); [`SnowPortal`] is the
//! ServiceNow implementation driving the WebDriver session. Tests script
//! the trait instead.

use std::time::Duration;

use serde_json::json;
use tokio::time::sleep;

use crate::config::PortalConfig;
use crate::livelog::LiveLog;
use crate::webdriver::{DriverError, Session};

const TICKET_FRAME: &str = "#gsft_main";
const NUMBER_FIELD: &str = r#"[id="sys_readonly.incident.number"]"#;
const STATE_FIELD: &str = r#"[id="incident.state"]"#;
const DESCRIPTION_FIELD: &str = r#"[id="incident.short_description"]"#;
const ASSIGNEE_FIELD: &str = r#"[id="sys_display.incident.assigned_to"]"#;

const SET_STATE_SCRIPT: &str = "document.getElementById('incident.state').value = arguments[0];";
const SUBMIT_SCRIPT: &str =
    "gsftSubmit(document.getElementById('sysverb_update_and_stay'));";

const FRAME_WAIT: Duration = Duration::from_secs(5);
const FORM_WAIT: Duration = Duration::from_secs(20);

/// What the engine needs to know about an open ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketView {
    /// Current state code as rendered in the form.
    pub state_value: String,
    /// Description read off the form (the list view may not have had one).
    pub short_description: String,
}

pub trait TicketPortal {
    /// Open the ticket in the work window and read its current state.
    async fn inspect(&self, ticket_id: &str) -> Result<TicketView, DriverError>;

    /// Set the state (and optionally the assignee), then submit-and-stay.
    async fn apply(
        &self,
        ticket_id: &str,
        state_value: &str,
        state_name: &str,
        assignee: Option<&str>,
    ) -> Result<(), DriverError>;
}

/// Drives the incident form through the live WebDriver session.
pub struct SnowPortal<'a> {
    session: &'a Session,
    config: &'a PortalConfig,
    settle: Duration,
    log: &'a LiveLog,
}

impl<'a> SnowPortal<'a> {
    pub fn new(
        session: &'a Session,
        config: &'a PortalConfig,
        settle: Duration,
        log: &'a LiveLog,
    ) -> Self {
        Self {
            session,
            config,
            settle,
            log,
        }
    }

    /// Bring the work window (second tab, created on demand) onto the
    /// ticket form and wait for it to render.
    async fn open(&self, ticket_id: &str) -> Result<(), DriverError> {
        let handles = self.session.window_handles().await?;
        let work = match handles.get(1) {
            Some(handle) => handle.clone(),
            None => self.session.new_window().await?,
        };
        self.session.switch_window(&work).await?;
        self.session
            .navigate(&self.config.ticket_url(ticket_id))
            .await?;

        // The form usually renders inside the gsft_main frame, but not on
        // every portal theme.
        if let Ok(frame) = self.session.wait_for(TICKET_FRAME, FRAME_WAIT).await {
            let _ = self.session.switch_frame(&frame).await;
        }
        self.session.wait_for(NUMBER_FIELD, FORM_WAIT).await?;
        Ok(())
    }

    async fn set_and_submit(
        &self,
        state_value: &str,
        state_name: &str,
        assignee: Option<&str>,
    ) -> Result<(), DriverError> {
        self.session
            .execute(SET_STATE_SCRIPT, vec![json!(state_value)])
            .await?;

        if let Some(assignee) = assignee {
            // Assignee field missing on this form variant is tolerated.
            if let Ok(field) = self.session.find(ASSIGNEE_FIELD).await {
                self.session.clear(&field).await?;
                sleep(Duration::from_millis(500)).await;
                self.session.send_keys(&field, assignee).await?;
                sleep(Duration::from_secs(1)).await;
                self.session
                    .send_keys(&field, crate::webdriver::keys::TAB)
                    .await?;
            }
        }

        self.log.add(&format!("    saving {state_name}"));
        self.session.execute(SUBMIT_SCRIPT, vec![]).await?;
        sleep(self.settle).await;
        self.log.add("    update successful");
        Ok(())
    }
}

impl TicketPortal for SnowPortal<'_> {
    async fn inspect(&self, ticket_id: &str) -> Result<TicketView, DriverError> {
        self.open(ticket_id).await?;

        let state_field = self.session.find(STATE_FIELD).await?;
        let state_value = self.session.property(&state_field, "value").await?;

        let short_description = match self.session.find(DESCRIPTION_FIELD).await {
            Ok(field) => self
                .session
                .property(&field, "value")
                .await
                .unwrap_or_default(),
            Err(_) => String::new(),
        };

        Ok(TicketView {
            state_value,
            short_description,
        })
    }

    async fn apply(
        &self,
        ticket_id: &str,
        state_value: &str,
        state_name: &str,
        assignee: Option<&str>,
    ) -> Result<(), DriverError> {
        // Reuse the form when the work window is already on this ticket
        // (the interactive path inspected it moments ago).
        let on_ticket = self
            .session
            .current_url()
            .await
            .map(|url| url.contains(ticket_id))
            .unwrap_or(false);
        if !on_ticket {
            self.open(ticket_id).await?;
        }
        self.set_and_submit(state_value, state_name, assignee).await
    }
}
