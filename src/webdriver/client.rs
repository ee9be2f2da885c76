use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::{Value, json};
use tokio::time::sleep;

use super::error::DriverError;
use super::types::{
    ELEMENT_KEY, ElementRef, Envelope, ErrorEnvelope, NewSessionValue, NewWindowValue,
};

const WAIT_PROBE_INTERVAL: Duration = Duration::from_millis(250);

/// WebDriver key codes accepted by `send_keys`.
pub mod keys {
    pub const TAB: &str = "\u{E004}";
}

/// Entry point to the WebDriver endpoint. Creates [`Session`]s; everything
/// else happens on the session.
pub struct WebDriverClient {
    client: Client,
    base_url: String,
}

impl WebDriverClient {
    /// Create a client pointing at the configured driver URL (tests point
    /// this at a mock server).
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Open a new headed browser session sized for the incident list.
    pub async fn new_session(&self) -> Result<Session, DriverError> {
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": ["--window-size=1920,1080", "--disable-gpu", "--no-sandbox"],
                        "excludeSwitches": ["enable-automation", "enable-logging"]
                    }
                }
            }
        });
        let response = self
            .client
            .post(format!("{}/session", self.base_url))
            .json(&body)
            .send()
            .await?;
        let value = decode(response).await?;
        let created: NewSessionValue = serde_json::from_value(value).map_err(invalid_payload)?;
        Ok(Session {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            id: created.session_id,
        })
    }
}

/// One live automation session. Owns the session id; `close` consumes the
/// handle so a dead session cannot be reused by accident.
pub struct Session {
    client: Client,
    base_url: String,
    id: String,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.base_url, self.id, path)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, DriverError> {
        let response = self.client.post(self.url(path)).json(&body).send().await?;
        decode(response).await
    }

    async fn get(&self, path: &str) -> Result<Value, DriverError> {
        let response = self.client.get(self.url(path)).send().await?;
        decode(response).await
    }

    pub async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.post("/url", json!({ "url": url })).await.map(|_| ())
    }

    pub async fn current_url(&self) -> Result<String, DriverError> {
        let value = self.get("/url").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn find(&self, css: &str) -> Result<ElementRef, DriverError> {
        let value = self.post("/element", locator(css)).await?;
        serde_json::from_value(value).map_err(invalid_payload)
    }

    pub async fn find_all(&self, css: &str) -> Result<Vec<ElementRef>, DriverError> {
        let value = self.post("/elements", locator(css)).await?;
        serde_json::from_value(value).map_err(invalid_payload)
    }

    /// Element-scoped find, for reading cells out of a located row.
    pub async fn find_within(
        &self,
        el: &ElementRef,
        css: &str,
    ) -> Result<Vec<ElementRef>, DriverError> {
        let value = self
            .post(&format!("/element/{}/elements", el.id), locator(css))
            .await?;
        serde_json::from_value(value).map_err(invalid_payload)
    }

    pub async fn text(&self, el: &ElementRef) -> Result<String, DriverError> {
        let value = self.get(&format!("/element/{}/text", el.id)).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Read a DOM property (e.g. the live `value` of an input).
    pub async fn property(&self, el: &ElementRef, name: &str) -> Result<String, DriverError> {
        let value = self
            .get(&format!("/element/{}/property/{}", el.id, name))
            .await?;
        Ok(match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    pub async fn click(&self, el: &ElementRef) -> Result<(), DriverError> {
        self.post(&format!("/element/{}/click", el.id), json!({}))
            .await
            .map(|_| ())
    }

    pub async fn clear(&self, el: &ElementRef) -> Result<(), DriverError> {
        self.post(&format!("/element/{}/clear", el.id), json!({}))
            .await
            .map(|_| ())
    }

    pub async fn send_keys(&self, el: &ElementRef, text: &str) -> Result<(), DriverError> {
        self.post(&format!("/element/{}/value", el.id), json!({ "text": text }))
            .await
            .map(|_| ())
    }

    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.post("/execute/sync", json!({ "script": script, "args": args }))
            .await
    }

    pub async fn window_handles(&self) -> Result<Vec<String>, DriverError> {
        let value = self.get("/window/handles").await?;
        serde_json::from_value(value).map_err(invalid_payload)
    }

    pub async fn switch_window(&self, handle: &str) -> Result<(), DriverError> {
        self.post("/window", json!({ "handle": handle }))
            .await
            .map(|_| ())
    }

    pub async fn new_window(&self) -> Result<String, DriverError> {
        let value = self.post("/window/new", json!({ "type": "tab" })).await?;
        let created: NewWindowValue = serde_json::from_value(value).map_err(invalid_payload)?;
        Ok(created.handle)
    }

    pub async fn switch_frame(&self, el: &ElementRef) -> Result<(), DriverError> {
        self.post("/frame", json!({ "id": { (ELEMENT_KEY): el.id } }))
            .await
            .map(|_| ())
    }

    /// End the session. Errors are returned but the handle is gone either way.
    pub async fn close(self) -> Result<(), DriverError> {
        let response = self.client.delete(self.url("")).send().await?;
        decode(response).await.map(|_| ())
    }

    /// Poll for an element until it appears or the deadline passes.
    pub async fn wait_for(
        &self,
        css: &str,
        timeout: Duration,
    ) -> Result<ElementRef, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find(css).await {
                Ok(el) => return Ok(el),
                Err(DriverError::NoSuchElement(_)) | Err(DriverError::StaleElement) => {
                    if Instant::now() >= deadline {
                        return Err(DriverError::Timeout(css.to_string()));
                    }
                    sleep(WAIT_PROBE_INTERVAL).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Poll the current URL until it contains `needle` or the deadline passes.
    pub async fn wait_url_contains(
        &self,
        needle: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.current_url().await?.contains(needle) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout(format!("url containing {needle}")));
            }
            sleep(WAIT_PROBE_INTERVAL).await;
        }
    }
}

fn locator(css: &str) -> Value {
    json!({ "using": "css selector", "value": css })
}

fn invalid_payload(e: serde_json::Error) -> DriverError {
    DriverError::Protocol {
        status: 200,
        error: "invalid response payload".to_string(),
        message: e.to_string(),
    }
}

async fn decode(response: reqwest::Response) -> Result<Value, DriverError> {
    let status = response.status();
    if status.is_success() {
        let envelope = response.json::<Envelope>().await?;
        return Ok(envelope.value);
    }
    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => Err(DriverError::from_wire(status.as_u16(), envelope.value)),
        Err(e) => Err(DriverError::Protocol {
            status: status.as_u16(),
            error: "unreadable error body".to_string(),
            message: e.to_string(),
        }),
    }
}
