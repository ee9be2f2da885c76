//! Optional status HTTP endpoint: a phone-friendly dashboard over the
//! in-memory log buffer.
//!
//! `GET /` serves the static dashboard page, `GET /api/logs` returns the
//! buffer as `{"logs": "..."}`; everything else is 404. The page polls at a
//! fixed 1-second interval. There is no request logging: the endpoint must
//! not feed the very buffer it serves.

use std::net::UdpSocket;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};

use crate::livelog::LiveLog;
use crate::ui;

/// Best-effort LAN address for the startup banner. The UDP connect trick
/// sends no packet; failure falls back to localhost.
pub fn local_ip() -> String {
    let Ok(socket) = UdpSocket::bind("0.0.0.0:0") else {
        return "localhost".to_string();
    };
    if socket.connect("8.8.8.8:80").is_err() {
        return "localhost".to_string();
    }
    socket
        .local_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "localhost".to_string())
}

/// Record the reachable address in the log (and therefore on the page).
pub fn announce(log: &LiveLog, port: u16) {
    let ip = local_ip();
    log.add("");
    log.add(&ui::heavy_divider());
    log.add(&ui::centered("STATUS ENDPOINT - LIVE LOG VIEWER"));
    log.add(&ui::heavy_divider());
    log.add(&format!("   -> local network: http://{ip}:{port}"));
    log.add("   ensure phone and workstation share the same network");
    log.add(&ui::heavy_divider());
    log.add("");
}

/// Start serving in the background. Bind or serve failures are narrated,
/// never fatal to the triage loop.
pub fn spawn(port: u16, log: Arc<LiveLog>) {
    tokio::spawn(async move {
        if let Err(e) = serve(port, log.clone()).await {
            log.add(&format!("    status endpoint error: {e}"));
        }
    });
}

async fn serve(port: u16, log: Arc<LiveLog>) -> anyhow::Result<()> {
    let app = router(log);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(log: Arc<LiveLog>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/logs", get(api_logs))
        .fallback(not_found)
        .with_state(log)
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn api_logs(State(log): State<Arc<LiveLog>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "logs": log.get_all() }))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>snowwatch live monitor</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: 'Courier New', monospace;
            background: #0a0e27;
            color: #00ff88;
            padding: 15px;
            height: 100vh;
            overflow: hidden;
            display: flex;
            flex-direction: column;
        }
        .header {
            text-align: center;
            margin-bottom: 15px;
            font-weight: bold;
            font-size: 16px;
            color: #ff6b6b;
            border-bottom: 2px solid #00ff88;
            padding-bottom: 10px;
        }
        .status {
            font-size: 12px;
            color: #00ccff;
            margin-bottom: 10px;
            text-align: center;
        }
        .logs-container {
            flex: 1;
            overflow-y: auto;
            border: 2px solid #00ff88;
            background: #0d1117;
            padding: 12px;
            border-radius: 5px;
            font-size: 12px;
            line-height: 1.6;
        }
        .log-line { margin: 3px 0; white-space: pre-wrap; word-break: break-word; }
        .error { color: #ff4444; }
        .success { color: #44ff44; }
        .warning { color: #ffaa00; }
        .info { color: #4488ff; }
        .action { color: #ff88ff; }
    </style>
</head>
<body>
    <div class="header">SNOWWATCH LIVE MONITOR</div>
    <div class="status">Status: <span id="status">Connecting...</span></div>
    <div class="logs-container" id="logs">Loading logs...</div>

    <script>
        let lastLength = 0;

        function colorize(text) {
            const lower = text.toLowerCase();
            if (lower.includes('error') || lower.includes('failed')) {
                return `<span class="error">${escapeHtml(text)}</span>`;
            }
            if (lower.includes('successful') || lower.includes('applied')) {
                return `<span class="success">${escapeHtml(text)}</span>`;
            }
            if (lower.includes('timeout') || lower.includes('stale') || lower.includes('skip')) {
                return `<span class="warning">${escapeHtml(text)}</span>`;
            }
            if (text.includes('ACTION REQUIRED')) {
                return `<span class="action">${escapeHtml(text)}</span>`;
            }
            return `<span class="info">${escapeHtml(text)}</span>`;
        }

        function escapeHtml(text) {
            const div = document.createElement('div');
            div.textContent = text;
            return div.innerHTML;
        }

        function fetchLogs() {
            fetch('/api/logs?t=' + Date.now())
                .then(r => r.json())
                .then(data => {
                    document.getElementById('status').innerText = 'Connected';
                    document.getElementById('status').style.color = '#00ff88';

                    const container = document.getElementById('logs');
                    const lines = data.logs.split('\n').filter(l => l.trim());

                    if (lines.length > lastLength) {
                        container.innerHTML = lines.map((line) => {
                            return `<div class="log-line">${colorize(line)}</div>`;
                        }).join('');
                        lastLength = lines.length;

                        setTimeout(() => {
                            container.scrollTop = container.scrollHeight;
                        }, 10);
                    }
                })
                .catch(err => {
                    document.getElementById('status').innerText = 'Disconnected';
                    document.getElementById('status').style.color = '#ff4444';
                });
        }

        fetchLogs();
        setInterval(fetchLogs, 1000);
    </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn api_logs_snapshots_the_buffer() {
        let log = Arc::new(LiveLog::console_only());
        log.record("first");
        log.record("second");

        let Json(body) = api_logs(State(log)).await;
        assert_eq!(body["logs"], "first\nsecond");
    }

    #[tokio::test]
    async fn unknown_paths_are_404() {
        assert_eq!(not_found().await, StatusCode::NOT_FOUND);
    }

    #[test]
    fn local_ip_is_never_empty() {
        assert!(!local_ip().is_empty());
    }

    #[test]
    fn dashboard_polls_the_logs_api() {
        assert!(DASHBOARD_HTML.contains("/api/logs"));
        assert!(DASHBOARD_HTML.contains("setInterval(fetchLogs, 1000)"));
    }
}
