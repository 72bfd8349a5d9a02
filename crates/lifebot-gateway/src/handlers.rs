//! REST endpoint handlers for the gateway.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML page with the command help |
//! | `GET` | `/api/session` | Latest session render |
//! | `POST` | `/api/messages` | Post a chat message without a socket |

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;
use lifebot_core::render::HELP_TEXT;
use lifebot_types::{ActorId, ChannelId};

use crate::error::GatewayError;
use crate::state::{AppState, InboundEvent};

/// Request body for `POST /api/messages`.
#[derive(Debug, serde::Deserialize)]
pub struct PostMessage {
    /// Raw message text.
    pub content: String,
    /// Channel to post in; a fresh one is used when absent.
    pub channel: Option<ChannelId>,
}

/// Escape the characters HTML treats specially.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page with the help text and the current render.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let help = escape_html(HELP_TEXT);
    let status = if snapshot.target.is_some() {
        "ACTIVE"
    } else {
        "IDLE"
    };
    let render = escape_html(&snapshot.content);

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Lifebot</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; }}
        pre {{
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem;
            white-space: pre-wrap;
        }}
        .status {{ color: #3fb950; font-weight: bold; }}
    </style>
</head>
<body>
    <h1>Lifebot</h1>
    <p>Session: <span class="status">{status}</span></p>
    <pre>{help}</pre>
    <pre>{render}</pre>
    <p>Connect a chat client to <code>/ws</code>; the latest render is at
    <a href="/api/session">/api/session</a>.</p>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/session
// ---------------------------------------------------------------------------

/// Return the latest session render.
pub async fn get_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await.clone();
    Json(snapshot)
}

// ---------------------------------------------------------------------------
// POST /api/messages
// ---------------------------------------------------------------------------

/// Queue a chat message as if it were posted on a connection.
///
/// Responds `202 Accepted` with the channel the message was posted in.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for empty content and
/// [`GatewayError::InboundClosed`] when the engine has stopped.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PostMessage>,
) -> Result<impl IntoResponse, GatewayError> {
    if body.content.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(String::from(
            "content must not be empty",
        )));
    }
    let channel = body.channel.unwrap_or_default();
    state
        .submit(InboundEvent::Message {
            channel,
            author: ActorId::new(),
            content: body.content,
        })
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "channel": channel })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_angle_brackets() {
        assert_eq!(escape_html("<w> & \"h\""), "&lt;w&gt; &amp; &quot;h&quot;");
    }
}
