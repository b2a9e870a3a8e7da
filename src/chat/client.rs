//! Ollama chat client
//!
//! Talks to the native `/api/chat` endpoint. Non-streaming calls return the
//! whole reply; streaming calls decode newline-delimited JSON chunks on a
//! background task and forward tokens over a channel.

use super::ChatMessage;
use crate::{AliceError, Result};
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const MAX_RETRY_ATTEMPTS: u32 = 4;
const RETRY_BASE_DELAY_MS: u64 = 200;
/// Whole-request timeout for non-streaming calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_ERROR_DETAIL_CHARS: usize = 500;

/// Streaming event from the model
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Next piece of reply text
    Token(String),
    /// Stream finished normally
    Done,
    /// Stream failed midway
    Error(String),
}

// ─── Wire types ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

// ─── Client ─────────────────────────────────────────────────────────

pub struct ChatClient {
    client: Client,
    base_url: String,
    model: String,
}

impl ChatClient {
    pub fn new(host: &str, model: &str) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("alice/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        let base_url = host.trim_end_matches('/').to_string();
        info!("Chat client: model={}, base_url={}", model, base_url);

        Self {
            client,
            base_url,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    /// Exponential backoff with a little deterministic jitter
    fn retry_backoff(attempt: u32) -> Duration {
        let exp = 2u64.saturating_pow(attempt.saturating_sub(1));
        let base_ms = RETRY_BASE_DELAY_MS.saturating_mul(exp);
        let jitter = 1.0 + ((attempt as f64 * 0.37).sin() * 0.1);
        Duration::from_millis((base_ms as f64 * jitter) as u64)
    }

    fn is_retryable_error(msg: &str) -> bool {
        msg.contains("timeout")
            || msg.contains("network")
            || msg.contains("retryable")
            || msg.contains("error sending request")
            || msg.contains("connection")
    }

    /// Send the request, retrying transient failures. Returns a response
    /// with a success status.
    async fn send_with_retry(
        &self,
        messages: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            stream,
        };

        let mut last_err = None;
        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                let delay = Self::retry_backoff(attempt);
                warn!(
                    "Chat request failed (attempt {}/{}), retrying in {:?}...",
                    attempt, MAX_RETRY_ATTEMPTS, delay
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(self.chat_url()).json(&body);
            if !stream {
                request = request.timeout(REQUEST_TIMEOUT);
            }

            let result = match request.send().await {
                Ok(response) => Self::check_response_status(response).await,
                Err(e) => Err(Self::map_reqwest_error(e)),
            };

            match result {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if Self::is_retryable_error(&e.to_string()) && attempt + 1 < MAX_RETRY_ATTEMPTS {
                        last_err = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| AliceError::Chat("all retry attempts exhausted".to_string())))
    }

    async fn check_response_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = truncate_error_detail(&extract_error_detail(&body), MAX_ERROR_DETAIL_CHARS);
        let prefix = if status.is_server_error() {
            "retryable API error"
        } else {
            "API error"
        };
        if detail.is_empty() {
            Err(AliceError::Chat(format!("{prefix} {status}")))
        } else {
            Err(AliceError::Chat(format!("{prefix} {status}: {detail}")))
        }
    }

    fn map_reqwest_error(e: reqwest::Error) -> AliceError {
        if e.is_timeout() {
            AliceError::Chat(format!("timeout: {e}"))
        } else if e.is_connect() {
            AliceError::Chat(format!("network: {e}"))
        } else {
            AliceError::Chat(e.to_string())
        }
    }

    /// Full reply in one response.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!("Chat request with {} messages", messages.len());
        let response = self.send_with_retry(messages, false).await?;
        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| AliceError::Chat(e.to_string()))?;
        if let Some(error) = reply.error {
            return Err(AliceError::Chat(error));
        }
        Ok(reply.message.map(|m| m.content).unwrap_or_default())
    }

    /// Stream the reply token by token.
    pub async fn chat_stream(&self, messages: &[ChatMessage]) -> Result<mpsc::Receiver<ChatEvent>> {
        debug!("Streaming chat request with {} messages", messages.len());
        let response = self.send_with_retry(messages, true).await?;

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(forward_stream(response.bytes_stream(), tx));
        Ok(rx)
    }
}

/// Error sent when the body ends before a `done` chunk
pub const STREAM_ENDED_EARLY: &str = "stream ended early";

/// Decode an NDJSON body and forward its events. Exactly one terminal event
/// (`Done` or `Error`) is sent unless the receiver goes away first.
pub async fn forward_stream<S, B, E>(stream: S, tx: mpsc::Sender<ChatEvent>)
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut stream = Box::pin(stream);
    let mut decoder = LineDecoder::default();

    while let Some(chunk) = stream.next().await {
        let lines = match chunk {
            Ok(bytes) => decoder.push(bytes.as_ref()),
            Err(e) => {
                let _ = tx.send(ChatEvent::Error(e.to_string())).await;
                return;
            }
        };
        for line in lines {
            if let Some(event) = parse_stream_line(&line) {
                let finished = !matches!(event, ChatEvent::Token(_));
                if tx.send(event).await.is_err() || finished {
                    return;
                }
            }
        }
    }

    if let Some(event) = decoder.finish().and_then(|line| parse_stream_line(&line)) {
        let finished = !matches!(event, ChatEvent::Token(_));
        if tx.send(event).await.is_err() || finished {
            return;
        }
    }
    warn!("Chat stream closed without a done chunk");
    let _ = tx.send(ChatEvent::Error(STREAM_ENDED_EARLY.to_string())).await;
}

/// Splits a byte stream into complete lines, carrying partial lines (and
/// partial UTF-8 sequences) across chunks.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line).trim().to_string();
            if !text.is_empty() {
                lines.push(text);
            }
        }
        lines
    }

    /// Whatever is left once the stream ends.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let text = String::from_utf8_lossy(&rest).trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

/// Decode one NDJSON line of a streaming reply.
pub fn parse_stream_line(line: &str) -> Option<ChatEvent> {
    let chunk = match serde_json::from_str::<ChatResponse>(line) {
        Ok(chunk) => chunk,
        Err(e) => {
            warn!("Dropping unparsable stream line: {}", e);
            return None;
        }
    };

    if let Some(error) = chunk.error {
        return Some(ChatEvent::Error(error));
    }
    if chunk.done {
        return Some(ChatEvent::Done);
    }
    chunk
        .message
        .map(|m| m.content)
        .filter(|content| !content.is_empty())
        .map(ChatEvent::Token)
}

fn extract_error_detail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(msg) = value.get("error").and_then(|e| e.as_str()) {
            return msg.to_string();
        }
        if let Some(msg) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
    }

    trimmed.to_string()
}

fn truncate_error_detail(detail: &str, max_chars: usize) -> String {
    if detail.chars().count() <= max_chars {
        return detail.to_string();
    }

    let mut truncated = detail.chars().take(max_chars).collect::<String>();
    truncated.push_str("... [truncated]");
    truncated
}
