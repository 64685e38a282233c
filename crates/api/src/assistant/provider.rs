//! HTTP-backed completion provider.
//!
//! [`HttpCompletionProvider`] talks to the configured assistant service:
//! plain JSON for chat completions, Server-Sent Events for thesis-section
//! streaming. SSE payload lines (`data: ...`) are forwarded verbatim; the
//! terminator `data: [DONE]` ends the stream.

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};

/// Errors surfaced by a completion provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("assistant request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("assistant returned an unusable response")]
    InvalidResponse,
}

/// One turn of a conversation, in provider wire format.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderMessage {
    pub rol: String,
    pub contenido: String,
}

/// Request for generating one thesis section draft.
#[derive(Debug, Clone, Serialize)]
pub struct SectionRequest {
    pub seccion: String,
    pub titulo: String,
    pub descripcion: String,
}

/// Chunked section output as it arrives from the provider.
pub type SectionStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Seam for the external completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Produce one assistant reply for the given conversation history.
    async fn complete(&self, mensajes: &[ProviderMessage]) -> Result<String, ProviderError>;

    /// Stream a thesis-section draft chunk by chunk.
    async fn stream_section(&self, request: &SectionRequest)
        -> Result<SectionStream, ProviderError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Timeout for non-streaming completion calls.
const COMPLETION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    contenido: String,
}

/// Provider backed by the external assistant HTTP service.
pub struct HttpCompletionProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpCompletionProvider {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(COMPLETION_TIMEOUT_SECS))
            .build()
            .expect("reqwest client construction cannot fail with static config");
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(format!("{}{path}", self.base_url));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }
}

#[async_trait]
impl CompletionProvider for HttpCompletionProvider {
    async fn complete(&self, mensajes: &[ProviderMessage]) -> Result<String, ProviderError> {
        let response = self
            .request("/v1/completions")
            .json(&serde_json::json!({ "mensajes": mensajes }))
            .send()
            .await?
            .error_for_status()?;

        let body: CompletionResponse = response.json().await?;
        if body.contenido.is_empty() {
            return Err(ProviderError::InvalidResponse);
        }
        Ok(body.contenido)
    }

    async fn stream_section(
        &self,
        request: &SectionRequest,
    ) -> Result<SectionStream, ProviderError> {
        let response = self
            .request("/v1/secciones/stream")
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        let inner = response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()))
            .boxed();

        Ok(Box::pin(sse_data_stream(inner)))
    }
}

// ---------------------------------------------------------------------------
// SSE parsing
// ---------------------------------------------------------------------------

struct SseState {
    inner: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    buffer: String,
    pending: VecDeque<Result<String, ProviderError>>,
    done: bool,
}

/// Turn a raw byte stream of SSE lines into a stream of `data:` payloads.
///
/// Stops at `data: [DONE]`; a transport error is yielded once and ends the
/// stream.
fn sse_data_stream(
    inner: BoxStream<'static, reqwest::Result<Vec<u8>>>,
) -> impl Stream<Item = Result<String, ProviderError>> + Send {
    let state = SseState {
        inner,
        buffer: String::new(),
        pending: VecDeque::new(),
        done: false,
    };

    futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                return Some((item, st));
            }
            if st.done {
                return None;
            }
            match st.inner.next().await {
                Some(Ok(chunk)) => {
                    st.buffer.push_str(&String::from_utf8_lossy(&chunk));
                    let (lines, done) = drain_data_lines(&mut st.buffer);
                    st.pending.extend(lines.into_iter().map(Ok));
                    st.done = done;
                }
                Some(Err(e)) => {
                    st.done = true;
                    st.pending.push_back(Err(ProviderError::Http(e)));
                }
                None => {
                    st.done = true;
                }
            }
        }
    })
}

/// Extract complete `data:` payloads from the buffer, leaving any partial
/// trailing line in place. Returns the payloads and whether the `[DONE]`
/// terminator was seen.
fn drain_data_lines(buffer: &mut String) -> (Vec<String>, bool) {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.find('\n') {
        let line: String = buffer.drain(..=pos).collect();
        let line = line.trim();
        if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim();
            if data == "[DONE]" {
                buffer.clear();
                return (lines, true);
            }
            if !data.is_empty() {
                lines.push(data.to_string());
            }
        }
    }
    (lines, false)
}
