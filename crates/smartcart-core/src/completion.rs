//! Completion client trait and shared error type.
//!
//! [`CompletionClient`] is the only point where SmartCart talks to a
//! language model. It takes a prompt and returns the model's text,
//! untouched. HTTP-backed implementations (Ollama, OpenAI-compatible)
//! live in the `smartcart` app crate; [`ScriptedCompletion`] here replays
//! canned responses for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single completion call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// The service could not be reached or rejected the request.
    #[error("completion service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The service did not answer within the configured bound.
    #[error("completion request timed out after {0:?}")]
    Timeout(Duration),
}

impl CompletionError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }
}

/// Text-completion capability.
///
/// One prompt in, one completion out. Implementations must bound the time
/// spent waiting on the service and report an expired bound as
/// [`CompletionError::Timeout`].
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the model identifier used for completions (e.g. `"llama3.2"`).
    fn model_name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Completion client that replays a fixed script of outcomes.
///
/// Each call pops the next scripted outcome; once the script is exhausted
/// every further call fails with [`CompletionError::ServiceUnavailable`].
/// All received prompts are recorded in order.
#[derive(Default)]
pub struct ScriptedCompletion {
    script: Mutex<VecDeque<Result<String, CompletionError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose every call returns one of `responses`, in order.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::new();
        for r in responses {
            client.push_response(r);
        }
        client
    }

    pub fn push_response(&self, response: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Ok(response.into()));
        }
    }

    pub fn push_error(&self, err: CompletionError) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Err(err));
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.script
            .lock()
            .map_err(|_| CompletionError::unavailable("script lock poisoned"))?
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::unavailable("no scripted response left")))
    }
}
