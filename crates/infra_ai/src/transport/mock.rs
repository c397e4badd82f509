//! Scripted transports for tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::Transport;
use crate::error::TransportError;
use crate::prompt::Prompt;

/// Replays a fixed script of replies, repeating the last one when exhausted
#[derive(Debug)]
pub struct ScriptedTransport {
    name: String,
    script: Mutex<VecDeque<Result<Value, TransportError>>>,
    last: Mutex<Option<Result<Value, TransportError>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedTransport {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            delay: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `envelope`
    pub fn replying(name: &str, envelope: Value) -> Self {
        Self::new(name).then_reply(envelope)
    }

    /// Always answers with model text wrapped as a bare string envelope
    pub fn replying_text(name: &str, text: &str) -> Self {
        Self::replying(name, Value::String(text.to_string()))
    }

    /// Always fails with `error`
    pub fn failing(name: &str, error: TransportError) -> Self {
        Self::new(name).then_fail(error)
    }

    pub fn then_reply(self, envelope: Value) -> Self {
        self.push(Ok(envelope))
    }

    pub fn then_fail(self, error: TransportError) -> Self {
        self.push(Err(error))
    }

    /// Sleeps before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn push(self, reply: Result<Value, TransportError>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(reply);
        }
        self
    }

    fn next_reply(&self) -> Result<Value, TransportError> {
        let next = self.script.lock().ok().and_then(|mut script| script.pop_front());
        let mut last = match self.last.lock() {
            Ok(last) => last,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(reply) = next {
            *last = Some(reply);
        }
        last.clone().unwrap_or_else(|| {
            Err(TransportError::Configuration(format!("{} has no scripted reply", self.name)))
        })
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, prompt: &Prompt) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_reply()
    }
}
