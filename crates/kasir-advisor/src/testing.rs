//! Oracles for unit tests. No network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AdvisorError, AdvisorResult};
use crate::oracle::{Oracle, OracleRequest};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Timeout,
}

impl Reply {
    fn into_result(self) -> AdvisorResult<String> {
        match self {
            Reply::Text(text) => Ok(text),
            Reply::Timeout => Err(AdvisorError::Timeout),
        }
    }
}

/// Replies from a script, in order. Repeats the last reply when the script
/// runs out.
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<OracleRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedOracle {
    pub fn replying(text: &str) -> Self {
        Self::script(vec![Reply::Text(text.to_string())])
    }

    pub fn failing() -> Self {
        Self::script(vec![Reply::Timeout])
    }

    pub fn script(replies: Vec<Reply>) -> Self {
        ScriptedOracle {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Every call sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<OracleRequest> {
        self.prompts.lock().unwrap().last().cloned()
    }

    fn next_reply(&self) -> AdvisorResult<String> {
        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        reply.map_or(Err(AdvisorError::EmptyResponse), Reply::into_result)
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn generate(&self, request: OracleRequest) -> AdvisorResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_reply()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
