//! Test doubles shared by the flow tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::flows::FlowExecutor;
use crate::llm_client::{CompletionRequest, LlmBackend, LlmError};
use crate::tools::linkedin_scraper::{ProfileScraper, StubProfileScraper};
use crate::tools::ToolRegistry;

/// One scripted model turn.
pub enum Reply {
    /// Final answer text.
    Text(String),
    /// Calls a registered tool, then answers with `then`.
    CallTool {
        name: String,
        input: Value,
        then: String,
    },
    /// Provider outage.
    Unavailable,
}

/// `LlmBackend` that replays scripted replies and records every request.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmBackend for ScriptedLlm {
    async fn complete(
        &self,
        request: &CompletionRequest,
        tools: &ToolRegistry,
    ) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted reply left");
        match reply {
            Reply::Text(text) => Ok(text),
            Reply::CallTool { name, input, then } => {
                tools
                    .invoke(&name, input)
                    .await
                    .map_err(|e| LlmError::Tool {
                        name: name.clone(),
                        message: e.to_string(),
                    })?;
                Ok(then)
            }
            Reply::Unavailable => Err(LlmError::Api {
                status: 529,
                message: "Overloaded".into(),
            }),
        }
    }
}

pub fn executor(llm: &Arc<ScriptedLlm>) -> FlowExecutor {
    executor_with_scraper(llm, Arc::new(StubProfileScraper))
}

pub fn executor_with_scraper(
    llm: &Arc<ScriptedLlm>,
    scraper: Arc<dyn ProfileScraper>,
) -> FlowExecutor {
    FlowExecutor::new(llm.clone(), scraper, 50)
}

/// A job description long enough to pass the length check, mentioning `skills`.
pub fn long_jd(skills: &str) -> String {
    format!(
        "We are hiring a senior software engineer to build reliable backend services. \
         Required experience: {skills}."
    )
}
