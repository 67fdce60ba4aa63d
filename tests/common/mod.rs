//! Scripted model gateway shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use lexsim::adapters::ChatTurn;
use lexsim::{GatewayError, ModelGateway};

/// Reply a scripted call produces
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Empty,
    Fail(u16),
}

/// One recorded generation call
#[derive(Debug, Clone)]
pub struct GenerateCall {
    pub instruction: String,
    pub context: String,
}

/// One recorded chat call
#[derive(Debug, Clone)]
pub struct ChatCall {
    pub history: Vec<ChatTurn>,
    pub message: String,
    pub context: String,
}

/// Gateway that answers from a script and records every call
#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Reply>>,
    generate_calls: Mutex<Vec<GenerateCall>>,
    chat_calls: Mutex<Vec<ChatCall>>,
    calls: AtomicUsize,
    gate: Mutex<Option<Arc<Gate>>>,
}

/// Holds a call open until released
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue replies; when the queue is empty calls answer "generated"
    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        let gateway = Self::default();
        gateway.replies.lock().unwrap().extend(replies);
        Arc::new(gateway)
    }

    /// Make the next call wait on the returned gate
    pub fn hold_next(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn push_reply(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn generate_calls(&self) -> Vec<GenerateCall> {
        self.generate_calls.lock().unwrap().clone()
    }

    pub fn chat_calls(&self) -> Vec<ChatCall> {
        self.chat_calls.lock().unwrap().clone()
    }

    async fn answer(&self) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let reply = self.replies.lock().unwrap().pop_front();
        match reply.unwrap_or_else(|| Reply::Text("generated".to_string())) {
            Reply::Text(text) => Ok(text),
            Reply::Empty => Ok(String::new()),
            Reply::Fail(status) => Err(GatewayError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, instruction: &str, context: &str) -> Result<String, GatewayError> {
        self.generate_calls.lock().unwrap().push(GenerateCall {
            instruction: instruction.to_string(),
            context: context.to_string(),
        });
        self.answer().await
    }

    async fn chat(
        &self,
        history: &[ChatTurn],
        message: &str,
        context: &str,
    ) -> Result<String, GatewayError> {
        self.chat_calls.lock().unwrap().push(ChatCall {
            history: history.to_vec(),
            message: message.to_string(),
            context: context.to_string(),
        });
        self.answer().await
    }
}
