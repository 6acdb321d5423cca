//! Shared fixtures and helpers for tests.
//!
//! Available with the `test-support` feature or when running this crate's own
//! tests. The fakes record what they were asked to do so tests can assert on
//! inputs as well as outputs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use a2a_types::{AgentSkill, Message, MessageRole, Part, Task};

use crate::capability::ResponseCapability;
use crate::errors::{AgentError, AgentResult};
use crate::event::{BusSignal, TaskEvent};
use crate::event_bus::{EventBus, SequenceGuard};
use crate::models::{BaseLlm, LlmRequest, LlmResponse, TokenUsage};

pub const FAKE_SKILL_ID: &str = "fake-skill";

/// A language model that returns pre-seeded responses.
///
/// When responses run out the fake returns an internal error so a missing
/// expectation is obvious.
#[derive(Clone, Default)]
pub struct FakeLlm {
    responses: Arc<Mutex<VecDeque<AgentResult<LlmResponse>>>>,
    calls: Arc<Mutex<Vec<LlmRequest>>>,
}

impl FakeLlm {
    #[must_use]
    pub fn with_responses<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = AgentResult<LlmResponse>>,
    {
        Self {
            responses: Arc::new(Mutex::new(responses.into_iter().collect())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn text_response(text: impl Into<String>) -> AgentResult<LlmResponse> {
        Ok(LlmResponse::new(text, TokenUsage::default()))
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<LlmRequest> {
        self.calls
            .lock()
            .expect("fake LLM calls mutex poisoned")
            .clone()
    }
}

#[async_trait::async_trait]
impl BaseLlm for FakeLlm {
    fn model_name(&self) -> &str {
        "fake-llm"
    }

    async fn generate_content(&self, request: LlmRequest) -> AgentResult<LlmResponse> {
        self.calls
            .lock()
            .expect("fake LLM calls mutex poisoned")
            .push(request);

        self.responses
            .lock()
            .expect("fake LLM responses mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(AgentError::Internal {
                    component: "fake_llm".to_string(),
                    reason: "no response queued".to_string(),
                })
            })
    }
}

/// Scripted behaviour for one [`FakeCapability`] call.
pub enum FakeReply {
    Text(String),
    Error(AgentError),
    /// Sleeps before answering; used to exercise timeouts and cancellation.
    Delayed(Duration, String),
    Panic(String),
}

/// A response capability driven by queued [`FakeReply`] values.
///
/// With nothing queued it answers `Mock response to: <text>`.
#[derive(Clone, Default)]
pub struct FakeCapability {
    replies: Arc<Mutex<VecDeque<FakeReply>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeCapability {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_replies<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = FakeReply>,
    {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails every call with a generation error carrying `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_replies([FakeReply::Error(AgentError::Generation(message.into()))])
    }

    /// Texts the capability was invoked with, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("fake capability calls mutex poisoned")
            .clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .expect("fake capability calls mutex poisoned")
            .len()
    }
}

#[async_trait::async_trait]
impl ResponseCapability for FakeCapability {
    fn skill(&self) -> AgentSkill {
        AgentSkill::new(FAKE_SKILL_ID, "Fake", "Scripted replies for tests")
    }

    async fn generate(&self, text: &str, _prior_turns: &[Task]) -> AgentResult<String> {
        self.calls
            .lock()
            .expect("fake capability calls mutex poisoned")
            .push(text.to_string());

        let reply = self
            .replies
            .lock()
            .expect("fake capability replies mutex poisoned")
            .pop_front();

        match reply {
            None => Ok(format!("Mock response to: {text}")),
            Some(FakeReply::Text(text)) => Ok(text),
            Some(FakeReply::Error(err)) => Err(err),
            Some(FakeReply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(FakeReply::Panic(message)) => panic!("{message}"),
        }
    }
}

/// An event bus that records every accepted signal and every rejection.
#[derive(Default)]
pub struct RecordingEventBus {
    guard: Mutex<SequenceGuard>,
    signals: Mutex<Vec<BusSignal>>,
    rejections: Mutex<Vec<String>>,
}

impl RecordingEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepted signals in publish order, including `Finished`.
    #[must_use]
    pub fn signals(&self) -> Vec<BusSignal> {
        self.signals
            .lock()
            .expect("recording bus mutex poisoned")
            .clone()
    }

    /// Accepted events only.
    #[must_use]
    pub fn events(&self) -> Vec<TaskEvent> {
        self.signals()
            .into_iter()
            .filter_map(|signal| match signal {
                BusSignal::Event(event) => Some(event),
                BusSignal::Finished => None,
            })
            .collect()
    }

    /// Reasons for every signal the bus refused.
    #[must_use]
    pub fn rejections(&self) -> Vec<String> {
        self.rejections
            .lock()
            .expect("recording bus mutex poisoned")
            .clone()
    }

    fn record(&self, admitted: AgentResult<()>, signal: BusSignal) -> AgentResult<()> {
        match admitted {
            Ok(()) => {
                self.signals
                    .lock()
                    .expect("recording bus mutex poisoned")
                    .push(signal);
                Ok(())
            }
            Err(err) => {
                self.rejections
                    .lock()
                    .expect("recording bus mutex poisoned")
                    .push(err.to_string());
                Err(err)
            }
        }
    }
}

impl EventBus for RecordingEventBus {
    fn publish(&self, event: TaskEvent) -> AgentResult<()> {
        let admitted = self
            .guard
            .lock()
            .expect("recording bus mutex poisoned")
            .admit(&event);
        self.record(admitted, BusSignal::Event(event))
    }

    fn finished(&self) -> AgentResult<()> {
        let admitted = self
            .guard
            .lock()
            .expect("recording bus mutex poisoned")
            .admit_finished();
        self.record(admitted, BusSignal::Finished)
    }
}

/// A user message with one text part per entry of `texts`.
#[must_use]
pub fn user_message(texts: &[&str]) -> Message {
    let mut message = Message::text(MessageRole::User, uuid::Uuid::new_v4().to_string(), "");
    message.parts = texts.iter().map(|text| Part::text(*text)).collect();
    message
}
