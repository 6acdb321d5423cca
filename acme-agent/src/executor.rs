//! Task executor: runs one task from announcement to resolution.
//!
//! [`CapabilityExecutor`] owns the task state machine. For every task it
//! publishes `Working`, invokes its [`ResponseCapability`] once, publishes
//! exactly one terminal event, then marks the bus finished. Errors, timeouts,
//! cancellation and panics inside the capability all end in a `Failed` event;
//! nothing escapes [`TaskExecutor::execute`].
//!
//! The ordering is enforced twice. The bus rejects out-of-order signals, and
//! the executor reports through a reporter whose methods consume it, so a
//! second terminal event or an event after `finished` does not type-check.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use a2a_types::AgentSkill;
use dashmap::{mapref::entry::Entry, DashMap};
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::capability::ResponseCapability;
use crate::errors::{AgentError, AgentResult};
use crate::event::TaskEvent;
use crate::event_bus::EventBus;
use crate::observability::{elapsed_ms, preview, short_id};
use crate::task::TaskContext;

/// Runs tasks against an event bus.
#[async_trait::async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Runs `context` to completion, reporting on `bus`. Always resolves the
    /// task; failures are reported as events, never returned.
    async fn execute(&self, context: TaskContext, bus: &dyn EventBus);

    /// Requests cancellation of a running task. Unknown or already resolved
    /// task ids are ignored.
    async fn cancel(&self, task_id: &str);
}

/// A task currently inside [`CapabilityExecutor::execute`].
#[derive(Debug, Clone)]
pub struct RunningTask {
    pub context_id: Option<String>,
    token: CancellationToken,
}

/// Executes tasks by delegating to a single response capability.
pub struct CapabilityExecutor {
    capability: Arc<dyn ResponseCapability>,
    skill_id: String,
    generation_timeout: Option<Duration>,
    running: DashMap<String, RunningTask>,
}

impl CapabilityExecutor {
    /// Creates an executor for `capability`, identified by the capability's skill id.
    pub fn new(capability: Arc<dyn ResponseCapability>) -> Self {
        let skill_id = capability.skill().id;
        Self {
            capability,
            skill_id,
            generation_timeout: None,
            running: DashMap::new(),
        }
    }

    /// Bounds each capability call; expiry fails the task.
    #[must_use]
    pub fn with_generation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.generation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn skill_id(&self) -> &str {
        &self.skill_id
    }

    /// Skill metadata of the wrapped capability.
    #[must_use]
    pub fn capability_skill(&self) -> AgentSkill {
        self.capability.skill()
    }

    /// Number of tasks currently executing.
    #[must_use]
    pub fn running_tasks(&self) -> usize {
        self.running.len()
    }

    #[must_use]
    pub fn running(&self, task_id: &str) -> Option<RunningTask> {
        self.running.get(task_id).map(|entry| entry.value().clone())
    }

    async fn resolve(
        &self,
        context: &TaskContext,
        text: &str,
        token: &CancellationToken,
    ) -> AgentResult<String> {
        let canceled = || AgentError::TaskCanceled {
            task_id: context.task_id().to_string(),
        };

        if token.is_cancelled() {
            return Err(canceled());
        }

        tokio::select! {
            biased;
            () = token.cancelled() => Err(canceled()),
            result = self.invoke(text, context) => result,
        }
    }

    async fn invoke(&self, text: &str, context: &TaskContext) -> AgentResult<String> {
        let generation =
            AssertUnwindSafe(self.capability.generate(text, context.prior_turns())).catch_unwind();

        let outcome = match self.generation_timeout {
            Some(limit) => tokio::time::timeout(limit, generation)
                .await
                .map_err(|_| AgentError::GenerationTimeout {
                    duration_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })?,
            None => generation.await,
        };

        outcome.map_err(|panic| AgentError::CapabilityPanicked(panic_message(&*panic)))?
    }

    /// Claims `context`'s task id for this run. A second run for an id that
    /// is still running is refused so the first stays cancellable.
    fn register(&self, context: &TaskContext) -> AgentResult<CancellationToken> {
        match self.running.entry(context.task_id().to_string()) {
            Entry::Occupied(_) => Err(AgentError::TaskAlreadyRunning {
                task_id: context.task_id().to_string(),
            }),
            Entry::Vacant(slot) => {
                let token = CancellationToken::new();
                slot.insert(RunningTask {
                    context_id: context.context_id().map(str::to_string),
                    token: token.clone(),
                });
                Ok(token)
            }
        }
    }
}

#[async_trait::async_trait]
impl TaskExecutor for CapabilityExecutor {
    #[tracing::instrument(
        name = "task.execute",
        skip_all,
        fields(task_id = %context.task_id(), skill = %self.skill_id)
    )]
    async fn execute(&self, context: TaskContext, bus: &dyn EventBus) {
        let started = Instant::now();
        let text = context.user_text();

        tracing::info!(
            task = %short_id(context.task_id()),
            skill = %self.skill_id,
            context = context.context_id().unwrap_or("none"),
            message = %preview(&text),
            "task started"
        );

        let working = Reporter::new(bus, &context).working();

        let outcome = match self.register(&context) {
            Ok(token) => {
                let outcome = self.resolve(&context, &text, &token).await;
                self.running.remove(context.task_id());
                outcome
            }
            Err(err) => Err(err),
        };

        let resolved = match outcome {
            Ok(reply) => {
                tracing::info!(
                    task = %short_id(context.task_id()),
                    duration_ms = elapsed_ms(started),
                    response = %preview(&reply),
                    "task completed"
                );
                working.complete(reply)
            }
            Err(err) => {
                tracing::error!(
                    task = %short_id(context.task_id()),
                    duration_ms = elapsed_ms(started),
                    error = %err,
                    "task failed"
                );
                working.fail(&err)
            }
        };

        resolved.finish();
    }

    async fn cancel(&self, task_id: &str) {
        match self.running.get(task_id) {
            Some(entry) => {
                entry.token.cancel();
                tracing::info!(task = %short_id(task_id), "task cancellation requested");
            }
            None => {
                tracing::debug!(task = %short_id(task_id), "cancel ignored: task not running");
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Publishes one task's events. Each stage is a distinct type and every
/// transition consumes the previous stage.
struct Reporter<'a> {
    bus: &'a dyn EventBus,
    task_id: &'a str,
    context_id: Option<&'a str>,
}

struct Working<'a>(Reporter<'a>);

struct Resolved<'a>(Reporter<'a>);

impl<'a> Reporter<'a> {
    fn new(bus: &'a dyn EventBus, context: &'a TaskContext) -> Self {
        Self {
            bus,
            task_id: context.task_id(),
            context_id: context.context_id(),
        }
    }

    fn working(self) -> Working<'a> {
        self.publish(TaskEvent::Working {
            task_id: self.task_id.to_string(),
            context_id: self.context_id.map(str::to_string),
        });
        Working(self)
    }

    fn publish(&self, event: TaskEvent) {
        let kind = event.kind();
        if let Err(err) = self.bus.publish(event) {
            tracing::error!(task = %short_id(self.task_id), kind, error = %err, "event bus rejected event");
        }
    }
}

impl<'a> Working<'a> {
    fn complete(self, text: String) -> Resolved<'a> {
        let reporter = self.0;
        reporter.publish(TaskEvent::Message {
            task_id: reporter.task_id.to_string(),
            context_id: reporter.context_id.map(str::to_string),
            message_id: uuid::Uuid::new_v4().to_string(),
            text,
        });
        Resolved(reporter)
    }

    fn fail(self, err: &AgentError) -> Resolved<'a> {
        let reporter = self.0;
        reporter.publish(TaskEvent::Failed {
            task_id: reporter.task_id.to_string(),
            context_id: reporter.context_id.map(str::to_string),
            message_id: uuid::Uuid::new_v4().to_string(),
            description: format!("An error occurred: {err}"),
        });
        Resolved(reporter)
    }
}

impl Resolved<'_> {
    fn finish(self) {
        let reporter = self.0;
        if let Err(err) = reporter.bus.finished() {
            tracing::error!(task = %short_id(reporter.task_id), error = %err, "event bus rejected finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::BusSignal;
    use crate::test_support::{user_message, FakeCapability, FakeReply, RecordingEventBus};

    fn context(texts: &[&str]) -> TaskContext {
        TaskContext::new("task-1", Some("ctx-1".into()), user_message(texts))
    }

    #[tokio::test]
    async fn success_emits_working_message_finished() {
        let executor = CapabilityExecutor::new(Arc::new(FakeCapability::new()));
        let bus = RecordingEventBus::new();

        executor.execute(context(&["Hello"]), &bus).await;

        let signals = bus.signals();
        assert_eq!(signals.len(), 3);
        assert!(matches!(signals[0], BusSignal::Event(TaskEvent::Working { .. })));
        assert!(matches!(
            &signals[1],
            BusSignal::Event(TaskEvent::Message { text, .. }) if text == "Mock response to: Hello"
        ));
        assert_eq!(signals[2], BusSignal::Finished);
        assert!(bus.rejections().is_empty());
        assert_eq!(executor.running_tasks(), 0);
    }

    #[tokio::test]
    async fn panic_in_capability_becomes_failure() {
        let capability = FakeCapability::with_replies([FakeReply::Panic("kaboom".into())]);
        let executor = CapabilityExecutor::new(Arc::new(capability));
        let bus = RecordingEventBus::new();

        executor.execute(context(&["Hello"]), &bus).await;

        let events = bus.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[1],
            TaskEvent::Failed { description, .. } if description.contains("kaboom")
        ));
        assert_eq!(bus.signals().last(), Some(&BusSignal::Finished));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_becomes_failure() {
        let capability = FakeCapability::with_replies([FakeReply::Delayed(
            Duration::from_secs(30),
            "too late".into(),
        )]);
        let executor = CapabilityExecutor::new(Arc::new(capability))
            .with_generation_timeout(Some(Duration::from_millis(500)));
        let bus = RecordingEventBus::new();

        executor.execute(context(&["Hello"]), &bus).await;

        let events = bus.events();
        assert!(matches!(
            &events[1],
            TaskEvent::Failed { description, .. }
                if description == "An error occurred: Generation timed out after 500ms"
        ));
    }

    #[test]
    fn panic_message_handles_common_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }
}
