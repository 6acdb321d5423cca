//! Per-task event channel between the executor and the transport.
//!
//! The executor publishes into an [`EventBus`]; the transport drains the
//! matching [`EventReceiver`]. Every bus runs its input through a
//! [`SequenceGuard`] so a task can never produce more than one `Working`,
//! more than one terminal event, or anything after `finished`.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::errors::{AgentError, AgentResult};
use crate::event::{BusSignal, TaskEvent};

/// Append-only sink for one task's lifecycle.
pub trait EventBus: Send + Sync {
    /// Appends an event. Rejected when it would break the task's event order.
    fn publish(&self, event: TaskEvent) -> AgentResult<()>;

    /// Marks the task finished. The bus accepts nothing afterwards.
    fn finished(&self) -> AgentResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Working,
    Resolved,
    Finished,
}

/// Ordering rules for a single task: optional `Working`, exactly one terminal
/// event, then `finished`, all for the same task id.
#[derive(Debug, Clone)]
pub struct SequenceGuard {
    phase: Phase,
    task_id: Option<String>,
}

impl Default for SequenceGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceGuard {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            task_id: None,
        }
    }

    /// Admits `event` or explains why it breaks the sequence.
    pub fn admit(&mut self, event: &TaskEvent) -> AgentResult<()> {
        if let Some(expected) = &self.task_id {
            if expected != event.task_id() {
                return Err(rejected(
                    event.task_id(),
                    format!("bus belongs to task {expected}"),
                ));
            }
        }

        let next = match (self.phase, event.is_terminal()) {
            (Phase::Finished, _) => {
                return Err(rejected(event.task_id(), "bus already finished"));
            }
            (Phase::Resolved, _) => {
                return Err(rejected(
                    event.task_id(),
                    format!("{} after terminal event", event.kind()),
                ));
            }
            (Phase::Working, false) => {
                return Err(rejected(event.task_id(), "duplicate working event"));
            }
            (Phase::Idle, false) => Phase::Working,
            (Phase::Idle | Phase::Working, true) => Phase::Resolved,
        };

        self.task_id.get_or_insert_with(|| event.task_id().to_string());
        self.phase = next;
        Ok(())
    }

    /// Admits the finished marker. Requires exactly one prior terminal event.
    pub fn admit_finished(&mut self) -> AgentResult<()> {
        let task_id = self.task_id.clone().unwrap_or_default();
        match self.phase {
            Phase::Resolved => {
                self.phase = Phase::Finished;
                Ok(())
            }
            Phase::Finished => Err(rejected(&task_id, "bus already finished")),
            Phase::Idle | Phase::Working => {
                Err(rejected(&task_id, "finished before a terminal event"))
            }
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }
}

fn rejected(task_id: &str, reason: impl Into<String>) -> AgentError {
    AgentError::EventRejected {
        task_id: task_id.to_string(),
        reason: reason.into(),
    }
}

/// Unbounded channel bus; the transport owns the receiving half.
pub struct ChannelEventBus {
    guard: Mutex<SequenceGuard>,
    sender: UnboundedSender<BusSignal>,
}

impl ChannelEventBus {
    /// Creates a bus and the receiver that drains it.
    #[must_use]
    pub fn new() -> (Self, EventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let bus = Self {
            guard: Mutex::new(SequenceGuard::new()),
            sender,
        };
        (bus, EventReceiver { receiver })
    }

    fn send(&self, signal: BusSignal) -> AgentResult<()> {
        self.sender
            .send(signal)
            .map_err(|_| AgentError::Internal {
                component: "event_bus".to_string(),
                reason: "receiver dropped".to_string(),
            })
    }

    /// Admits `signal` against a copy of the guard and commits the new phase
    /// only once the receiver has it.
    fn deliver(&self, signal: BusSignal) -> AgentResult<()> {
        let mut guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.clone();
        match &signal {
            BusSignal::Event(event) => next.admit(event)?,
            BusSignal::Finished => next.admit_finished()?,
        }
        self.send(signal)?;
        *guard = next;
        Ok(())
    }
}

impl EventBus for ChannelEventBus {
    fn publish(&self, event: TaskEvent) -> AgentResult<()> {
        self.deliver(BusSignal::Event(event))
    }

    fn finished(&self) -> AgentResult<()> {
        self.deliver(BusSignal::Finished)
    }
}

/// Receiving half of a [`ChannelEventBus`].
pub struct EventReceiver {
    receiver: UnboundedReceiver<BusSignal>,
}

impl EventReceiver {
    pub async fn recv(&mut self) -> Option<BusSignal> {
        self.receiver.recv().await
    }

    /// Collects events until `Finished` arrives or the bus is dropped.
    ///
    /// Returns the events in publish order and whether the finished marker
    /// was seen.
    pub async fn drain(mut self) -> (Vec<TaskEvent>, bool) {
        let mut events = Vec::new();
        while let Some(signal) = self.receiver.recv().await {
            match signal {
                BusSignal::Event(event) => events.push(event),
                BusSignal::Finished => return (events, true),
            }
        }
        (events, false)
    }
}
