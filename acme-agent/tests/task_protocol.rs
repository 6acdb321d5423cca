//! End-to-end checks of the task event protocol through the public API.

use std::sync::Arc;
use std::time::Duration;

use acme_agent::test_support::{user_message, FakeCapability, FakeReply, RecordingEventBus};
use acme_agent::{
    AgentError, BusSignal, CapabilityExecutor, EventBus, TaskContext, TaskEvent, TaskExecutor,
};

fn executor(capability: FakeCapability) -> CapabilityExecutor {
    CapabilityExecutor::new(Arc::new(capability))
}

fn context(task_id: &str, context_id: Option<&str>, texts: &[&str]) -> TaskContext {
    TaskContext::new(task_id, context_id.map(str::to_string), user_message(texts))
}

fn kinds(bus: &RecordingEventBus) -> Vec<&'static str> {
    bus.signals()
        .iter()
        .map(|signal| match signal {
            BusSignal::Event(event) => event.kind(),
            BusSignal::Finished => "finished",
        })
        .collect()
}

#[tokio::test]
async fn success_sequence_is_working_message_finished() {
    let bus = RecordingEventBus::new();
    executor(FakeCapability::new())
        .execute(context("task-1", Some("ctx-1"), &["Hello"]), &bus)
        .await;

    assert_eq!(kinds(&bus), vec!["working", "message", "finished"]);
}

#[tokio::test]
async fn failure_sequence_is_working_failed_finished() {
    let bus = RecordingEventBus::new();
    executor(FakeCapability::failing("boom"))
        .execute(context("task-1", Some("ctx-1"), &["Hello"]), &bus)
        .await;

    assert_eq!(kinds(&bus), vec!["working", "failed", "finished"]);
}

#[tokio::test]
async fn text_parts_are_joined_with_a_space() {
    let capability = FakeCapability::new();
    let bus = RecordingEventBus::new();
    executor(capability.clone())
        .execute(context("task-1", None, &["Hello", "there"]), &bus)
        .await;

    assert_eq!(capability.calls(), vec!["Hello there".to_string()]);
}

#[tokio::test]
async fn message_without_text_invokes_capability_once_with_empty_text() {
    let capability = FakeCapability::new();
    let bus = RecordingEventBus::new();
    executor(capability.clone())
        .execute(context("task-1", None, &[]), &bus)
        .await;

    assert_eq!(capability.call_count(), 1);
    assert_eq!(capability.calls(), vec![String::new()]);
    assert_eq!(kinds(&bus), vec!["working", "message", "finished"]);
}

#[tokio::test]
async fn success_carries_capability_text_and_ids() {
    let bus = RecordingEventBus::new();
    executor(FakeCapability::new())
        .execute(context("task-42", Some("ctx-42"), &["Hello"]), &bus)
        .await;

    let events = bus.events();
    let TaskEvent::Message {
        text, message_id, ..
    } = &events[1]
    else {
        panic!("expected message event, got {:?}", events[1]);
    };
    assert_eq!(text, "Mock response to: Hello");
    assert!(uuid::Uuid::parse_str(message_id).is_ok());
    assert!(events.iter().all(|event| event.task_id() == "task-42"));
    assert!(events.iter().all(|event| event.context_id() == Some("ctx-42")));
}

#[tokio::test]
async fn failure_carries_error_text_and_no_message() {
    let bus = RecordingEventBus::new();
    executor(FakeCapability::failing("boom"))
        .execute(context("task-1", Some("ctx-1"), &["Hello"]), &bus)
        .await;

    let events = bus.events();
    assert!(!events
        .iter()
        .any(|event| matches!(event, TaskEvent::Message { .. })));
    let TaskEvent::Failed { description, .. } = &events[1] else {
        panic!("expected failure event, got {:?}", events[1]);
    };
    assert_eq!(description, "An error occurred: boom");
    assert_eq!(bus.signals().last(), Some(&BusSignal::Finished));
}

#[tokio::test]
async fn second_terminal_event_is_rejected() {
    let bus = RecordingEventBus::new();
    executor(FakeCapability::new())
        .execute(context("task-1", None, &["Hello"]), &bus)
        .await;

    let extra = bus.publish(TaskEvent::Failed {
        task_id: "task-1".into(),
        context_id: None,
        message_id: "late".into(),
        description: "An error occurred: late".into(),
    });

    assert!(matches!(extra, Err(AgentError::EventRejected { .. })));
    assert_eq!(bus.events().len(), 2);
    assert_eq!(bus.rejections().len(), 1);
}

#[tokio::test]
async fn absent_context_id_stays_absent() {
    let bus = RecordingEventBus::new();
    executor(FakeCapability::failing("boom"))
        .execute(context("task-1", None, &["Hello"]), &bus)
        .await;

    assert!(bus
        .events()
        .iter()
        .all(|event| event.task_id() == "task-1" && event.context_id().is_none()));
}

#[tokio::test]
async fn whitespace_text_reaches_capability_unchanged() {
    let capability = FakeCapability::new();
    let bus = RecordingEventBus::new();
    executor(capability.clone())
        .execute(context("task-1", None, &["  ", "\t"]), &bus)
        .await;

    assert_eq!(capability.calls(), vec!["   \t".to_string()]);
}

#[tokio::test]
async fn cancel_fails_running_task_and_keeps_order() {
    let capability = FakeCapability::with_replies([FakeReply::Delayed(
        Duration::from_secs(60),
        "never".into(),
    )]);
    let executor = Arc::new(executor(capability));
    let bus = Arc::new(RecordingEventBus::new());

    let run = {
        let executor = Arc::clone(&executor);
        let bus = Arc::clone(&bus);
        tokio::spawn(async move {
            executor
                .execute(context("task-9", Some("ctx-9"), &["Hello"]), &*bus)
                .await;
        })
    };

    while executor.running("task-9").is_none() {
        tokio::task::yield_now().await;
    }
    executor.cancel("task-9").await;
    run.await.expect("executor task panicked");

    assert_eq!(kinds(&bus), vec!["working", "failed", "finished"]);
    let TaskEvent::Failed { description, .. } = &bus.events()[1] else {
        panic!("expected failure event");
    };
    assert_eq!(description, "An error occurred: Task canceled: task-9");
    assert!(executor.running("task-9").is_none());
}

#[tokio::test]
async fn cancel_of_unknown_task_is_a_no_op() {
    let executor = executor(FakeCapability::new());
    executor.cancel("missing").await;

    let bus = RecordingEventBus::new();
    executor
        .execute(context("missing", None, &["Hello"]), &bus)
        .await;
    assert_eq!(kinds(&bus), vec!["working", "message", "finished"]);
}

#[tokio::test]
async fn concurrent_tasks_keep_their_own_events() {
    let executor = Arc::new(executor(FakeCapability::new()));
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let executor = Arc::clone(&executor);
            tokio::spawn(async move {
                let bus = RecordingEventBus::new();
                let task_id = format!("task-{n}");
                executor
                    .execute(context(&task_id, None, &[&format!("msg {n}")]), &bus)
                    .await;
                (task_id, bus.events())
            })
        })
        .collect();

    for handle in handles {
        let (task_id, events) = handle.await.expect("join");
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|event| event.task_id() == task_id));
    }
    assert_eq!(executor.running_tasks(), 0);
}

#[tokio::test]
async fn second_run_for_running_task_id_is_refused() {
    let capability = FakeCapability::with_replies([FakeReply::Delayed(
        Duration::from_secs(60),
        "slow".into(),
    )]);
    let executor = Arc::new(executor(capability.clone()));
    let slow_bus = Arc::new(RecordingEventBus::new());

    let slow = {
        let executor = Arc::clone(&executor);
        let bus = Arc::clone(&slow_bus);
        tokio::spawn(async move {
            executor
                .execute(context("dup", Some("ctx-1"), &["first"]), &*bus)
                .await;
        })
    };
    while executor.running("dup").is_none() {
        tokio::task::yield_now().await;
    }

    let fast_bus = RecordingEventBus::new();
    executor
        .execute(context("dup", Some("ctx-2"), &["second"]), &fast_bus)
        .await;

    assert_eq!(kinds(&fast_bus), vec!["working", "failed", "finished"]);
    let TaskEvent::Failed { description, .. } = &fast_bus.events()[1] else {
        panic!("expected failure event");
    };
    assert_eq!(description, "An error occurred: Task already running: dup");
    assert_eq!(capability.calls(), vec!["first".to_string()]);

    let still_running = executor.running("dup").expect("first run still registered");
    assert_eq!(still_running.context_id.as_deref(), Some("ctx-1"));

    executor.cancel("dup").await;
    slow.await.expect("executor task panicked");

    assert_eq!(kinds(&slow_bus), vec!["working", "failed", "finished"]);
    let TaskEvent::Failed { description, .. } = &slow_bus.events()[1] else {
        panic!("expected failure event");
    };
    assert_eq!(description, "An error occurred: Task canceled: dup");
    assert!(executor.running("dup").is_none());
}
