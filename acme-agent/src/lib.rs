pub mod capability;
pub mod card;
pub mod config;
pub mod error_mapper;
pub mod errors;
pub mod event;
pub mod event_bus;
pub mod executor;
pub mod models;
pub mod observability;
pub mod registry;
pub mod request_handler;
pub mod status_mapper;
pub mod task;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

// Re-export key types for easier access
pub use a2a_types as a2a;
pub use errors::{AgentError, AgentResult};
pub use event::{BusSignal, TaskEvent};
pub use event_bus::{ChannelEventBus, EventBus, EventReceiver};
pub use executor::{CapabilityExecutor, TaskExecutor};
pub use task::TaskContext;
