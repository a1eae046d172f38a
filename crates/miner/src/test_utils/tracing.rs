//! A `tracing-subscriber` layer that records events by level and target.

use alloc::{format, string::String, sync::Arc, vec::Vec};
use core::fmt::Debug;
use spin::Mutex;
use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_subscriber::{layer::Context, Layer};

/// A recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedEvent {
    /// The event level.
    pub level: Level,
    /// The event target, e.g. `miner` or `fees`.
    pub target: &'static str,
    /// The formatted message.
    pub message: String,
}

/// The storage for the recorded events.
#[derive(Debug, Default, Clone)]
pub struct TraceStorage(pub Arc<Mutex<Vec<TracedEvent>>>);

impl TraceStorage {
    /// Returns the messages logged at `level`.
    pub fn get_by_level(&self, level: Level) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter(|event| event.level == level)
            .map(|event| event.message.clone())
            .collect()
    }

    /// Returns the events logged under `target`.
    pub fn get_by_target(&self, target: &str) -> Vec<TracedEvent> {
        self.0.lock().iter().filter(|event| event.target == target).cloned().collect()
    }

    /// Returns true if a `miner` event at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.0.lock().iter().any(|event| {
            event.target == "miner" && event.level == level && event.message.contains(needle)
        })
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// Writes the `message` field of an event.
#[derive(Debug, Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

/// A subscriber layer that records events into a [TraceStorage].
#[derive(Debug, Default)]
pub struct CollectingLayer {
    /// The storage for the recorded events.
    pub storage: TraceStorage,
}

impl CollectingLayer {
    /// Creates a layer recording into `storage`.
    pub const fn new(storage: TraceStorage) -> Self {
        Self { storage }
    }
}

impl<S: Subscriber> Layer<S> for CollectingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.storage.0.lock().push(TracedEvent {
            level: *metadata.level(),
            target: metadata.target(),
            message: visitor.0,
        });
    }
}
