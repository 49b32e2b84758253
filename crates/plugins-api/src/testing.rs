//! Test doubles for plugin authors
//!
//! [`RecordingContext`] stands in for the host during unit tests: it keeps
//! every registration call in order and lets the test activate commands by
//! id or hotkey. [`capture_logs`] collects the tracing events a closure emits.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::command::Command;
use crate::hotkey::Hotkey;
use crate::plugin::PluginContext;

/// A [`PluginContext`] that records registrations instead of dispatching them
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<Command>,
}

impl RecordingContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Every registered command, in call order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of `add_command` calls received
    pub fn registration_count(&self) -> usize {
        self.commands.len()
    }

    /// First command registered under `id`
    pub fn command(&self, id: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.id == id)
    }

    /// First command bound to `hotkey`
    pub fn command_for_hotkey(&self, hotkey: &Hotkey) -> Option<&Command> {
        self.commands.iter().find(|c| c.is_bound_to(hotkey))
    }

    /// Invoke the command registered under `id`; returns false if unknown
    pub fn invoke(&self, id: &str) -> bool {
        match self.command(id) {
            Some(command) => {
                command.invoke();
                true
            }
            None => false,
        }
    }

    /// Ids registered more than once, which a real host would reject
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut duplicates: Vec<&str> = Vec::new();
        for (index, command) in self.commands.iter().enumerate() {
            let seen_before = self.commands[..index].iter().any(|c| c.id == command.id);
            if seen_before && !duplicates.contains(&command.id.as_str()) {
                duplicates.push(&command.id);
            }
        }
        duplicates
    }
}

impl PluginContext for RecordingContext {
    fn add_command(&mut self, command: Command) {
        self.commands.push(command);
    }
}

/// A tracing event observed by [`capture_logs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Event level
    pub level: Level,
    /// Event target (usually the module path)
    pub target: String,
    /// Rendered `message` field
    pub message: String,
}

/// Run `f` with a scoped subscriber and return its result plus every event it emitted.
///
/// Only the current thread is observed.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        events: Arc::clone(&events),
    });

    let result = tracing::subscriber::with_default(subscriber, f);

    let captured = events
        .lock()
        .map(|guard| guard.clone())
        .unwrap_or_default();
    (result, captured)
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if let Ok(mut events) = self.events.lock() {
            events.push(CapturedEvent {
                level: *event.metadata().level(),
                target: event.metadata().target().to_string(),
                message: visitor.message,
            });
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}
