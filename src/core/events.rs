//! Console messages for communication between front-ends and the core.
//!
//! - Front-end -> Core: submitted input lines
//! - Core -> Front-end: what to do with the input widget after a submit
//! - Core -> Systems: open/close notifications

use bevy::prelude::*;

use super::SubmitAction;

/// Message sent when a line is submitted to the console.
///
/// # Examples
///
/// ```ignore
/// fn submit_line(mut input: MessageWriter<ConsoleInputEvent>) {
///     input.write(ConsoleInputEvent::new("help clear"));
/// }
/// ```
#[derive(Message, Debug, Clone)]
pub struct ConsoleInputEvent {
    /// The raw input line.
    pub command: String,
}

impl ConsoleInputEvent {
    /// Create a new input event.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

/// Message sent after a submitted line was dispatched.
///
/// Not sent for ignored (empty) lines or when a handler failed.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSubmitEvent {
    /// The line that was dispatched.
    pub line: String,
    /// What the input widget should do.
    pub action: SubmitAction,
}

/// Message sent when the console is opened or closed.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleToggleEvent {
    /// Whether the console is now open.
    pub open: bool,
}

impl ConsoleToggleEvent {
    /// Create an event for opening the console.
    pub fn opened() -> Self {
        Self { open: true }
    }

    /// Create an event for closing the console.
    pub fn closed() -> Self {
        Self { open: false }
    }
}

/// Plugin that registers all console messages.
pub struct ConsoleEventsPlugin;

impl Plugin for ConsoleEventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ConsoleInputEvent>()
            .add_message::<ConsoleSubmitEvent>()
            .add_message::<ConsoleToggleEvent>();
    }
}
