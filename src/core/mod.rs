//! Core console types.
//!
//! This module provides the fundamental building blocks:
//! - [`Console`] - Unified system parameter for convenient access
//! - [`Command`] - Console commands with handlers
//! - [`CommandRegistry`] - Ordered store of commands by alias
//! - [`dispatch`] / [`submit`] - Input line routing
//! - [`OutputHistory`] / [`OutputSink`] - Output pipeline
//! - [`ConsoleSession`] - Open/close state machine
//! - Messages for communication between layers

mod command;
mod console;
mod dispatch;
mod error;
mod events;
mod output;
mod registry;
mod session;

pub use command::{Command, CommandArgs, CommandHandler};
pub use console::Console;
pub use dispatch::{SubmitAction, dispatch, split_line, submit};
pub use error::{CommandError, CommandResult, ConsoleError};
pub use events::{ConsoleEventsPlugin, ConsoleInputEvent, ConsoleSubmitEvent, ConsoleToggleEvent};
pub use output::{BufferSink, ColorTag, EntryHandle, OutputEntry, OutputHistory, OutputSink};
pub use registry::CommandRegistry;
pub use session::{ConsoleSession, StateListener};
