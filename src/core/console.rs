//! Unified console API for convenient access.
//!
//! The [`Console`] system parameter combines [`CommandRegistry`],
//! [`OutputHistory`] and [`ConsoleSession`] into a single interface.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::{ColorTag, Command, CommandRegistry, ConsoleSession, EntryHandle, OutputHistory};

/// Unified console system parameter.
///
/// # Examples
///
/// ```ignore
/// fn setup_console(mut console: Console) {
///     console.add_command(Command::new("god", |_, world| {
///         world.resource_mut::<GodMode>().toggle();
///         Ok(())
///     }).description("Toggle invulnerability"));
///
///     console.print("Console ready", ColorTag::Info);
/// }
/// ```
#[derive(SystemParam)]
pub struct Console<'w> {
    registry: ResMut<'w, CommandRegistry>,
    output: ResMut<'w, OutputHistory>,
    session: ResMut<'w, ConsoleSession>,
}

impl Console<'_> {
    /// Register a command.
    pub fn add_command(&mut self, command: Command) {
        self.registry.register(command);
    }

    /// Remove every command registered under `alias`.
    ///
    /// Returns the number of commands removed.
    pub fn remove_command(&mut self, alias: &str) -> usize {
        self.registry.unregister(alias)
    }

    /// Write a line to the console.
    pub fn print(&mut self, text: impl AsRef<str>, color: ColorTag) -> Option<EntryHandle> {
        self.output.append(text, color)
    }

    /// Remove all output.
    pub fn clear(&mut self) {
        self.output.clear_all();
    }

    /// Show the console. Returns `false` if it was already open.
    pub fn open(&mut self) -> bool {
        self.session.open()
    }

    /// Hide the console. Returns `false` if it was already closed.
    pub fn close(&mut self) -> bool {
        self.session.close()
    }

    /// Whether the console is visible.
    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    /// Read-only access to the registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Read-only access to the output history.
    pub fn output(&self) -> &OutputHistory {
        &self.output
    }
}
