//! Command registry.
//!
//! Commands are kept in registration order. Aliases are not unique: every
//! command registered under an alias runs when that alias is dispatched.

use bevy::prelude::*;

use super::{Command, CommandHandler};

/// Central registry of console commands.
///
/// # Examples
///
/// ```ignore
/// let mut registry = CommandRegistry::new();
///
/// registry.register(Command::new("ping", |_, world| {
///     world.resource_mut::<OutputHistory>().append("pong", ColorTag::Info);
///     Ok(())
/// }).description("Replies with pong"));
///
/// assert_eq!(registry.lookup("ping").count(), 1);
/// ```
#[derive(Resource, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Existing commands with the same alias are kept.
    pub fn register(&mut self, command: Command) {
        debug!("Console: registered command '{}'", command.alias());
        self.commands.push(command);
    }

    /// Register a handler built at runtime, e.g. by a scripting bridge.
    ///
    /// Returns `false` and registers nothing when `handler` is `None`.
    pub fn register_dynamic(
        &mut self,
        alias: impl Into<Box<str>>,
        handler: Option<CommandHandler>,
        description: Option<&str>,
    ) -> bool {
        let Some(handler) = handler else {
            return false;
        };

        let mut command = Command::from_handler(alias, handler);
        if let Some(desc) = description {
            command = command.description(desc);
        }
        self.register(command);
        true
    }

    /// Remove every command registered under `alias`.
    ///
    /// Returns the number of commands removed. Unknown aliases are a no-op.
    pub fn unregister(&mut self, alias: &str) -> usize {
        let before = self.commands.len();
        self.commands.retain(|cmd| cmd.alias() != alias);
        let removed = before - self.commands.len();
        if removed > 0 {
            debug!("Console: removed {} command(s) '{}'", removed, alias);
        }
        removed
    }

    /// Iterate over the commands registered under `alias`, in registration order.
    ///
    /// Matching is exact and case-sensitive.
    pub fn lookup<'a>(&'a self, alias: &'a str) -> impl Iterator<Item = &'a Command> + Clone + 'a {
        self.commands.iter().filter(move |cmd| cmd.alias() == alias)
    }

    /// Snapshot the handlers registered under `alias`.
    pub fn handlers_for(&self, alias: &str) -> Vec<CommandHandler> {
        self.lookup(alias).map(|cmd| cmd.handler().clone()).collect()
    }

    /// Iterate over all commands in registration order.
    pub fn list(&self) -> impl Iterator<Item = &Command> + Clone {
        self.commands.iter()
    }

    /// Check if at least one command is registered under `alias`.
    pub fn contains(&self, alias: &str) -> bool {
        self.lookup(alias).next().is_some()
    }

    /// Get the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
