//! Console commands.
//!
//! A [`Command`] binds an alias to a handler that runs with mutable access to
//! the Bevy [`World`] whenever a submitted line starts with that alias.

use std::sync::Arc;

use bevy::prelude::*;

use super::CommandResult;

/// Arguments passed to a command handler.
#[derive(Debug, Clone)]
pub struct CommandArgs<'a> {
    /// The raw input line.
    raw: &'a str,
    /// Tokens after the alias. Empty strings are kept.
    args: Vec<&'a str>,
}

impl<'a> CommandArgs<'a> {
    /// Create new command args from a raw line and its argument tokens.
    pub fn new(raw: &'a str, args: Vec<&'a str>) -> Self {
        Self { raw, args }
    }

    /// Get the raw input line.
    #[inline]
    pub fn raw(&self) -> &str {
        self.raw
    }

    /// Get the number of arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Check if there are no arguments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Get an argument by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(index).copied()
    }

    /// Try to parse an argument as a specific type.
    pub fn parse<T: std::str::FromStr>(&self, index: usize) -> Option<T> {
        self.get(index).and_then(|s| s.parse().ok())
    }

    /// Get all arguments as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[&str] {
        &self.args
    }

    /// Iterate over arguments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.args.iter().copied()
    }

    /// Join all arguments with a separator.
    pub fn join(&self, separator: &str) -> String {
        self.args.join(separator)
    }
}

impl std::ops::Index<usize> for CommandArgs<'_> {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        self.args[index]
    }
}

/// Type alias for command handler functions.
///
/// Handlers are reference counted so dispatch can snapshot them and release the
/// registry before running them; a handler is free to add or remove commands.
pub type CommandHandler = Arc<dyn Fn(&CommandArgs, &mut World) -> CommandResult + Send + Sync>;

/// A registered console command.
///
/// # Examples
///
/// ```ignore
/// let cmd = Command::new("spawn", |args, world| {
///     let count: usize = args.parse(0).unwrap_or(1);
///     for _ in 0..count {
///         world.spawn(Enemy);
///     }
///     Ok(())
/// })
/// .description("Spawn enemies");
/// ```
#[derive(Clone)]
pub struct Command {
    alias: Box<str>,
    description: Option<Box<str>>,
    handler: CommandHandler,
}

impl Command {
    /// Create a new command without a description.
    ///
    /// Commands without a description are hidden from `help`.
    pub fn new<F>(alias: impl Into<Box<str>>, handler: F) -> Self
    where
        F: Fn(&CommandArgs, &mut World) -> CommandResult + Send + Sync + 'static,
    {
        Self::from_handler(alias, Arc::new(handler))
    }

    /// Create a command from an already boxed handler.
    pub fn from_handler(alias: impl Into<Box<str>>, handler: CommandHandler) -> Self {
        Self {
            alias: alias.into(),
            description: None,
            handler,
        }
    }

    /// Set the description shown by `help`.
    pub fn description(mut self, desc: impl Into<Box<str>>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Get the alias.
    #[inline]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Get the description, if any. Empty descriptions are reported as `None`.
    #[inline]
    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    /// Check whether the command is listed by `help`.
    #[inline]
    pub fn has_description(&self) -> bool {
        self.get_description().is_some()
    }

    /// Get a shared handle to the handler.
    #[inline]
    pub fn handler(&self) -> &CommandHandler {
        &self.handler
    }

    /// Execute the command with the given arguments.
    pub fn execute(&self, args: &CommandArgs, world: &mut World) -> CommandResult {
        (self.handler)(args, world)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("alias", &self.alias)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
