//! Input line parsing and command dispatch.
//!
//! Lines are split on single spaces. There is no quoting and no collapsing of
//! repeated spaces: `"say  hi"` yields the arguments `["", "hi"]`.

use bevy::prelude::*;

use super::{ColorTag, CommandArgs, CommandRegistry, ConsoleError, OutputHistory};

/// What the input widget should do after a line was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    /// Clear the text field and give it focus again.
    ClearAndRefocus,
}

/// Split a raw line into its alias and argument tokens.
///
/// # Examples
///
/// ```
/// use bevy_cosmic_console::core::split_line;
///
/// assert_eq!(split_line("move 10 20"), ("move", vec!["10", "20"]));
/// assert_eq!(split_line("help"), ("help", vec![]));
/// assert_eq!(split_line("say  hi"), ("say", vec!["", "hi"]));
/// ```
pub fn split_line(line: &str) -> (&str, Vec<&str>) {
    let mut tokens = line.split(' ');
    let alias = tokens.next().unwrap_or_default();
    (alias, tokens.collect())
}

/// Run every command registered under the line's alias.
///
/// Returns the number of handlers invoked. An unknown alias writes one error
/// entry and returns `Ok(0)`. The first failing handler aborts the dispatch and
/// its error is returned; panics are not caught.
pub fn dispatch(world: &mut World, line: &str) -> Result<usize, ConsoleError> {
    let (alias, tokens) = split_line(line);

    let handlers = world
        .get_resource::<CommandRegistry>()
        .ok_or(ConsoleError::MissingResource("CommandRegistry"))?
        .handlers_for(alias);

    if handlers.is_empty() {
        let mut output = world
            .get_resource_mut::<OutputHistory>()
            .ok_or(ConsoleError::MissingResource("OutputHistory"))?;
        output.append(
            format!("There is no Command with the alias \"{alias}\"."),
            ColorTag::Error,
        );
        return Ok(0);
    }

    let args = CommandArgs::new(line, tokens);
    for handler in &handlers {
        handler(&args, world).map_err(|source| ConsoleError::Handler {
            alias: alias.to_string(),
            source,
        })?;
    }
    Ok(handlers.len())
}

/// Handle a line submitted from an input widget.
///
/// Empty lines are ignored and leave the widget untouched.
pub fn submit(world: &mut World, line: &str) -> Result<Option<SubmitAction>, ConsoleError> {
    if line.is_empty() {
        return Ok(None);
    }
    dispatch(world, line)?;
    Ok(Some(SubmitAction::ClearAndRefocus))
}
