//! Built-in console commands: `help`, `quit`, `clear` and `cls`.

use bevy::prelude::*;

use crate::config::ConsoleConfig;
use crate::core::{
    ColorTag, Command, CommandArgs, CommandError, CommandRegistry, CommandResult, OutputHistory,
};

/// Separator line used by the help listing and the welcome banner.
pub const SEPARATOR: &str = "=================================";

/// Reported when the host did not honor a quit request.
pub const QUIT_FAILED: &str = "Quitting Failed...";

/// Reported by `help <alias>` for commands without a description.
pub const NO_HELP: &str = "There is no help defined for this command.";

/// What the `quit` command does.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuitBehavior {
    /// Write [`AppExit::Success`]; fails if the app does not accept `AppExit` messages.
    #[default]
    AppExit,
    /// Terminate the process immediately.
    Process,
    /// Refuse to quit, e.g. in sandboxed or embedded builds.
    Deny,
}

/// Register the built-in commands.
pub fn register(registry: &mut CommandRegistry) {
    registry.register(Command::new("help", help).description("Shows the help list"));
    registry.register(Command::new("quit", quit).description("Quits the application."));
    registry.register(
        Command::new("clear", clear).description("Clears the console. (\"cls\" works too)"),
    );
    registry.register(Command::new("cls", clear));
}

fn output(world: &mut World) -> Result<Mut<'_, OutputHistory>, CommandError> {
    world
        .get_resource_mut::<OutputHistory>()
        .ok_or_else(|| CommandError::new("console output is not available"))
}

fn title(world: &World) -> String {
    world
        .get_resource::<ConsoleConfig>()
        .map(|config| config.title.clone())
        .unwrap_or_else(|| ConsoleConfig::default().title)
}

fn help_line(alias: &str, description: &str) -> (String, ColorTag) {
    (format!("{alias} = {description}"), ColorTag::Info)
}

/// `help` lists every described command; `help <alias>` describes one alias.
fn help(args: &CommandArgs, world: &mut World) -> CommandResult {
    let lines: Vec<(String, ColorTag)> = {
        let registry = world
            .get_resource::<CommandRegistry>()
            .ok_or_else(|| CommandError::new("command registry is not available"))?;

        match args.get(0) {
            None => {
                let mut lines = vec![
                    (SEPARATOR.to_string(), ColorTag::Normal),
                    (format!("=> Thank you for using {}! <=", title(world)), ColorTag::Info),
                ];
                lines.extend(registry.list().filter_map(|cmd| {
                    cmd.get_description()
                        .map(|desc| help_line(cmd.alias(), desc))
                }));
                lines.push((SEPARATOR.to_string(), ColorTag::Normal));
                lines
            }
            // Unknown aliases print nothing.
            Some(alias) => registry
                .lookup(alias)
                .map(|cmd| match cmd.get_description() {
                    Some(desc) => help_line(cmd.alias(), desc),
                    None => (NO_HELP.to_string(), ColorTag::Warning),
                })
                .collect(),
        }
    };

    let mut output = output(world)?;
    for (text, color) in lines {
        output.append(text, color);
    }
    Ok(())
}

fn quit(_args: &CommandArgs, world: &mut World) -> CommandResult {
    let behavior = world.get_resource::<QuitBehavior>().copied().unwrap_or_default();

    let requested = match behavior {
        QuitBehavior::AppExit => world.write_message(AppExit::Success).is_some(),
        QuitBehavior::Process => std::process::exit(0),
        QuitBehavior::Deny => false,
    };

    // Only reached when the host is not shutting down.
    if !requested {
        output(world)?.error(QUIT_FAILED);
    }
    Ok(())
}

fn clear(_args: &CommandArgs, world: &mut World) -> CommandResult {
    output(world)?.clear_all();
    Ok(())
}

/// Startup system printing the welcome banner.
pub(crate) fn print_welcome(config: Res<ConsoleConfig>, mut output: ResMut<OutputHistory>) {
    if !config.print_welcome {
        return;
    }

    output.append(format!("- Thank you for using {}! -", config.title), ColorTag::Info);
    output.append(
        format!(
            "Running on {} ({}).",
            std::env::consts::OS,
            std::env::consts::ARCH
        ),
        ColorTag::Info,
    );
    output.append(SEPARATOR, ColorTag::Info);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BufferSink, dispatch};

    fn world() -> World {
        let mut world = World::new();
        let mut registry = CommandRegistry::new();
        register(&mut registry);
        world.insert_resource(registry);
        world.init_resource::<OutputHistory>();
        world.init_resource::<ConsoleConfig>();
        world
    }

    fn lines(world: &World) -> Vec<String> {
        world
            .resource::<OutputHistory>()
            .sink_as::<BufferSink>()
            .unwrap()
            .entries()
            .map(|e| e.text().to_string())
            .collect()
    }

    #[test]
    fn test_help_lists_described_commands_in_order() {
        let mut world = world();
        {
            let mut registry = world.resource_mut::<CommandRegistry>();
            registry.register(Command::new("hidden", |_, _| Ok(())));
            registry.register(Command::new("move", |_, _| Ok(())).description("Move the player"));
        }

        dispatch(&mut world, "help").unwrap();

        assert_eq!(
            lines(&world),
            vec![
                SEPARATOR.to_string(),
                "=> Thank you for using CosmicConsole! <=".to_string(),
                "help = Shows the help list".to_string(),
                "quit = Quits the application.".to_string(),
                "clear = Clears the console. (\"cls\" works too)".to_string(),
                "move = Move the player".to_string(),
                SEPARATOR.to_string(),
            ]
        );
    }

    #[test]
    fn test_help_for_alias() {
        let mut world = world();
        dispatch(&mut world, "help clear").unwrap();
        assert_eq!(lines(&world), vec!["clear = Clears the console. (\"cls\" works too)"]);
    }

    #[test]
    fn test_help_for_undescribed_alias() {
        let mut world = world();
        dispatch(&mut world, "help cls").unwrap();

        let history = world.resource::<OutputHistory>();
        let entries: Vec<_> = history.sink_as::<BufferSink>().unwrap().entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text(), NO_HELP);
        assert_eq!(entries[0].color(), ColorTag::Warning);
    }

    #[test]
    fn test_help_for_unknown_alias_prints_nothing() {
        let mut world = world();
        dispatch(&mut world, "help teleport").unwrap();
        assert!(world.resource::<OutputHistory>().is_empty());
    }

    #[test]
    fn test_clear_and_cls_empty_history() {
        let mut world = world();
        for alias in ["clear", "cls"] {
            dispatch(&mut world, "help").unwrap();
            assert!(!world.resource::<OutputHistory>().is_empty());

            dispatch(&mut world, alias).unwrap();
            assert!(world.resource::<OutputHistory>().is_empty());
            assert!(lines(&world).is_empty());
        }
    }

    #[test]
    fn test_clear_keeps_registry() {
        let mut world = world();
        let before = world.resource::<CommandRegistry>().len();
        dispatch(&mut world, "clear").unwrap();
        assert_eq!(world.resource::<CommandRegistry>().len(), before);
    }

    #[test]
    fn test_quit_denied_reports_failure() {
        let mut world = world();
        world.insert_resource(QuitBehavior::Deny);

        dispatch(&mut world, "quit").unwrap();
        assert_eq!(lines(&world), vec![QUIT_FAILED]);
    }

    #[test]
    fn test_quit_failed_text() {
        let mut world = world();
        world.insert_resource(QuitBehavior::Deny);

        dispatch(&mut world, "quit").unwrap();
        assert_eq!(lines(&world), vec!["Quitting Failed..."]);
    }

    #[test]
    fn test_quit_without_app_exit_messages_fails() {
        // A bare world has no `Messages<AppExit>` to write to.
        let mut world = world();
        dispatch(&mut world, "quit").unwrap();
        assert_eq!(lines(&world), vec![QUIT_FAILED]);
    }
}
