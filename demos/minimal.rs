//! Minimal headless console example.
//!
//! Demonstrates using bevy_cosmic_console programmatically without any UI.
//! Useful for testing or custom UI implementations.
//!
//! Run with: `cargo run --example minimal --no-default-features`

use bevy::prelude::*;
use bevy_cosmic_console::BufferSink;
use bevy_cosmic_console::Command;
use bevy_cosmic_console::prelude::*;

fn main() {
    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(ConsolePlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, send_test_commands.run_if(run_once))
        .add_systems(Last, print_output)
        .run();
}

fn setup(mut console: Console) {
    console.add_command(
        Command::new("greet", |args, world| {
            let name = args.get(0).unwrap_or("World");
            world
                .resource_mut::<OutputHistory>()
                .append(format!("Hello, {name}!"), ColorTag::Info);
            Ok(())
        })
        .description("Greet someone"),
    );

    console.print("Console initialized. Registered: greet", ColorTag::Normal);
}

/// Send some test commands programmatically.
fn send_test_commands(mut events: MessageWriter<ConsoleInputEvent>) {
    events.write(ConsoleInputEvent::new("greet Developer"));
    events.write(ConsoleInputEvent::new("help greet"));
    events.write(ConsoleInputEvent::new("teleport 1 2"));
    events.write(ConsoleInputEvent::new("help"));
    events.write(ConsoleInputEvent::new("quit"));
}

/// Print whatever the buffer holds, then start over.
fn print_output(mut output: ResMut<OutputHistory>) {
    let Some(sink) = output.sink_as::<BufferSink>() else {
        return;
    };
    for entry in sink.entries() {
        println!("{}", entry.text());
    }
    output.clear_all();
}
