//! Terminal console example.
//!
//! Demonstrates using bevy_cosmic_console with stdin/stdout for headless applications
//! like dedicated servers.
//!
//! Run with: `cargo run --example terminal --no-default-features --features terminal`
//!
//! Commands:
//! - `help` - List available commands
//! - `status` - Show server status
//! - `say <message>` - Broadcast a message
//! - `quit` - Exit the application

use bevy::prelude::*;
use bevy_cosmic_console::Command;
use bevy_cosmic_console::prelude::*;
use bevy_cosmic_console::{TerminalConfig, TerminalPlugin};

#[derive(Resource)]
struct ServerInfo {
    hostname: String,
    max_players: u32,
}

fn main() {
    println!("=== Terminal Console Example ===");
    println!("Type commands and press Enter. Type 'quit' to exit.");
    println!();

    // Ensure output is flushed before starting the app
    use std::io::Write;
    let _ = std::io::stdout().flush();

    App::new()
        // Log failing commands instead of stopping the server.
        .set_error_handler(bevy::ecs::error::warn)
        .add_plugins(MinimalPlugins)
        .insert_resource(TerminalConfig { colored: true })
        .insert_resource(ServerInfo {
            hostname: "My Server".to_string(),
            max_players: 32,
        })
        .add_plugins((ConsolePlugin, TerminalPlugin))
        .add_systems(Startup, setup)
        .run();
}

fn setup(mut console: Console) {
    console.add_command(
        Command::new("status", |_args, world| {
            let info = world.resource::<ServerInfo>();
            let lines = [
                "=== Status ===".to_string(),
                format!("Hostname: {}", info.hostname),
                format!("Max Players: {}", info.max_players),
            ];

            let mut output = world.resource_mut::<OutputHistory>();
            for line in lines {
                output.append(line, ColorTag::Normal);
            }
            Ok(())
        })
        .description("Show server status"),
    );

    console.add_command(
        Command::new("say", |args, world| {
            let mut output = world.resource_mut::<OutputHistory>();
            if args.is_empty() {
                output.warn("Usage: say <message>");
            } else {
                output.append(format!("[SERVER] {}", args.join(" ")), ColorTag::Info);
            }
            Ok(())
        })
        .description("Broadcast a message"),
    );
}
