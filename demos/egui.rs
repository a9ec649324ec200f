//! Egui console example.
//!
//! Demonstrates the egui console overlay with custom commands and log mirroring.
//!
//! Run with: `cargo run --example egui`
//!
//! Controls:
//! - Hold F12 to toggle the console
//! - Press Enter to submit commands
//!
//! Try these commands:
//! - `help` - List all commands
//! - `spawn` / `despawn` - Spawn/despawn entities
//! - `color FF8800` - Print a line in a custom color
//! - `warn something` - Log a warning (mirrored into the console)

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_cosmic_console::Command;
use bevy_cosmic_console::prelude::*;

fn main() {
    App::new()
        // Log failing commands instead of closing the app.
        .set_error_handler(bevy::ecs::error::warn)
        .add_plugins(DefaultPlugins.set(LogPlugin {
            custom_layer: bevy_cosmic_console::log_bridge::custom_log_layer,
            ..default()
        }))
        .add_plugins(bevy_egui::EguiPlugin::default())
        .add_plugins(ConsolePlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, log_toggles)
        .run();
}

/// Marker for demo entities.
#[derive(Component)]
struct DemoEntity;

fn setup(mut commands: Commands, mut console: Console, mut session: ResMut<ConsoleSession>) {
    commands.spawn(Camera2d);

    console.add_command(
        Command::new("spawn", |_args, world| {
            world.spawn((
                Sprite {
                    color: Color::srgb(0.3, 0.7, 0.3),
                    custom_size: Some(Vec2::new(50.0, 50.0)),
                    ..default()
                },
                DemoEntity,
            ));
            info!("Spawned entity");
            Ok(())
        })
        .description("Spawn a demo entity"),
    );

    console.add_command(
        Command::new("despawn", |_args, world| {
            let entities: Vec<Entity> = world
                .query_filtered::<Entity, With<DemoEntity>>()
                .iter(world)
                .collect();
            let count = entities.len();
            for entity in entities {
                world.despawn(entity);
            }
            info!("Despawned {} entities", count);
            Ok(())
        })
        .description("Despawn all demo entities"),
    );

    console.add_command(
        Command::new("color", |args, world| {
            let mut output = world.resource_mut::<OutputHistory>();
            let Some(hex) = args.get(0) else {
                output.warn("Usage: color <hex>");
                return Ok(());
            };
            match ColorTag::hex(hex) {
                Ok(tag) => output.append(format!("This line is #{hex}"), tag),
                Err(e) => output.error(format!("Invalid color \"{hex}\": {e}")),
            };
            Ok(())
        })
        .description("Print a line in a custom color"),
    );

    console.add_command(
        Command::new("warn", |args, _world| {
            warn!("{}", args.join(" "));
            Ok(())
        })
        .description("Log a warning"),
    );

    session.on_state_change(|open| {
        info!("Console {}", if open { "opened" } else { "closed" });
    });

    info!("Hold F12 to open the console. Try: help, spawn, color FF8800");
}

fn log_toggles(mut events: MessageReader<ConsoleToggleEvent>) {
    for event in events.read() {
        debug!("Console toggle event: open = {}", event.open);
    }
}
