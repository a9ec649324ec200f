//! A toggleable developer console overlay for Bevy.
//!
//! bevy_cosmic_console provides:
//!
//! - **Commands**: aliases bound to handlers with `&mut World` access
//! - **Output history**: colored lines rendered by a pluggable [`OutputSink`]
//! - **Log mirroring**: the app's `tracing` output copied into the console
//! - **Session**: open/close state with a debounced toggle key
//! - Built-in `help`, `quit`, `clear` and `cls` commands
//!
//! # Features
//!
//! - `egui` (default): egui overlay ([`ui::ConsoleUiPlugin`], added by [`ConsolePlugin`])
//! - `terminal`: stdin/stdout backend for dedicated servers
//! - `config-file`: load [`ConsoleConfig`] from RON files
//! - `full`: Enable egui + config-file
//!
//! # Quick Start
//!
//! ```ignore
//! use bevy::log::LogPlugin;
//! use bevy::prelude::*;
//! use bevy_cosmic_console::Command;
//! use bevy_cosmic_console::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins.set(LogPlugin {
//!             custom_layer: bevy_cosmic_console::log_bridge::custom_log_layer,
//!             ..default()
//!         }))
//!         .add_plugins(bevy_egui::EguiPlugin::default())
//!         .add_plugins(ConsolePlugin)
//!         .add_systems(Startup, setup_console)
//!         .run();
//! }
//!
//! fn setup_console(mut console: Console) {
//!     console.add_command(Command::new("move", |args, _world| {
//!         let x: f32 = args.parse(0).ok_or("usage: move <x> <y>")?;
//!         let y: f32 = args.parse(1).ok_or("usage: move <x> <y>")?;
//!         info!("Moving to {x}, {y}");
//!         Ok(())
//!     }).description("Move the player"));
//! }
//! ```

use bevy::prelude::*;

pub mod builtins;
pub mod config;
pub mod core;
pub mod log_bridge;

// Re-export core types at crate root for convenience
pub use crate::core::{
    BufferSink, ColorTag, Command, CommandArgs, CommandError, CommandHandler, CommandRegistry,
    CommandResult, Console, ConsoleError, ConsoleEventsPlugin, ConsoleInputEvent,
    ConsoleSession, ConsoleSubmitEvent, ConsoleToggleEvent, EntryHandle, OutputEntry, OutputHistory, OutputSink,
    SubmitAction, dispatch, split_line, submit,
};

pub use builtins::QuitBehavior;
pub use config::{ConsoleColors, ConsoleConfig};
pub use log_bridge::{HostLogKind, LogBridge, LogEvent, LogHub, LogSeverity, LogSubscription};

#[cfg(feature = "config-file")]
pub use config::ConfigError;

// UI module (feature-gated)
#[cfg(feature = "egui")]
pub mod ui;

// Terminal backend (feature-gated)
#[cfg(feature = "terminal")]
pub mod terminal;

#[cfg(feature = "terminal")]
pub use terminal::{TerminalConfig, TerminalPlugin, TerminalSink};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::core::{
        ColorTag, Command, CommandArgs, CommandError, CommandResult, Console,
        ConsoleInputEvent, ConsoleSession, ConsoleToggleEvent, OutputHistory,
    };
    pub use crate::{ConsoleConfig, ConsolePlugin, QuitBehavior};
}

/// Main console plugin.
///
/// Insert a [`ConsoleConfig`], [`OutputHistory`] or [`QuitBehavior`] before
/// adding the plugin to replace the defaults.
#[derive(Default)]
pub struct ConsolePlugin;

impl Plugin for ConsolePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ConsoleConfig>()
            .init_resource::<CommandRegistry>()
            .init_resource::<OutputHistory>()
            .init_resource::<QuitBehavior>()
            .init_resource::<PendingInput>()
            .init_resource::<LogHub>()
            .init_resource::<LogBridge>()
            .add_plugins(core::ConsoleEventsPlugin);

        if !app.world().contains_resource::<ConsoleSession>() {
            let session = ConsoleSession::from_config(app.world().resource::<ConsoleConfig>());
            app.insert_resource(session);
        }
        app.world_mut()
            .resource_mut::<ConsoleSession>()
            .set_queue_transitions(true);

        builtins::register(&mut app.world_mut().resource_mut::<CommandRegistry>());

        app.add_systems(Startup, builtins::print_welcome)
            .add_systems(PreUpdate, (log_bridge::sync_log_bridge, sync_session_config))
            // 1. queue_console_input: Read input messages into the pending queue
            // 2. run_pending_input: Dispatch with exclusive World access
            // 3. update_session: Debounce timers and toggle key
            // 4. forward_session_transitions: Emit ConsoleToggleEvent messages
            .add_systems(
                Update,
                (
                    queue_console_input,
                    run_pending_input,
                    update_session,
                    forward_session_transitions,
                )
                    .chain(),
            )
            .add_systems(PostUpdate, log_bridge::drain_log_bridge);

        // egui UI (feature-gated)
        #[cfg(feature = "egui")]
        app.add_plugins(ui::ConsoleUiPlugin);
    }
}

/// Input lines waiting for dispatch.
#[derive(Resource, Default)]
struct PendingInput {
    lines: Vec<String>,
}

/// System that queues submitted lines for execution.
fn queue_console_input(
    mut input_events: MessageReader<ConsoleInputEvent>,
    mut pending: ResMut<PendingInput>,
) {
    for event in input_events.read() {
        pending.lines.push(event.command.clone());
    }
}

/// Exclusive system that dispatches queued lines with full World access.
///
/// Each dispatched line is answered with a [`ConsoleSubmitEvent`]. A failing
/// handler stops the batch; the remaining lines stay queued and the error is
/// handed to the app's error handler.
fn run_pending_input(world: &mut World) -> Result<(), BevyError> {
    let lines = match world.get_resource_mut::<PendingInput>() {
        Some(mut pending) => std::mem::take(&mut pending.lines),
        None => return Err(ConsoleError::MissingResource("PendingInput").into()),
    };

    let mut lines = lines.into_iter();
    while let Some(line) = lines.next() {
        match core::submit(world, &line) {
            Ok(Some(action)) => {
                world.write_message(ConsoleSubmitEvent { line, action });
            }
            Ok(None) => {}
            Err(e) => {
                let rest: Vec<String> = lines.collect();
                if let Some(mut pending) = world.get_resource_mut::<PendingInput>() {
                    pending.lines.splice(0..0, rest);
                }
                return Err(e.into());
            }
        }
    }
    Ok(())
}

/// Re-applies the session settings when the config changes after startup.
fn sync_session_config(config: Res<ConsoleConfig>, mut session: ResMut<ConsoleSession>) {
    if config.is_changed() && !config.is_added() {
        session.apply_config(&config);
    }
}

/// Ticks the debounce timers and reacts to the toggle key.
fn update_session(
    time: Res<Time>,
    keys: Option<Res<ButtonInput<KeyCode>>>,
    config: Res<ConsoleConfig>,
    mut session: ResMut<ConsoleSession>,
) {
    session.advance(time.delta());

    let held = keys.is_some_and(|keys| keys.pressed(config.toggle_key));
    session.poll_toggle(held);
}

/// Sends a [`ConsoleToggleEvent`] for every transition since the last frame.
fn forward_session_transitions(
    mut session: ResMut<ConsoleSession>,
    mut toggle_events: MessageWriter<ConsoleToggleEvent>,
) {
    for open in session.drain_transitions() {
        toggle_events.write(ConsoleToggleEvent { open });
    }
}
