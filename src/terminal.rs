//! Terminal backend for headless/dedicated server console.
//!
//! Lines typed on stdin are submitted as [`ConsoleInputEvent`]s and console
//! output is written to stdout through [`TerminalSink`].

use std::any::Any;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use bevy::color::ColorToPacked;
use bevy::prelude::*;

use crate::core::{ColorTag, ConsoleInputEvent, EntryHandle, OutputEntry, OutputHistory, OutputSink};

/// Plugin that adds terminal (stdin/stdout) console support.
///
/// Replaces the [`OutputHistory`] sink, so add it after
/// [`ConsolePlugin`](crate::ConsolePlugin).
pub struct TerminalPlugin;

impl Plugin for TerminalPlugin {
    fn build(&self, app: &mut App) {
        let (sender, receiver) = mpsc::channel();
        let _handle = spawn_stdin_reader(sender);

        app.init_resource::<TerminalConfig>();
        let colored = app.world().resource::<TerminalConfig>().colored;

        app.insert_resource(OutputHistory::new(TerminalSink::new(colored)))
            .insert_resource(StdinReceiver(Mutex::new(receiver)))
            .add_systems(PreUpdate, read_stdin);
    }
}

/// Configuration for terminal behavior.
#[derive(Resource)]
pub struct TerminalConfig {
    /// Whether to use colored output (ANSI escape codes).
    pub colored: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self { colored: false }  // Disabled by default - causes issues on some terminals
    }
}

/// Output sink that prints each entry to stdout.
///
/// Printed lines cannot be retracted, so destroying an entry only forgets it.
#[derive(Debug, Default)]
pub struct TerminalSink {
    colored: bool,
    next_handle: u64,
    live: usize,
}

impl TerminalSink {
    pub fn new(colored: bool) -> Self {
        Self {
            colored,
            ..default()
        }
    }

    /// Entries written and not yet destroyed.
    pub fn live_entries(&self) -> usize {
        self.live
    }

    fn format(&self, entry: &OutputEntry) -> String {
        if !self.colored {
            return entry.text().to_string();
        }
        format!("{}{}\x1b[0m", ansi_color(entry.color()), entry.text())
    }
}

impl OutputSink for TerminalSink {
    fn create_entry(&mut self, entry: OutputEntry) -> EntryHandle {
        println!("{}", self.format(&entry));
        self.next_handle += 1;
        self.live += 1;
        EntryHandle(self.next_handle)
    }

    fn destroy_entry(&mut self, _handle: EntryHandle) {
        self.live = self.live.saturating_sub(1);
    }

    fn scroll_to_latest(&mut self) {
        let _ = io::stdout().flush();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn ansi_color(tag: ColorTag) -> String {
    match tag {
        ColorTag::Normal => "\x1b[0m".to_string(),
        ColorTag::Info => "\x1b[36m".to_string(),
        ColorTag::Warning => "\x1b[33m".to_string(),
        ColorTag::Error => "\x1b[31m".to_string(),
        ColorTag::Custom(color) => {
            let [r, g, b] = color.to_u8_array_no_alpha();
            format!("\x1b[38;2;{r};{g};{b}m")
        }
    }
}

#[derive(Resource)]
struct StdinReceiver(Mutex<Receiver<String>>);

fn spawn_stdin_reader(sender: Sender<String>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        let handle = stdin.lock();

        for line in handle.lines().map_while(|line| line.ok()) {
            if line.trim().is_empty() {
                continue;
            }
            if sender.send(line).is_err() {
                break;
            }
        }
    })
}

fn read_stdin(receiver: Res<StdinReceiver>, mut events: MessageWriter<ConsoleInputEvent>) {
    let Ok(rx) = receiver.0.lock() else {
        return;
    };
    while let Ok(line) = rx.try_recv() {
        events.write(ConsoleInputEvent::new(line));
    }
}
