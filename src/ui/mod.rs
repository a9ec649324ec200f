//! The module that handles the user interface of the console.

use bevy::color::ColorToPacked;
use bevy::prelude::*;
use bevy_egui::*;

use crate::config::{ConsoleColors, ConsoleConfig};
use crate::core::{
    BufferSink, ConsoleInputEvent, ConsoleSession, ConsoleSubmitEvent, ConsoleToggleEvent,
    OutputHistory, SubmitAction,
};

/// egui overlay for the console. Added by [`ConsolePlugin`](crate::ConsolePlugin).
///
/// Draws the entries of the default [`BufferSink`]; other sinks render nothing here.
pub struct ConsoleUiPlugin;

impl Plugin for ConsoleUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ConsoleUiState>().add_systems(
            EguiPrimaryContextPass,
            (
                reset_on_close,
                apply_submit_actions,
                render_ui_system.run_if(|session: Res<ConsoleSession>| session.is_open()),
            )
                .chain(),
        );
    }
}

#[derive(Default, Resource)]
pub struct ConsoleUiState {
    /// Whether we have set focus and position this open or not.
    pub(crate) text_focus: bool,
    /// The command in the text bar.
    pub(crate) command: String,
    /// Give the text bar focus on the next frame.
    pub(crate) refocus: bool,
}

impl ConsoleUiState {
    /// The text currently typed into the input field.
    pub fn command(&self) -> &str {
        &self.command
    }
}

fn reset_on_close(
    mut toggle_events: MessageReader<ConsoleToggleEvent>,
    mut state: ResMut<ConsoleUiState>,
) {
    for event in toggle_events.read() {
        if !event.open {
            state.text_focus = false;
        }
    }
}

/// Acts on the [`SubmitAction`] returned for each dispatched line.
///
/// The text bar is only cleared if it still holds the dispatched line.
fn apply_submit_actions(
    mut submit_events: MessageReader<ConsoleSubmitEvent>,
    mut state: ResMut<ConsoleUiState>,
) {
    for event in submit_events.read() {
        match event.action {
            SubmitAction::ClearAndRefocus => {
                if state.command == event.line {
                    state.command.clear();
                }
                state.refocus = true;
            }
        }
    }
}

pub(crate) fn render_ui_system(
    mut contexts: EguiContexts,
    mut state: ResMut<ConsoleUiState>,
    mut session: ResMut<ConsoleSession>,
    mut output: ResMut<OutputHistory>,
    key: Option<Res<ButtonInput<KeyCode>>>,
    config: Res<ConsoleConfig>,
    mut input_events: MessageWriter<ConsoleInputEvent>,
) -> Result<(), BevyError> {
    let submit_pressed = key.is_some_and(|key| key.just_pressed(config.submit_key));

    let mut window = egui::Window::new(config.title.as_str())
        .collapsible(false)
        .default_width(900.);
    if !state.text_focus {
        let position = session.position();
        window = window.current_pos([position.x, position.y]);
    }

    let response = window.show(contexts.ctx_mut()?, |ui| {
        render_ui(
            ui,
            &mut state,
            &mut output,
            &config,
            submit_pressed,
            &mut input_events,
        )
    });

    if let Some(response) = response {
        let min = response.response.rect.min;
        session.set_position(Vec2::new(min.x, min.y));
    }
    Ok(())
}

/// The function that renders the UI of the developer console.
pub fn render_ui(
    ui: &mut egui::Ui,
    state: &mut ConsoleUiState,
    output: &mut OutputHistory,
    config: &ConsoleConfig,
    submit_pressed: bool,
    input_events: &mut MessageWriter<ConsoleInputEvent>,
) {
    // The text bar is cleared once the line was dispatched, see `apply_submit_actions`.
    fn submit_command(state: &ConsoleUiState, input_events: &mut MessageWriter<ConsoleInputEvent>) {
        if !state.command.is_empty() {
            input_events.write(ConsoleInputEvent::new(state.command.clone()));
        }
    }

    let text_edit_id = egui::Id::new("text_edit");
    if submit_pressed {
        submit_command(state, input_events);
    }

    egui::TopBottomPanel::bottom("bottom panel")
        .frame(egui::Frame::NONE.outer_margin(egui::Margin {
            left: 5,
            right: 5,
            top: 11,
            bottom: 5,
        }))
        .show_inside(ui, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Submit").clicked() {
                    submit_command(state, input_events);
                }

                egui::TextEdit::singleline(&mut state.command)
                    .id(text_edit_id)
                    .desired_width(ui.available_width())
                    .margin(egui::Vec2::splat(4.0))
                    .lock_focus(true)
                    .show(ui);

                if std::mem::take(&mut state.refocus) || !state.text_focus {
                    state.text_focus = true;
                    ui.ctx().memory_mut(|mem| mem.request_focus(text_edit_id));
                }
            });
        });

    let Some(sink) = output.sink_as_mut::<BufferSink>() else {
        return;
    };
    let scroll = sink.take_scroll_request();

    egui::ScrollArea::new([false, true])
        .auto_shrink([false, true])
        .show(ui, |ui| {
            ui.vertical(|ui| {
                let last = sink.len().saturating_sub(1);
                for (id, entry) in sink.entries().enumerate() {
                    let color = to_egui_color(&config.colors, entry.color());
                    let label = ui.label(egui::RichText::new(entry.text()).color(color));

                    if scroll && id == last {
                        label.scroll_to_me(Some(egui::Align::Max));
                    }
                }
            });
        });
}

fn to_egui_color(colors: &ConsoleColors, tag: crate::core::ColorTag) -> egui::Color32 {
    let [r, g, b, a] = colors.resolve(tag).to_srgba().to_u8_array();
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}
