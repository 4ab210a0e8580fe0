//! Adapters from Bevy mouse and keyboard input to editor events.

use bevy::prelude::*;
use bevy::window::{CursorIcon, CursorMoved, PrimaryWindow, SystemCursorIcon};
use bevy_egui::EguiContexts;

use super::params::{CameraParams, is_cursor_over_ui, is_typing_in_ui};
use super::polygons::{
    CursorHint, EditorCommand, Modifiers, PointerButton, PointerEvent, PointerKind, PolygonEditor,
};

fn modifiers(keyboard: &ButtonInput<KeyCode>) -> Modifiers {
    Modifiers {
        ctrl: keyboard.any_pressed([
            KeyCode::ControlLeft,
            KeyCode::ControlRight,
            KeyCode::SuperLeft,
            KeyCode::SuperRight,
        ]),
        shift: keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        alt: keyboard.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]),
    }
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// Keyboard shortcut table
pub fn command_for_key(key: KeyCode, modifiers: Modifiers) -> Option<EditorCommand> {
    match key {
        KeyCode::KeyZ if modifiers.ctrl && modifiers.shift => Some(EditorCommand::Redo),
        KeyCode::KeyZ if modifiers.ctrl => Some(EditorCommand::Undo),
        KeyCode::KeyY if modifiers.ctrl => Some(EditorCommand::Redo),
        _ if modifiers.ctrl => None,
        KeyCode::KeyE => Some(EditorCommand::StartCreate),
        KeyCode::Escape | KeyCode::Enter => Some(EditorCommand::Finish),
        KeyCode::Delete | KeyCode::Backspace => Some(EditorCommand::DeleteSelected),
        KeyCode::ArrowUp => Some(EditorCommand::CycleCategory(1)),
        KeyCode::ArrowDown => Some(EditorCommand::CycleCategory(-1)),
        _ => None,
    }
}

/// Feed cursor movement and left/right button presses into the editor.
///
/// Presses over egui panels are ignored; releases always reach the editor
/// so a drag that ends over a panel still finishes.
pub fn handle_pointer_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut cursor_moved: MessageReader<CursorMoved>,
    camera: CameraParams,
    mut editor: ResMut<PolygonEditor>,
    mut contexts: EguiContexts,
) {
    let moved = cursor_moved.read().count() > 0;

    let Some(screen) = camera.cursor_position() else {
        return;
    };
    let Some(projector) = camera.projector() else {
        return;
    };

    let over_ui = is_cursor_over_ui(&mut contexts);
    let modifiers = modifiers(&keyboard);
    let mut events = Vec::new();

    if moved && (!over_ui || editor.is_dragging()) {
        events.push(PointerEvent::moved(screen));
    }
    for button in mouse_button.get_just_pressed() {
        if let Some(button) = pointer_button(*button)
            && !over_ui
        {
            events.push(PointerEvent::down(button, screen));
        }
    }
    for button in mouse_button.get_just_released() {
        if let Some(button) = pointer_button(*button) {
            events.push(PointerEvent::up(button, screen));
        }
    }

    for mut event in events {
        event.modifiers = modifiers;
        // Refusals are kept in `last_error` for the status bar
        if let Err(e) = editor.handle_pointer(&event, &projector)
            && event.kind == PointerKind::Down
        {
            debug!("Pointer {:?} refused: {}", event.button, e);
        }
    }
}

pub fn handle_editor_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut editor: ResMut<PolygonEditor>,
    mut contexts: EguiContexts,
) {
    // Don't handle shortcuts while typing in a text field
    if is_typing_in_ui(&mut contexts) {
        return;
    }

    let modifiers = modifiers(&keyboard);
    for key in keyboard.get_just_pressed() {
        if let Some(command) = command_for_key(*key, modifiers)
            && let Err(e) = editor.handle_command(command)
        {
            debug!("Command {:?} refused: {}", command, e);
        }
    }
}

fn cursor_icon(hint: CursorHint) -> CursorIcon {
    let icon = match hint {
        CursorHint::Default => SystemCursorIcon::Default,
        CursorHint::Pointer => SystemCursorIcon::Pointer,
        CursorHint::Crosshair => SystemCursorIcon::Crosshair,
        CursorHint::Grab => SystemCursorIcon::Grab,
        CursorHint::Insert => SystemCursorIcon::Copy,
    };
    CursorIcon::System(icon)
}

pub fn update_cursor_icon(
    editor: Res<PolygonEditor>,
    window_query: Query<Entity, With<PrimaryWindow>>,
    mut commands: Commands,
    mut contexts: EguiContexts,
) {
    let Ok(entity) = window_query.single() else {
        return;
    };

    // Use default cursor over UI, editor hint on the canvas
    let icon = if is_cursor_over_ui(&mut contexts) {
        CursorIcon::System(SystemCursorIcon::Default)
    } else if editor.is_dragging() {
        CursorIcon::System(SystemCursorIcon::Grabbing)
    } else {
        cursor_icon(editor.cursor_hint())
    };

    commands.entity(entity).insert(icon);
}
