// omnibox_suggestions — Omnibox suggestion sessions and dropdown rendering
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use super::App;
use crate::dropdown::{ColorScheme, LayoutDirection};
use crate::engine::{Disposition, EngineEvent};
use crate::model::Suggestion;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

pub fn handle_terminal_event(app: &mut App, event: Event) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        Event::Paste(text) => {
            ensure_focus(app);
            let (text, cursor) = {
                let mut view = app.view.borrow_mut();
                for c in text.chars().filter(|c| !c.is_control()) {
                    view.input.insert_char(c);
                }
                (view.input.text().to_owned(), view.input.cursor())
            };
            app.orchestrator.on_text_changed(&text, cursor);
        }
        Event::FocusGained => app.orchestrator.on_window_focus_changed(true),
        Event::FocusLost => app.orchestrator.on_window_focus_changed(false),
        _ => {}
    }
}

pub fn handle_engine_event(app: &mut App, event: EngineEvent) {
    app.orchestrator.on_suggestions_received(event);
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match (key.code, ctrl) {
        (KeyCode::Char('c'), true) | (KeyCode::Esc, _) => app.should_quit = true,
        (KeyCode::Tab, _) => toggle_focus(app),
        (KeyCode::Char('l'), true) => toggle_layout_direction(app),
        (KeyCode::Char('t'), true) => cycle_color_scheme(app),
        (KeyCode::Char('r'), true) => {
            if let Some(suggestion) = selected_suggestion(app) {
                app.orchestrator.on_refine(&suggestion);
            }
        }
        (KeyCode::Char('d'), true) => {
            if let Some(suggestion) = selected_suggestion(app) {
                app.orchestrator.on_delete_suggestion(&suggestion);
            }
        }
        (KeyCode::Char(c), false) => edit_input(app, |input| {
            input.insert_char(c);
            true
        }),
        (KeyCode::Backspace, _) => edit_input(app, super::state::InputLine::delete_char_before),
        (KeyCode::Delete, _) => edit_input(app, super::state::InputLine::delete_char_after),
        (KeyCode::Left, _) => app.view.borrow_mut().input.move_left(),
        (KeyCode::Right, _) => app.view.borrow_mut().input.move_right(),
        (KeyCode::Home, _) => app.view.borrow_mut().input.move_home(),
        (KeyCode::End, _) => app.view.borrow_mut().input.move_end(),
        (KeyCode::Down, _) => {
            app.orchestrator.select_next();
        }
        (KeyCode::Up, _) => {
            app.orchestrator.select_previous();
        }
        (KeyCode::PageDown | KeyCode::PageUp, _) => app.orchestrator.on_suggestions_scrolled(),
        (KeyCode::Enter, _) => {
            let disposition = if key.modifiers.contains(KeyModifiers::ALT) {
                Disposition::NewTab
            } else {
                Disposition::CurrentTab
            };
            app.orchestrator.on_enter(disposition);
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
            app.orchestrator.on_suggestions_scrolled();
        }
        MouseEventKind::Down(MouseButton::Left) => {
            let entry = app.view.borrow().entry_at(mouse.row);
            app.pressed_entry = entry;
            if let Some((_, suggestion)) = entry.and_then(|index| entry_suggestion(app, index)) {
                app.orchestrator.on_suggestion_touch_down(&suggestion);
            }
        }
        MouseEventKind::Up(button) => {
            let pressed = app.pressed_entry.take();
            let released = app.view.borrow().entry_at(mouse.row);
            if pressed.is_none() || pressed != released {
                return;
            }
            let disposition = match button {
                MouseButton::Middle => Disposition::NewBackgroundTab,
                MouseButton::Left | MouseButton::Right => Disposition::CurrentTab,
            };
            if let Some((position, suggestion)) =
                released.and_then(|index| entry_suggestion(app, index))
            {
                app.orchestrator.on_suggestion_clicked(&suggestion, position, disposition);
            }
        }
        _ => {}
    }
}

/// Apply `edit` to the input and report the new text when it changed.
fn edit_input(app: &mut App, edit: impl FnOnce(&mut super::state::InputLine) -> bool) {
    ensure_focus(app);
    let changed = {
        let mut view = app.view.borrow_mut();
        view.keyboard_visible = true;
        edit(&mut view.input).then(|| (view.input.text().to_owned(), view.input.cursor()))
    };
    if let Some((text, cursor)) = changed {
        app.orchestrator.on_text_changed(&text, cursor);
    }
}

fn ensure_focus(app: &mut App) {
    if !app.view.borrow().focused {
        toggle_focus(app);
    }
}

fn toggle_focus(app: &mut App) {
    let (focused, text) = {
        let mut view = app.view.borrow_mut();
        view.focused = !view.focused;
        view.keyboard_visible = view.focused;
        (view.focused, view.input.text().to_owned())
    };
    if focused {
        app.orchestrator.on_omnibox_focus_gained(app.page.clone(), &text, false);
    } else {
        app.orchestrator.on_omnibox_focus_lost();
    }
}

fn toggle_layout_direction(app: &mut App) {
    let next = match app.view.borrow().layout_direction {
        LayoutDirection::LeftToRight => LayoutDirection::RightToLeft,
        LayoutDirection::RightToLeft => LayoutDirection::LeftToRight,
    };
    app.orchestrator.set_layout_direction(next);
}

fn cycle_color_scheme(app: &mut App) {
    let next = match app.view.borrow().color_scheme {
        ColorScheme::Light => ColorScheme::Dark,
        ColorScheme::Dark => ColorScheme::Incognito,
        ColorScheme::Incognito => ColorScheme::Light,
    };
    app.orchestrator.set_color_scheme(next);
}

fn selected_suggestion(app: &App) -> Option<Suggestion> {
    let index = app.orchestrator.selected_position()?;
    entry_suggestion(app, index).map(|(_, suggestion)| suggestion)
}

fn entry_suggestion(app: &App, index: usize) -> Option<(usize, Suggestion)> {
    let info = app.orchestrator.items().get(index)?;
    info.suggestion().map(|(position, suggestion)| (position, suggestion.clone()))
}
