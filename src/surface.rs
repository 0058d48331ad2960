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

//! Outputs of the orchestrator: the dropdown renderer and the host's navigation hooks.

use crate::dropdown::{ColorScheme, LayoutDirection, ViewInfo};
use crate::engine::Disposition;

pub trait RenderingSurface {
    /// Replace the displayed entries.
    fn apply_view_info_list(&mut self, items: &[ViewInfo]);

    fn set_layout_direction(&mut self, direction: LayoutDirection);

    fn set_color_scheme(&mut self, scheme: ColorScheme);

    fn notify_session_active(&mut self, active: bool);

    /// Whether the list on screen is the final response to the current request.
    fn notify_list_final(&mut self, is_final: bool);
}

pub trait NavigationDelegate {
    fn navigate(&mut self, url: &str, disposition: Disposition);

    fn clear_omnibox_focus(&mut self);

    fn set_omnibox_text(&mut self, text: &str);

    fn hide_keyboard(&mut self);
}
