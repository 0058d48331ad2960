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

//! Turning a [`SuggestionResult`](crate::model::SuggestionResult) into the
//! ordered list of renderable entries shown in the omnibox dropdown.

mod builder;
mod manager;
pub mod processors;
mod view_info;

pub use builder::{BuildContext, DropdownItemBuilder};
pub use manager::DropdownListManager;
pub use processors::SuggestionProcessor;
pub use view_info::{
    ColorScheme, DropdownItem, Icon, LayoutDirection, PresentationModel, RenderedLine, ViewInfo,
    ViewType,
};
