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

use super::state::{DropdownRow, Navigation, OmniboxView, RowView};
use crate::config::SuggestionsConfig;
use crate::dropdown::{ColorScheme, LayoutDirection, ViewInfo, ViewType};
use crate::engine::Disposition;
use crate::pool::{Acquired, RecycledViewPool, ViewFactory};
use crate::surface::{NavigationDelegate, RenderingSurface};
use std::cell::RefCell;
use std::rc::Rc;

/// Builds terminal row views.
#[derive(Debug, Default)]
pub struct RowFactory;

impl ViewFactory<RowView> for RowFactory {
    fn create_view(&self, view_type: ViewType) -> RowView {
        RowView::new(view_type)
    }
}

/// Renders the orchestrator's entries into the shared [`OmniboxView`], reusing
/// row views through a recycled pool.
pub struct TuiSurface {
    view: Rc<RefCell<OmniboxView>>,
    pool: RecycledViewPool<RowView>,
    factory: Rc<RowFactory>,
}

impl TuiSurface {
    pub fn new(view: Rc<RefCell<OmniboxView>>, config: &SuggestionsConfig) -> Self {
        let factory = Rc::new(RowFactory);
        let pool: RecycledViewPool<RowView> =
            RecycledViewPool::new(factory.clone(), config.pool_caps.clone(), config.low_end_device);
        Self { view, pool, factory }
    }

    /// Fill the pool ahead of the first session. Must run inside a `LocalSet`.
    pub fn prewarm(&mut self, config: &SuggestionsConfig) {
        let counts: Vec<(ViewType, usize)> = ViewType::ALL
            .iter()
            .map(|&view_type| (view_type, config.pool_cap(view_type)))
            .collect();
        let _ = self.pool.prewarm(&counts);
    }

    fn recycle_rows(&mut self) {
        let rows = std::mem::take(&mut self.view.borrow_mut().rows);
        for row in rows {
            self.pool.release(row.view.view_type, row.view);
        }
    }

    fn row_view(&mut self, view_type: ViewType) -> RowView {
        match self.pool.acquire(view_type) {
            Acquired::Reused(view) => view,
            Acquired::MustCreate => self.factory.create_view(view_type),
        }
    }
}

impl RenderingSurface for TuiSurface {
    fn apply_view_info_list(&mut self, items: &[ViewInfo]) {
        self.recycle_rows();
        let rows: Vec<DropdownRow> = items
            .iter()
            .map(|info| DropdownRow { view: self.row_view(info.view_type), info: info.clone() })
            .collect();
        self.view.borrow_mut().rows = rows;
    }

    fn set_layout_direction(&mut self, direction: LayoutDirection) {
        self.view.borrow_mut().layout_direction = direction;
    }

    fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.view.borrow_mut().color_scheme = scheme;
    }

    fn notify_session_active(&mut self, active: bool) {
        let mut view = self.view.borrow_mut();
        view.session_active = active;
        if active {
            view.list_final = false;
        } else {
            view.last_reuse = Some(self.pool.flush_session_stats());
        }
    }

    fn notify_list_final(&mut self, is_final: bool) {
        self.view.borrow_mut().list_final = is_final;
    }
}

impl Drop for TuiSurface {
    fn drop(&mut self) {
        self.pool.destroy();
    }
}

/// Applies navigation side effects to the shared view.
pub struct TuiDelegate {
    view: Rc<RefCell<OmniboxView>>,
}

impl TuiDelegate {
    pub fn new(view: Rc<RefCell<OmniboxView>>) -> Self {
        Self { view }
    }
}

impl NavigationDelegate for TuiDelegate {
    fn navigate(&mut self, url: &str, disposition: Disposition) {
        let navigation = Navigation { url: url.to_owned(), disposition };
        self.view.borrow_mut().last_navigation = Some(navigation);
    }

    fn clear_omnibox_focus(&mut self) {
        let mut view = self.view.borrow_mut();
        view.focused = false;
        view.input.clear();
        view.keyboard_visible = false;
    }

    fn set_omnibox_text(&mut self, text: &str) {
        self.view.borrow_mut().input.set_text(text);
    }

    fn hide_keyboard(&mut self) {
        self.view.borrow_mut().keyboard_visible = false;
    }
}
