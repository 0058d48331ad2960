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

//! Saturating selection cursor over an ordered item range.
//!
//! The controller owns only the position. Item count, selectability and the
//! visual selected state live behind [`SelectableItems`], so the same cursor
//! drives keyboard navigation in the dropdown and any other list-like UI.

/// What happens when the cursor runs off either end of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaturationMode {
    /// Stay on the last reachable item.
    Clamp,
    /// Park outside the range ("before first" / "after last").
    Sentinel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BelowRange,
    At(usize),
    AboveRange,
}

/// Items the cursor moves over.
pub trait SelectableItems {
    fn item_count(&self) -> usize;
    fn is_selectable(&self, index: usize) -> bool;
    /// Called once for the deselected index and once for the newly selected one.
    fn set_item_state(&mut self, index: usize, selected: bool);
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    mode: SaturationMode,
    position: Position,
}

impl SelectionController {
    #[must_use]
    pub const fn new(mode: SaturationMode) -> Self {
        Self { mode, position: Position::BelowRange }
    }

    #[must_use]
    pub const fn mode(&self) -> SaturationMode {
        self.mode
    }

    /// Current index, or `None` when parked at a sentinel or nothing is selectable.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self.position {
            Position::At(index) => Some(index),
            Position::BelowRange | Position::AboveRange => None,
        }
    }

    /// Move to the default position: the first selectable item in clamp mode,
    /// the "before first" sentinel in sentinel mode.
    pub fn reset<I: SelectableItems + ?Sized>(&mut self, items: &mut I) {
        let target = match self.mode {
            SaturationMode::Clamp => (0..items.item_count())
                .find(|&i| items.is_selectable(i))
                .map_or(Position::BelowRange, Position::At),
            SaturationMode::Sentinel => Position::BelowRange,
        };
        self.move_to(items, target);
    }

    /// Advance to the nearest selectable item after the current position.
    pub fn select_next_item<I: SelectableItems + ?Sized>(&mut self, items: &mut I) -> bool {
        let count = items.item_count();
        let start = match self.position {
            Position::BelowRange => 0,
            Position::At(index) => index.saturating_add(1),
            Position::AboveRange => count,
        };
        if let Some(next) = (start..count).find(|&i| items.is_selectable(i)) {
            self.move_to(items, Position::At(next));
            return true;
        }
        if self.mode == SaturationMode::Sentinel {
            self.move_to(items, Position::AboveRange);
        }
        false
    }

    /// Retreat to the nearest selectable item before the current position.
    pub fn select_previous_item<I: SelectableItems + ?Sized>(&mut self, items: &mut I) -> bool {
        let count = items.item_count();
        let end = match self.position {
            Position::BelowRange => 0,
            Position::At(index) => index.min(count),
            Position::AboveRange => count,
        };
        if let Some(previous) = (0..end).rev().find(|&i| items.is_selectable(i)) {
            self.move_to(items, Position::At(previous));
            return true;
        }
        if self.mode == SaturationMode::Sentinel {
            self.move_to(items, Position::BelowRange);
        }
        false
    }

    /// Jump to `index`. Out-of-range values clamp or park at a sentinel.
    /// A non-selectable target is rejected and the position is left unchanged.
    pub fn set_position<I: SelectableItems + ?Sized>(
        &mut self,
        items: &mut I,
        index: isize,
    ) -> bool {
        let count = items.item_count();
        let target = match (self.mode, usize::try_from(index)) {
            (SaturationMode::Sentinel, Err(_)) => Position::BelowRange,
            (SaturationMode::Sentinel, Ok(i)) if i >= count => Position::AboveRange,
            (SaturationMode::Clamp, _) if count == 0 => return false,
            (SaturationMode::Clamp, Err(_)) => Position::At(0),
            (SaturationMode::Clamp, Ok(i)) => Position::At(i.min(count - 1)),
            (SaturationMode::Sentinel, Ok(i)) => Position::At(i),
        };
        if let Position::At(i) = target
            && !items.is_selectable(i)
        {
            return false;
        }
        self.move_to(items, target);
        true
    }

    fn move_to<I: SelectableItems + ?Sized>(&mut self, items: &mut I, target: Position) {
        if target == self.position {
            return;
        }
        if let Position::At(old) = self.position
            && old < items.item_count()
        {
            items.set_item_state(old, false);
        }
        if let Position::At(new) = target {
            items.set_item_state(new, true);
        }
        self.position = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Items {
        selectable: Vec<bool>,
        events: Vec<(usize, bool)>,
    }

    impl Items {
        fn new(selectable: &[bool]) -> Self {
            Self { selectable: selectable.to_vec(), events: Vec::new() }
        }

        fn from_mask(count: usize, mask: u32) -> Self {
            Self::new(&(0..count).map(|i| mask & (1 << i) != 0).collect::<Vec<_>>())
        }

        fn selectable_indices(&self) -> Vec<usize> {
            (0..self.selectable.len()).filter(|&i| self.selectable[i]).collect()
        }
    }

    impl SelectableItems for Items {
        fn item_count(&self) -> usize {
            self.selectable.len()
        }

        fn is_selectable(&self, index: usize) -> bool {
            self.selectable.get(index).copied().unwrap_or(false)
        }

        fn set_item_state(&mut self, index: usize, selected: bool) {
            self.events.push((index, selected));
        }
    }

    #[test]
    fn next_visits_every_selectable_index_for_all_subsets() {
        for count in 0..=6 {
            for mask in 0..(1u32 << count) {
                for mode in [SaturationMode::Clamp, SaturationMode::Sentinel] {
                    let mut items = Items::from_mask(count, mask);
                    let expected = items.selectable_indices();
                    let mut ctl = SelectionController::new(mode);
                    ctl.reset(&mut items);

                    let mut visited = Vec::new();
                    if mode == SaturationMode::Clamp
                        && let Some(first) = ctl.position()
                    {
                        visited.push(first);
                    }
                    while ctl.select_next_item(&mut items) {
                        visited.push(ctl.position().unwrap());
                    }
                    assert_eq!(visited, expected, "count={count} mask={mask:b} mode={mode:?}");

                    match mode {
                        SaturationMode::Clamp => {
                            assert_eq!(ctl.position(), expected.last().copied());
                        }
                        SaturationMode::Sentinel => assert_eq!(ctl.position(), None),
                    }
                }
            }
        }
    }

    #[test]
    fn previous_visits_selectable_indices_in_reverse() {
        for count in 0..=6 {
            for mask in 0..(1u32 << count) {
                let mut items = Items::from_mask(count, mask);
                let mut expected = items.selectable_indices();
                expected.reverse();
                let mut ctl = SelectionController::new(SaturationMode::Sentinel);
                ctl.reset(&mut items);
                // Walk past the end so the cursor parks above the range.
                while ctl.select_next_item(&mut items) {}

                let mut visited = Vec::new();
                while ctl.select_previous_item(&mut items) {
                    visited.push(ctl.position().unwrap());
                }
                assert_eq!(visited, expected, "count={count} mask={mask:b}");
                assert_eq!(ctl.position(), None);
            }
        }
    }

    #[test]
    fn clamp_mode_stays_at_last_item() {
        let mut items = Items::new(&[true, true]);
        let mut ctl = SelectionController::new(SaturationMode::Clamp);
        ctl.reset(&mut items);
        assert!(ctl.select_next_item(&mut items));
        assert!(!ctl.select_next_item(&mut items));
        assert_eq!(ctl.position(), Some(1));
        assert!(ctl.select_previous_item(&mut items));
        assert!(!ctl.select_previous_item(&mut items));
        assert_eq!(ctl.position(), Some(0));
    }

    #[test]
    fn empty_range_never_selects() {
        let mut items = Items::new(&[]);
        for mode in [SaturationMode::Clamp, SaturationMode::Sentinel] {
            let mut ctl = SelectionController::new(mode);
            ctl.reset(&mut items);
            assert!(!ctl.select_next_item(&mut items));
            assert!(!ctl.select_previous_item(&mut items));
            assert!(!ctl.set_position(&mut items, 0) || mode == SaturationMode::Sentinel);
            assert_eq!(ctl.position(), None);
        }
        assert!(items.events.is_empty());
    }

    #[test]
    fn transitions_notify_old_and_new_index_once() {
        let mut items = Items::new(&[true, false, true]);
        let mut ctl = SelectionController::new(SaturationMode::Sentinel);
        ctl.reset(&mut items);
        assert!(items.events.is_empty());

        ctl.select_next_item(&mut items);
        ctl.select_next_item(&mut items);
        ctl.select_next_item(&mut items);
        assert_eq!(items.events, vec![(0, true), (0, false), (2, true), (2, false)]);
    }

    #[test]
    fn set_position_clamps_in_clamp_mode() {
        let mut items = Items::new(&[true, true, true]);
        let mut ctl = SelectionController::new(SaturationMode::Clamp);
        assert!(ctl.set_position(&mut items, 10));
        assert_eq!(ctl.position(), Some(2));
        assert!(ctl.set_position(&mut items, -4));
        assert_eq!(ctl.position(), Some(0));
    }

    #[test]
    fn set_position_parks_at_sentinel_in_sentinel_mode() {
        let mut items = Items::new(&[true, true]);
        let mut ctl = SelectionController::new(SaturationMode::Sentinel);
        assert!(ctl.set_position(&mut items, 1));
        assert!(ctl.set_position(&mut items, 5));
        assert_eq!(ctl.position(), None);
        // From "after last", previous lands on the last item.
        assert!(ctl.select_previous_item(&mut items));
        assert_eq!(ctl.position(), Some(1));
        assert!(ctl.set_position(&mut items, -1));
        assert_eq!(ctl.position(), None);
    }

    #[test]
    fn set_position_rejects_non_selectable_target() {
        let mut items = Items::new(&[true, false]);
        let mut ctl = SelectionController::new(SaturationMode::Clamp);
        ctl.reset(&mut items);
        assert!(!ctl.set_position(&mut items, 1));
        assert_eq!(ctl.position(), Some(0));
        // Clamping onto a non-selectable last item is rejected too.
        assert!(!ctl.set_position(&mut items, 7));
        assert_eq!(ctl.position(), Some(0));
    }
}
