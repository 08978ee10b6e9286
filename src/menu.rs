//! Overlay menu with outside-click dismissal.
//!
//! The outside-click listener exists exactly while the menu is open; the
//! menu state is derived from it, so the two cannot disagree. The event loop
//! keeps terminal mouse capture enabled only while a listener exists.

use ratatui::layout::{Position, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Category,
    Language,
    Theme,
    Logout,
    Close,
}

impl MenuItem {
    pub const ALL: [MenuItem; 5] = [
        MenuItem::Category,
        MenuItem::Language,
        MenuItem::Theme,
        MenuItem::Logout,
        MenuItem::Close,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Category => "Next category",
            Self::Language => "Next language",
            Self::Theme => "Toggle theme",
            Self::Logout => "Logout",
            Self::Close => "Close menu",
        }
    }
}

/// Pointer-down listener scoped to one open period of the menu.
#[derive(Debug)]
struct OutsideClickListener {
    /// Area the menu occupied on the last frame; `None` until first render.
    region: Option<Rect>,
}

impl OutsideClickListener {
    fn is_outside(&self, column: u16, row: u16) -> bool {
        match self.region {
            Some(rect) => !rect.contains(Position::new(column, row)),
            None => true,
        }
    }
}

#[derive(Debug, Default)]
pub struct MenuController {
    listener: Option<OutsideClickListener>,
    selected: usize,
}

impl MenuController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MenuState {
        if self.listener.is_some() {
            MenuState::Open
        } else {
            MenuState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.listener.is_some()
    }

    /// Closed → Open. Opening an open menu keeps its existing listener.
    pub fn open(&mut self) {
        if self.listener.is_none() {
            self.listener = Some(OutsideClickListener { region: None });
            self.selected = 0;
            tracing::trace!("Menu opened, outside-click listener registered");
        }
    }

    /// Open → Closed, dropping the listener.
    pub fn close(&mut self) {
        if self.listener.take().is_some() {
            tracing::trace!("Menu closed, outside-click listener removed");
        }
    }

    pub fn toggle(&mut self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    /// Record where the menu was drawn. Ignored while closed.
    pub fn set_region(&mut self, region: Rect) {
        if let Some(listener) = self.listener.as_mut() {
            listener.region = Some(region);
        }
    }

    /// Deliver a pointer-down at a terminal cell.
    ///
    /// Returns `true` if the menu closed as a result. Points inside the menu
    /// and events while closed leave the state unchanged.
    pub fn pointer_down(&mut self, column: u16, row: u16) -> bool {
        let outside = match &self.listener {
            Some(listener) => listener.is_outside(column, row),
            None => return false,
        };
        if outside {
            self.close();
        }
        outside
    }

    /// Number of registered outside-click listeners (0 or 1).
    pub fn listener_count(&self) -> usize {
        usize::from(self.listener.is_some())
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> MenuItem {
        MenuItem::ALL[self.selected.min(MenuItem::ALL.len() - 1)]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % MenuItem::ALL.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = (self.selected + MenuItem::ALL.len() - 1) % MenuItem::ALL.len();
    }

    /// Map a click inside the menu region to the item on that row.
    ///
    /// Items start one row below the region's top border.
    pub fn item_at(&self, column: u16, row: u16) -> Option<MenuItem> {
        let region = self.listener.as_ref()?.region?;
        if !region.contains(Position::new(column, row)) {
            return None;
        }
        let offset = row.checked_sub(region.y + 1)? as usize;
        MenuItem::ALL.get(offset).copied()
    }
}

impl Drop for MenuController {
    fn drop(&mut self) {
        self.close();
    }
}
