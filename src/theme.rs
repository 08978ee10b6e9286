//! Theme system for the TUI.
//!
//! `ThemeController` owns the light/dark state. Widgets never see the state
//! itself, only the `StyleMap` built from the active `ColorPalette`.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Light,
    Dark,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Navbar --
    pub navbar: Style,
    pub navbar_active: Style,

    // -- Article list --
    pub article_title: Style,
    pub article_body: Style,
    pub article_meta: Style,
    pub article_link: Style,
    pub article_selected: Style,

    // -- Menu --
    pub menu_border: Style,
    pub menu_item: Style,
    pub menu_selected: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub status_error: Style,
    pub panel_border: Style,
    pub loading: Style,
    pub entry_heading: Style,
    pub overlay: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            navbar: Style::default().bg(Color::Black).fg(Color::White),
            navbar_active: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            article_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            article_body: Style::default().fg(Color::Gray),
            article_meta: Style::default().fg(Color::DarkGray),
            article_link: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::UNDERLINED),
            article_selected: Style::default().bg(Color::DarkGray).fg(Color::White),

            menu_border: Style::default().fg(Color::Cyan),
            menu_item: Style::default().fg(Color::White),
            menu_selected: Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_error: Style::default().bg(Color::DarkGray).fg(Color::LightRed),
            panel_border: Style::default().fg(Color::DarkGray),
            loading: Style::default().fg(Color::Yellow),
            entry_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            overlay: Style::default().bg(Color::Black).fg(Color::White),
        }
    }

    fn light() -> Self {
        Self {
            navbar: Style::default().bg(Color::Blue).fg(Color::White),
            navbar_active: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),

            article_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            article_body: Style::default().fg(Color::Black),
            article_meta: Style::default().fg(Color::DarkGray),
            article_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            article_selected: Style::default().bg(Color::Blue).fg(Color::White),

            menu_border: Style::default().fg(Color::Blue),
            menu_item: Style::default().fg(Color::Black),
            menu_selected: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_error: Style::default().bg(Color::White).fg(Color::Red),
            panel_border: Style::default().fg(Color::DarkGray),
            loading: Style::default().fg(Color::Magenta),
            entry_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            overlay: Style::default().bg(Color::White).fg(Color::Black),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// String-keyed style lookup built from a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 16] = [
    "navbar",
    "navbar_active",
    "article_title",
    "article_body",
    "article_meta",
    "article_link",
    "article_selected",
    "menu_border",
    "menu_item",
    "menu_selected",
    "status_bar",
    "status_error",
    "panel_border",
    "loading",
    "entry_heading",
    "overlay",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 16] = [
            p.navbar,
            p.navbar_active,
            p.article_title,
            p.article_body,
            p.article_meta,
            p.article_link,
            p.article_selected,
            p.menu_border,
            p.menu_item,
            p.menu_selected,
            p.status_bar,
            p.status_error,
            p.panel_border,
            p.loading,
            p.entry_heading,
            p.overlay,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name to its `Style`. Unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Theme Controller
// ============================================================================

/// Light/dark state plus the style map derived from it.
#[derive(Debug, Clone)]
pub struct ThemeController {
    variant: ThemeVariant,
    styles: StyleMap,
}

impl Default for ThemeController {
    fn default() -> Self {
        Self::new(ThemeVariant::Light)
    }
}

impl ThemeController {
    pub fn new(variant: ThemeVariant) -> Self {
        Self {
            variant,
            styles: StyleMap::from_palette(&variant.palette()),
        }
    }

    pub fn variant(&self) -> ThemeVariant {
        self.variant
    }

    pub fn is_dark(&self) -> bool {
        self.variant == ThemeVariant::Dark
    }

    /// Flip between light and dark. Returns the new variant.
    pub fn toggle(&mut self) -> ThemeVariant {
        self.apply(self.variant.next());
        self.variant
    }

    /// Force the light theme.
    pub fn reset(&mut self) {
        self.apply(ThemeVariant::Light);
    }

    fn apply(&mut self, variant: ThemeVariant) {
        if variant != self.variant {
            tracing::debug!(theme = variant.name(), "Theme changed");
        }
        self.variant = variant;
        self.styles = StyleMap::from_palette(&variant.palette());
    }

    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    pub fn style(&self, role: &str) -> Style {
        self.styles.resolve(role)
    }
}

// ============================================================================
// Tests
// ============================================================================
