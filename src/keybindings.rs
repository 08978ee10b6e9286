//! Keybinding registry: maps keys to actions, with config overrides.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    Back,
    Select,
    OpenMenu,
    NextCategory,
    PrevCategory,
    NextLanguage,
    PrevLanguage,
    ToggleTheme,
    Refresh,
    OpenInBrowser,
    Logout,
    ConfirmYes,
    ConfirmNo,
}

impl Action {
    /// Human-readable description for the key hint line.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::Back => "Close / dismiss",
            Self::Select => "Select",
            Self::OpenMenu => "Menu",
            Self::NextCategory => "Next category",
            Self::PrevCategory => "Previous category",
            Self::NextLanguage => "Next language",
            Self::PrevLanguage => "Previous language",
            Self::ToggleTheme => "Toggle theme",
            Self::Refresh => "Refresh",
            Self::OpenInBrowser => "Read more",
            Self::Logout => "Logout",
            Self::ConfirmYes => "Confirm",
            Self::ConfirmNo => "Cancel",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Menu,
    Confirm,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Terminals report uppercase letters with SHIFT set; the character
    /// already carries the case, so SHIFT is dropped for `Char` keys.
    fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(_) => Self::new(self.code, self.modifiers.difference(KeyModifiers::SHIFT)),
            _ => self,
        }
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "]"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Left", "Right"
/// - Modifier combos: "Ctrl+r"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "space" => return Some(KeySpec::plain(KeyCode::Char(' '))),
        _ => {}
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|n| n.parse::<u8>().ok())
    {
        return (1..=12)
            .contains(&n)
            .then_some(KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::plain(KeyCode::Char(c))),
        _ => None,
    }
}

/// Format a KeySpec for display in the key hint line.
pub fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Context-aware key → action lookup with user overrides.
#[derive(Debug)]
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// Registration order, for hint display.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Context::{Confirm, Global, Menu};
        use KeyCode::Char;

        let defaults = [
            // === Dashboard ===
            (Global, KeySpec::plain(Char('q')), Action::Quit),
            (Global, KeySpec::ctrl('c'), Action::Quit),
            (Global, KeySpec::plain(Char('j')), Action::NavDown),
            (Global, KeySpec::plain(KeyCode::Down), Action::NavDown),
            (Global, KeySpec::plain(Char('k')), Action::NavUp),
            (Global, KeySpec::plain(KeyCode::Up), Action::NavUp),
            (Global, KeySpec::plain(KeyCode::Esc), Action::Back),
            (Global, KeySpec::plain(KeyCode::Enter), Action::Select),
            (Global, KeySpec::plain(Char('m')), Action::OpenMenu),
            (Global, KeySpec::plain(KeyCode::Tab), Action::NextCategory),
            (Global, KeySpec::plain(KeyCode::Right), Action::NextCategory),
            (Global, KeySpec::plain(KeyCode::Left), Action::PrevCategory),
            (Global, KeySpec::plain(Char(']')), Action::NextLanguage),
            (Global, KeySpec::plain(Char('[')), Action::PrevLanguage),
            (Global, KeySpec::plain(Char('t')), Action::ToggleTheme),
            (Global, KeySpec::plain(Char('r')), Action::Refresh),
            (Global, KeySpec::plain(Char('o')), Action::OpenInBrowser),
            (Global, KeySpec::plain(Char('L')), Action::Logout),
            // === Menu overlay ===
            (Menu, KeySpec::plain(Char('m')), Action::Back),
            (Menu, KeySpec::plain(KeyCode::Esc), Action::Back),
            // === Quit confirmation ===
            (Confirm, KeySpec::plain(Char('y')), Action::ConfirmYes),
            (Confirm, KeySpec::plain(Char('Y')), Action::ConfirmYes),
            (Confirm, KeySpec::plain(Char('n')), Action::ConfirmNo),
            (Confirm, KeySpec::plain(Char('N')), Action::ConfirmNo),
            (Confirm, KeySpec::plain(KeyCode::Esc), Action::ConfirmNo),
        ];

        for (context, key, action) in defaults {
            self.bind(context, key, action);
        }
    }

    /// Apply user overrides from the config `[keybindings]` table.
    ///
    /// Keys are action names (e.g. "quit", "next_language"), values are key
    /// strings (e.g. "q", "Ctrl+r", "F5"). The new key replaces every
    /// existing binding of that action, in the same contexts.
    ///
    /// Returns warnings for unknown action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, _) in self.bindings.iter().filter(|(_, _, a)| *a == action) {
                if !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a key, trying `context` then Global.
    ///
    /// The confirmation prompt does not fall back: only its own keys apply.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers).normalized();

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        match context {
            Context::Menu => self.lookup.get(&(Context::Global, key)).copied(),
            Context::Global | Context::Confirm => None,
        }
    }

    /// First key bound to `action` in `context`, formatted for display.
    pub fn key_hint(&self, context: Context, action: Action) -> Option<String> {
        self.bindings
            .iter()
            .find(|(c, _, a)| *c == context && *a == action)
            .map(|(_, key, _)| format_key(key))
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "back" => Some(Action::Back),
        "select" | "enter" => Some(Action::Select),
        "open_menu" | "menu" => Some(Action::OpenMenu),
        "next_category" | "category" => Some(Action::NextCategory),
        "prev_category" => Some(Action::PrevCategory),
        "next_language" | "language" => Some(Action::NextLanguage),
        "prev_language" => Some(Action::PrevLanguage),
        "toggle_theme" | "theme" => Some(Action::ToggleTheme),
        "refresh" => Some(Action::Refresh),
        "open_in_browser" | "open" | "read_more" => Some(Action::OpenInBrowser),
        "logout" => Some(Action::Logout),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
