//! Input handling for the TUI.
//!
//! Overlays capture input first: the quit prompt, then the menu. Everything
//! else goes through the global bindings.

use crate::app::{App, AppEvent, View};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if app.confirm_quit {
        return Ok(handle_confirm_input(app, code, modifiers));
    }

    if app.view == View::SignedOut {
        return Ok(handle_signed_out_input(app, code, modifiers, event_tx));
    }

    if app.menu.is_open() {
        let action = app.keybindings.action_for_key(code, modifiers, KbContext::Menu);
        if let Some(result) = handle_menu_input(app, action, event_tx) {
            return Ok(result);
        }
        // Global bindings still apply; the menu closes first
        if action.is_some() {
            app.menu.close();
        }
        return Ok(dispatch_global(app, action, event_tx));
    }

    let action = app.keybindings.action_for_key(code, modifiers, KbContext::Global);
    Ok(dispatch_global(app, action, event_tx))
}

/// "Quit with unsaved changes?" prompt. Captures all keys.
fn handle_confirm_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Confirm) {
        Some(KbAction::ConfirmYes) => Action::Quit,
        Some(KbAction::ConfirmNo) => {
            app.confirm_quit = false;
            Action::Continue
        }
        _ => Action::Continue,
    }
}

/// Entry screen: only quit and re-checking the session make sense.
fn handle_signed_out_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Global) {
        Some(KbAction::Quit) => Action::Quit,
        Some(KbAction::Refresh) | Some(KbAction::Select) => {
            app.reload_session(event_tx);
            Action::Continue
        }
        _ => Action::Continue,
    }
}

/// Menu navigation. Returns `None` for actions the menu doesn't consume.
fn handle_menu_input(
    app: &mut App,
    action: Option<KbAction>,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Option<Action> {
    match action? {
        KbAction::NavDown => app.menu.select_next(),
        KbAction::NavUp => app.menu.select_prev(),
        KbAction::Select => {
            let item = app.menu.selected_item();
            app.activate_menu_item(item, event_tx);
        }
        KbAction::Back | KbAction::OpenMenu => app.menu.close(),
        _ => return None,
    }
    Some(Action::Continue)
}

fn dispatch_global(
    app: &mut App,
    action: Option<KbAction>,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match action {
        Some(KbAction::Quit) => {
            if app.request_quit() {
                return Action::Quit;
            }
        }
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::Back) => app.status_message = None,
        Some(KbAction::Select) | Some(KbAction::OpenInBrowser) => app.open_selected(),
        Some(KbAction::OpenMenu) => app.menu.open(),
        Some(KbAction::NextCategory) => app.select_category(app.category.next(), event_tx),
        Some(KbAction::PrevCategory) => app.select_category(app.category.prev(), event_tx),
        Some(KbAction::NextLanguage) => app.select_language(app.language.next(), event_tx),
        Some(KbAction::PrevLanguage) => app.select_language(app.language.prev(), event_tx),
        Some(KbAction::ToggleTheme) => app.toggle_theme(),
        Some(KbAction::Refresh) => app.refresh(event_tx),
        Some(KbAction::Logout) => {
            if let Err(e) = app.logout() {
                tracing::debug!(error = %e, "Signed out with a stale credential file");
            }
        }
        Some(KbAction::ConfirmYes) | Some(KbAction::ConfirmNo) | None => {}
    }
    Action::Continue
}

/// Left click. Only meaningful while the menu is open: a click on an item
/// activates it, a click anywhere outside the menu closes it.
pub(super) fn handle_mouse_down(
    app: &mut App,
    column: u16,
    row: u16,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    if !app.menu.is_open() {
        return;
    }
    if let Some(item) = app.menu.item_at(column, row) {
        app.activate_menu_item(item, event_tx);
    } else if app.menu.pointer_down(column, row) {
        tracing::debug!(column, row, "Menu closed by outside click");
        app.needs_redraw = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::cycle::FeedCycle;
    use crate::menu::MenuItem;
    use crate::session::{CredentialStore, Session};
    use ratatui::layout::Rect;

    fn test_app(name: &str) -> App {
        let dir = std::env::temp_dir().join(format!("newsfeed_input_{}", name));
        std::fs::remove_dir_all(&dir).ok();
        let config = Config {
            headlines_base_url: "http://127.0.0.1:9".into(),
            translate_base_url: "http://127.0.0.1:9".into(),
            ..Config::default()
        };
        let cycle = FeedCycle::from_config(&config, reqwest::Client::new());
        let mut app = App::new(&config, cycle, CredentialStore::new(dir.join("session.toml")));
        app.session = Session::signed_in("ada");
        app.view = View::Dashboard;
        app
    }

    fn press(app: &mut App, c: char, tx: &mpsc::Sender<AppEvent>) -> Action {
        handle_input(app, KeyCode::Char(c), KeyModifiers::NONE, tx).unwrap()
    }

    #[tokio::test]
    async fn test_quit_without_changes() {
        let (tx, _rx) = mpsc::channel(4);
        let mut app = test_app("quit_clean");
        assert!(matches!(press(&mut app, 'q', &tx), Action::Quit));
    }

    #[tokio::test]
    async fn test_quit_with_changes_asks_first() {
        let (tx, _rx) = mpsc::channel(4);
        let mut app = test_app("quit_dirty");
        press(&mut app, 't', &tx);
        assert!(matches!(press(&mut app, 'q', &tx), Action::Continue));
        assert!(app.confirm_quit);

        // Unrelated keys are swallowed by the prompt
        assert!(matches!(press(&mut app, 'j', &tx), Action::Continue));
        assert!(app.confirm_quit);

        press(&mut app, 'n', &tx);
        assert!(!app.confirm_quit);

        press(&mut app, 'q', &tx);
        assert!(matches!(press(&mut app, 'y', &tx), Action::Quit));
    }

    #[tokio::test]
    async fn test_menu_captures_navigation() {
        let (tx, _rx) = mpsc::channel(4);
        let mut app = test_app("menu_nav");
        press(&mut app, 'm', &tx);
        assert!(app.menu.is_open());

        press(&mut app, 'j', &tx);
        assert_eq!(app.menu.selected_index(), 1);

        handle_input(&mut app, KeyCode::Esc, KeyModifiers::NONE, &tx).unwrap();
        assert!(!app.menu.is_open());
    }

    #[tokio::test]
    async fn test_menu_enter_activates_item() {
        let (tx, _rx) = mpsc::channel(4);
        let mut app = test_app("menu_enter");
        app.menu.open();
        while app.menu.selected_item() != MenuItem::Theme {
            app.menu.select_next();
        }
        handle_input(&mut app, KeyCode::Enter, KeyModifiers::NONE, &tx).unwrap();
        assert!(app.theme.is_dark());
        assert!(!app.menu.is_open());
    }

    #[tokio::test]
    async fn test_global_key_in_menu_closes_it() {
        let (tx, _rx) = mpsc::channel(4);
        let mut app = test_app("menu_global");
        app.menu.open();
        press(&mut app, 't', &tx);
        assert!(app.theme.is_dark());
        assert!(!app.menu.is_open());
    }

    #[tokio::test]
    async fn test_click_outside_closes_menu() {
        let (tx, _rx) = mpsc::channel(4);
        let mut app = test_app("click_outside");
        app.menu.open();
        app.menu.set_region(Rect::new(10, 2, 20, 7));

        handle_mouse_down(&mut app, 12, 5, &tx);
        // Items start below the top border; row 5 is the third item (Theme)
        assert!(app.theme.is_dark());
        assert!(!app.menu.is_open());

        app.menu.open();
        app.menu.set_region(Rect::new(10, 2, 20, 7));
        handle_mouse_down(&mut app, 0, 0, &tx);
        assert!(!app.menu.is_open());
        assert_eq!(app.menu.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_click_on_border_keeps_menu_open() {
        let (tx, _rx) = mpsc::channel(4);
        let mut app = test_app("click_border");
        app.menu.open();
        app.menu.set_region(Rect::new(10, 2, 20, 7));
        handle_mouse_down(&mut app, 10, 2, &tx);
        assert!(app.menu.is_open());
    }

    #[tokio::test]
    async fn test_category_key_starts_cycle() {
        let (tx, _rx) = mpsc::channel(4);
        let mut app = test_app("category_key");
        handle_input(&mut app, KeyCode::Tab, KeyModifiers::NONE, &tx).unwrap();
        assert_ne!(app.category, crate::feed::Category::General);
        assert!(app.feed.loading);
        assert!(app.unsaved.is_dirty());
    }

    #[tokio::test]
    async fn test_signed_out_ignores_dashboard_keys() {
        let (tx, _rx) = mpsc::channel(4);
        let mut app = test_app("signed_out_keys");
        app.session = Session::default();
        app.view = View::SignedOut;
        press(&mut app, 'm', &tx);
        assert!(!app.menu.is_open());
        press(&mut app, 'r', &tx);
        assert_eq!(app.view, View::SignedOut);
        assert_eq!(app.generation, 0);
        assert!(matches!(press(&mut app, 'q', &tx), Action::Quit));
    }

    #[tokio::test]
    async fn test_logout_key_signs_out_even_if_credential_removal_fails() {
        let (tx, _rx) = mpsc::channel(4);
        let mut app = test_app("logout_unremovable");
        // A directory where the credential file should be cannot be removed
        std::fs::create_dir_all(app.credentials.path()).unwrap();

        press(&mut app, 'L', &tx);

        assert_eq!(app.view, View::SignedOut);
        assert_eq!(app.generation, 1);
        let status = app.status_message.as_ref().map(|(msg, _)| &**msg);
        assert!(
            status.is_some_and(|msg| msg.starts_with("Logged out, but")),
            "status: {status:?}"
        );
        std::fs::remove_dir_all(app.credentials.path()).ok();
    }
}
