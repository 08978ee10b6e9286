//! Render functions for the TUI.
//!
//! Dispatches on the current view, then draws overlays (menu, quit prompt)
//! on top.

use crate::app::{App, View};
use crate::menu::MenuItem;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use super::helpers::centered;
use super::{articles, navbar, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

const MENU_WIDTH: u16 = 32;

/// Main render dispatch function.
///
/// Takes `&mut App` because drawing the menu records its screen region for
/// outside-click detection.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    f.render_widget(Block::default().style(app.style("overlay")), area);

    match app.view {
        View::Dashboard => render_dashboard(f, app),
        View::SignedOut => render_entry(f, app),
    }

    if app.menu.is_open() {
        render_menu(f, app);
    }

    if app.confirm_quit {
        render_confirm_overlay(f, app);
    }
}

/// Navbar, headline list, status bar.
fn render_dashboard(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    navbar::render(f, app, chunks[0]);
    articles::render(f, app, chunks[1]);
    status::render(f, app, chunks[2]);
}

/// Entry screen shown when nobody is signed in.
fn render_entry(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    let text = vec![
        Line::from(Span::styled("Welcome to NewsFeed", app.style("entry_heading"))),
        Line::default(),
        Line::from("You are not signed in."),
        Line::default(),
        Line::from("Run `newsfeed login <username>` or `newsfeed signup` in a shell,"),
        Line::from("then press r to continue."),
    ];

    let overlay = centered(chunks[0], 70, 10);
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border")),
        )
        .alignment(Alignment::Center);
    f.render_widget(paragraph, overlay);
    status::render(f, app, chunks[1]);
}

/// Value shown next to a menu entry.
fn menu_value(app: &App, item: MenuItem) -> String {
    match item {
        MenuItem::Category => app.category.name().to_string(),
        MenuItem::Language => app.language.name().to_string(),
        MenuItem::Theme => app.theme.variant().name().to_string(),
        MenuItem::Logout | MenuItem::Close => String::new(),
    }
}

/// Menu dropdown anchored under the navbar's right edge.
fn render_menu(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let width = MENU_WIDTH.min(area.width);
    let height = (MenuItem::ALL.len() as u16 + 2).min(area.height.saturating_sub(3));
    let region = Rect::new(area.right().saturating_sub(width), area.y + 3, width, height);

    let selected = app.menu.selected_index();
    let items: Vec<ListItem> = MenuItem::ALL
        .iter()
        .enumerate()
        .map(|(i, &item)| {
            let style = if i == selected {
                app.style("menu_selected")
            } else {
                app.style("menu_item")
            };
            let value = menu_value(app, item);
            let label = if value.is_empty() {
                format!(" {}", item.label())
            } else {
                format!(" {}: {}", item.label(), value)
            };
            ListItem::new(Span::styled(label, style))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("menu_border"))
            .style(app.style("overlay"))
            .title(" Menu "),
    );

    f.render_widget(Clear, region);
    f.render_widget(list, region);
    app.menu.set_region(region);
}

/// "Quit with unsaved changes?" prompt.
fn render_confirm_overlay(f: &mut Frame, app: &App) {
    let overlay = centered(f.area(), 50, 7);
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let text = "You have unsaved changes.\nQuit anyway?\n\n(y) Quit  (n/Esc) Stay";
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("menu_border"))
                .title(" Confirm "),
        )
        .alignment(Alignment::Center)
        .style(app.style("overlay"));

    f.render_widget(paragraph, overlay);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::cycle::FeedCycle;
    use crate::feed::Article;
    use crate::session::{CredentialStore, Session};
    use ratatui::{backend::TestBackend, Terminal};

    fn test_app(name: &str) -> App {
        let dir = std::env::temp_dir().join(format!("newsfeed_render_{}", name));
        std::fs::remove_dir_all(&dir).ok();
        let config = Config::default();
        let cycle = FeedCycle::from_config(&config, reqwest::Client::new());
        App::new(&config, cycle, CredentialStore::new(dir.join("session.toml")))
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_entry_screen_when_signed_out() {
        let mut app = test_app("entry");
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        assert!(buffer_text(&terminal).contains("not signed in"));
    }

    #[test]
    fn test_dashboard_shows_headlines() {
        let mut app = test_app("dashboard");
        app.session = Session::signed_in("ada");
        app.view = View::Dashboard;
        app.feed.articles = vec![Article {
            title: "Rust 2.0 announced".into(),
            url_to_image: Some("x.jpg".into()),
            ..Default::default()
        }];
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Rust 2.0 announced"));
        assert!(text.contains("General"));
    }

    #[test]
    fn test_menu_render_records_region() {
        let mut app = test_app("menu_region");
        app.session = Session::signed_in("ada");
        app.view = View::Dashboard;
        app.menu.open();
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();

        // First item row sits just below the menu's top border
        assert_eq!(app.menu.item_at(90, 4), Some(MenuItem::Category));
        assert!(!app.menu.pointer_down(90, 4));
        assert!(app.menu.pointer_down(5, 20));
    }

    #[test]
    fn test_too_small_terminal() {
        let mut app = test_app("too_small");
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        assert!(buffer_text(&terminal).contains("Terminal too small"));
    }
}
