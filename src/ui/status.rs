use crate::app::{App, View};
use crate::keybindings::{Action, Context};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

const DASHBOARD_HINTS: [Action; 6] = [
    Action::OpenMenu,
    Action::NextCategory,
    Action::NextLanguage,
    Action::Refresh,
    Action::OpenInBrowser,
    Action::Quit,
];

/// Build the key hint line from the active bindings, so overrides show up.
fn hint_line(app: &App) -> String {
    DASHBOARD_HINTS
        .iter()
        .filter_map(|&action| {
            app.keybindings
                .key_hint(Context::Global, action)
                .map(|key| format!("[{}] {}", key, action.describe()))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let (text, style): (Cow<'_, str>, _) = if let Some((msg, _)) = &app.status_message {
        (Cow::Borrowed(msg.as_ref()), app.style("status_bar"))
    } else if let Some(err) = &app.feed.last_error {
        (Cow::Owned(format!("Error: {}", err)), app.style("status_error"))
    } else {
        let hints = match app.view {
            View::Dashboard => hint_line(app),
            View::SignedOut => "[r] Check again  [q] Quit".to_string(),
        };
        (Cow::Owned(hints), app.style("status_bar"))
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}
