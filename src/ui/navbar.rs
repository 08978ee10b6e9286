use crate::app::App;
use crate::feed::Category;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

/// Render the top bar: category tabs on the left, language, theme and user
/// on the right.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let style = app.style("navbar");
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .style(style)
        .title(" NewsFeed ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let user = app
        .session
        .user
        .as_ref()
        .map(|u| u.username.as_str())
        .unwrap_or_default();
    let right = Line::from(vec![
        Span::styled(format!("{} ", app.language.name()), style),
        Span::styled(format!("[{}] ", app.language.code()), app.style("navbar_active")),
        Span::styled(format!("{} ", app.theme.variant().name()), style),
        Span::styled(user.to_string(), style),
    ]);
    let right_width = (right.width() as u16).min(inner.width / 2);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_width)])
        .split(inner);

    let selected = Category::ALL
        .iter()
        .position(|&c| c == app.category)
        .unwrap_or(0);
    let tabs = Tabs::new(Category::ALL.iter().map(|c| c.name()))
        .select(selected)
        .style(style)
        .highlight_style(app.style("navbar_active"))
        .divider("|");

    f.render_widget(tabs, chunks[0]);
    f.render_widget(Paragraph::new(right).style(style), chunks[1]);
}
