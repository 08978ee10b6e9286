use crate::app::App;
use crate::util::{clean_snippet, strip_control_chars, truncate_to_width};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Format an RFC 3339 timestamp relative to `now` ("5m", "3h", "2d", "Mar 04").
pub fn format_relative_time(published_at: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(ts) = published_at.and_then(|s| DateTime::parse_from_rfc3339(s).ok()) else {
        return String::new();
    };

    let diff = now.signed_duration_since(ts).num_seconds();

    // Clock skew between publisher and us
    if diff < 0 {
        return "now".to_string();
    }
    if diff < 3600 {
        return format!("{}m", diff / 60);
    }
    if diff < 86400 {
        return format!("{}h", diff / 3600);
    }
    if diff < 604800 {
        return format!("{}d", diff / 86400);
    }
    ts.format("%b %d").to_string()
}

/// Render the headline list: title, snippet, then age and link hint.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let inner_width = area.width.saturating_sub(4) as usize;
    let now = Utc::now();

    let style_title = app.style("article_title");
    let style_body = app.style("article_body");
    let style_meta = app.style("article_meta");
    let style_link = app.style("article_link");

    let items: Vec<ListItem> = if app.feed.articles.is_empty() {
        let msg = if app.feed.loading {
            "Loading headlines..."
        } else if app.feed.last_error.is_some() {
            "Could not load headlines. Press r to retry."
        } else {
            "No headlines"
        };
        vec![ListItem::new(Span::styled(msg, style_meta))]
    } else {
        app.feed
            .articles
            .iter()
            .map(|article| {
                let title = strip_control_chars(&article.title);
                let mut lines = vec![Line::from(Span::styled(
                    truncate_to_width(&title, inner_width).into_owned(),
                    style_title.add_modifier(Modifier::BOLD),
                ))];

                let snippet = article
                    .description
                    .as_deref()
                    .or(article.content.as_deref())
                    .map(clean_snippet)
                    .unwrap_or_default();
                if !snippet.is_empty() {
                    lines.push(Line::from(Span::styled(
                        truncate_to_width(&snippet, inner_width).into_owned(),
                        style_body,
                    )));
                }

                let mut meta = Vec::with_capacity(2);
                let age = format_relative_time(article.published_at.as_deref(), now);
                if !age.is_empty() {
                    meta.push(Span::styled(format!("{}  ", age), style_meta));
                }
                if article.url.is_some() {
                    meta.push(Span::styled("Read more", style_link));
                }
                lines.push(Line::from(meta));
                lines.push(Line::default());

                ListItem::new(lines)
            })
            .collect()
    };

    let title = if app.feed.loading {
        format!(
            " {} {} Loading ",
            app.category,
            SPINNER[app.spinner_frame % SPINNER.len()]
        )
    } else {
        format!(" {} ({}) ", app.category, app.feed.articles.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border"))
                .title(title),
        )
        .highlight_style(app.style("article_selected"));

    let selected = (!app.feed.articles.is_empty()).then_some(app.selected_article);
    let mut state = ListState::default().with_selected(selected);
    f.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_relative_time_buckets() {
        assert_eq!(format_relative_time(Some("2024-03-10T11:55:00Z"), now()), "5m");
        assert_eq!(format_relative_time(Some("2024-03-10T09:00:00Z"), now()), "3h");
        assert_eq!(format_relative_time(Some("2024-03-08T12:00:00Z"), now()), "2d");
        assert_eq!(format_relative_time(Some("2024-02-01T08:00:00Z"), now()), "Feb 01");
    }

    #[test]
    fn test_relative_time_edge_cases() {
        assert_eq!(format_relative_time(None, now()), "");
        assert_eq!(format_relative_time(Some("yesterday"), now()), "");
        assert_eq!(format_relative_time(Some("2024-03-11T00:00:00Z"), now()), "now");
    }
}
