use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Display width of a string in terminal columns.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate `s` to at most `max_width` columns, appending "..." when cut.
///
/// Widths of 3 or less leave no room for the ellipsis, so the text is simply
/// clipped.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, suffix) = if max_width <= ELLIPSIS.len() {
        (max_width, "")
    } else {
        (max_width - ELLIPSIS.len(), ELLIPSIS)
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..end], suffix))
}

/// Remove terminal control characters and ANSI escape sequences.
///
/// Headline text comes from arbitrary publishers; anything that could move
/// the cursor or recolor the terminal is dropped. Tab, newline and carriage
/// return are kept.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let is_bad = |c: char| c == '\x1b' || c == '\x7f' || (c < ' ' && !matches!(c, '\t' | '\n' | '\r'));
    if !s.chars().any(is_bad) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            if !is_bad(c) {
                out.push(c);
            }
            continue;
        }
        match chars.peek() {
            // CSI: ESC [ params... final byte in 0x40..=0x7E
            Some('[') => {
                chars.next();
                for c in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&c) {
                        break;
                    }
                }
            }
            // OSC: ESC ] ... terminated by BEL or ESC \
            Some(']') => {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    Cow::Owned(out)
}

/// Prepare aggregator text for a single display line.
///
/// Strips control sequences, collapses whitespace runs (including newlines)
/// to single spaces, and drops the trailing `[+1234 chars]` marker the
/// aggregator appends to clipped content.
pub fn clean_snippet(s: &str) -> String {
    let stripped = strip_control_chars(s);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    strip_truncation_marker(&collapsed).to_string()
}

fn strip_truncation_marker(s: &str) -> &str {
    let Some(start) = s.rfind("[+") else {
        return s;
    };
    let marker = &s[start + 2..];
    let is_marker = marker
        .strip_suffix(" chars]")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
    if is_marker {
        s[..start].trim_end()
    } else {
        s
    }
}
