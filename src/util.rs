//! Shared text helpers for the TUI

use unicode_width::UnicodeWidthChar;

/// Truncate a string to at most `max_cols` display columns, appending an
/// ellipsis when anything was cut.
pub fn clip_right(s: &str, max_cols: usize) -> String {
    if max_cols == 0 {
        return String::new();
    }
    if display_width(s) <= max_cols {
        return s.to_string();
    }
    let budget = max_cols.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Drop the leading `cols` display columns of a string. Used to render a
/// swiped row: the content slides left and its left edge is clipped. A wide
/// character straddling the cut is replaced by a space so columns line up.
pub fn cut_left(s: &str, cols: usize) -> String {
    if cols == 0 {
        return s.to_string();
    }
    let mut skipped = 0;
    let mut out = String::new();
    let mut cutting = true;
    for ch in s.chars() {
        if !cutting {
            out.push(ch);
            continue;
        }
        let w = ch.width().unwrap_or(0);
        if skipped + w <= cols {
            skipped += w;
            if skipped == cols {
                cutting = false;
            }
        } else {
            // Wide char straddles the boundary
            out.push(' ');
            cutting = false;
        }
    }
    out
}

pub fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_right_keeps_short_strings() {
        assert_eq!(clip_right("hello", 10), "hello");
        assert_eq!(clip_right("hello", 5), "hello");
    }

    #[test]
    fn clip_right_adds_ellipsis() {
        assert_eq!(clip_right("hello world", 6), "hello…");
    }

    #[test]
    fn clip_right_to_zero_columns_is_empty() {
        assert_eq!(clip_right("hello", 0), "");
        assert_eq!(clip_right("", 0), "");
    }

    #[test]
    fn cut_left_drops_leading_columns() {
        assert_eq!(cut_left("hello world", 6), "world");
        assert_eq!(cut_left("hello", 0), "hello");
        assert_eq!(cut_left("hi", 5), "");
    }

    #[test]
    fn cut_left_pads_a_straddled_wide_char() {
        // "日" is 2 columns wide; cutting 1 column lands inside it
        assert_eq!(cut_left("日本", 1), " 本");
        assert_eq!(cut_left("日本", 2), "本");
    }
}
